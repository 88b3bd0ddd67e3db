use crate::ipc::error::err;
use crate::ipc::helpers::{apply, field_params, opt_str_param, str_param};
use crate::ipc::runtime::AppState;
use crate::ipc::types::Request;
use crate::session::{Event, Mode};

fn handle_mode(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match str_param(req, "mode") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mode: Mode = match raw.parse() {
        Ok(m) => m,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    if mode == Mode::Menu {
        return apply(state, req, Event::Back);
    }
    apply(state, req, Event::ChooseMode(mode))
}

fn handle_center_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    match opt_str_param(req, "center") {
        Ok(center) => apply(state, req, Event::SelectCenter(center)),
        Err(resp) => resp,
    }
}

fn handle_student_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    match opt_str_param(req, "student") {
        Ok(student) => apply(state, req, Event::SelectStudent(student)),
        Err(resp) => resp,
    }
}

fn handle_fields_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    match field_params(req) {
        Ok((index, value)) => apply(state, req, Event::SetField(index, value)),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.mode" => Some(handle_mode(state, req)),
        "session.back" => Some(apply(state, req, Event::Back)),
        "catalog.refresh" => Some(apply(state, req, Event::RefreshCatalog)),
        "center.select" => Some(handle_center_select(state, req)),
        "student.select" => Some(handle_student_select(state, req)),
        "fields.set" => Some(handle_fields_set(state, req)),
        "entry.submit" => Some(apply(state, req, Event::Submit)),
        _ => None,
    }
}
