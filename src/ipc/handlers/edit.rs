use crate::ipc::helpers::{apply, field_params, str_param};
use crate::ipc::runtime::AppState;
use crate::ipc::types::Request;
use crate::session::Event;

fn handle_begin(state: &mut AppState, req: &Request) -> serde_json::Value {
    match str_param(req, "recordId") {
        Ok(record_id) => apply(state, req, Event::BeginEdit(record_id)),
        Err(resp) => resp,
    }
}

fn handle_set_field(state: &mut AppState, req: &Request) -> serde_json::Value {
    match field_params(req) {
        Ok((index, value)) => apply(state, req, Event::SetEditField(index, value)),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "edit.begin" => Some(handle_begin(state, req)),
        "edit.setField" => Some(handle_set_field(state, req)),
        "edit.cancel" => Some(apply(state, req, Event::CancelEdit)),
        "edit.save" => Some(apply(state, req, Event::SaveEdit)),
        "edit.acknowledgeLoss" => Some(apply(state, req, Event::AcknowledgeLoss)),
        _ => None,
    }
}
