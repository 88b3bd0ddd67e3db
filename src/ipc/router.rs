use super::handlers;
use super::runtime::AppState;
use super::types::Request;
use crate::ipc::error::{bad_json, err};

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::session::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::edit::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}

/// One raw line from the UI. Lines that do not parse get a `bad_json` reply
/// without an id.
pub fn handle_line(state: &mut AppState, line: &str) -> serde_json::Value {
    match serde_json::from_str::<Request>(line) {
        Ok(req) => handle_request(state, req),
        Err(e) => bad_json(e.to_string()),
    }
}
