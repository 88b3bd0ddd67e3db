use crate::ipc::error::ok;
use crate::ipc::runtime::AppState;
use crate::ipc::types::Request;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "sessionId": state.session_id.to_string(),
            "directoryUrl": state.config.directory_url,
            "entriesUrl": state.config.entries_url,
            "serverFilter": state.config.server_filter,
        }),
    )
}

fn handle_session_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "state": state.session().snapshot() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.get" => Some(handle_session_get(state, req)),
        _ => None,
    }
}
