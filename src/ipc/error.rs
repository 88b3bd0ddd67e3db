use crate::error::Notice;
use crate::session::SessionState;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Reply for a line that is not a request; there is no id to echo.
pub fn bad_json(message: impl Into<String>) -> serde_json::Value {
    json!({
        "ok": false,
        "error": { "code": "bad_json", "message": message.into() },
    })
}

pub fn session_event(state: &SessionState) -> serde_json::Value {
    json!({
        "event": "session",
        "state": state.snapshot(),
    })
}

pub fn notice_event(notice: &Notice) -> serde_json::Value {
    json!({
        "event": "notice",
        "notice": notice,
    })
}
