use crate::ipc::error::{err, ok};
use crate::ipc::runtime::AppState;
use crate::ipc::types::Request;
use crate::model::FieldIndex;
use crate::session::Event;
use serde_json::json;

/// Applies `event` and replies with the new snapshot or the rejection.
pub fn apply(state: &mut AppState, req: &Request, event: Event) -> serde_json::Value {
    match state.dispatch(event) {
        Ok(()) => ok(&req.id, json!({ "state": state.session().snapshot() })),
        Err(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

/// Missing, `null` and `""` all mean "nothing selected".
pub fn opt_str_param(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("params.{key} must be a string or null"),
            None,
        )),
    }
}

pub fn str_param(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) => Ok(v.to_string()),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

/// `params.index` (1..=5) and `params.value`.
pub fn field_params(req: &Request) -> Result<(FieldIndex, String), serde_json::Value> {
    let Some(raw) = req.params.get("index").and_then(|v| v.as_u64()) else {
        return Err(err(&req.id, "bad_params", "missing index", None));
    };
    let Some(index) = FieldIndex::new(raw) else {
        return Err(err(
            &req.id,
            "bad_field_index",
            format!("field index must be 1..=5, got {raw}"),
            None,
        ));
    };
    let value = str_param(req, "value")?;
    Ok((index, value))
}
