mod error;
mod handlers;
mod helpers;
mod router;
mod runtime;
mod types;

pub use router::{handle_line, handle_request};
pub use runtime::AppState;
pub use types::Request;
