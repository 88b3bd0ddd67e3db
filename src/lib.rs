//! Sidecar daemon for the center/student data-entry UI. The UI talks JSON
//! lines over stdio; this crate owns the session and every call to the
//! remote sheets.

pub mod catalog;
pub mod config;
pub mod error;
pub mod ipc;
pub mod model;
pub mod services;
pub mod session;
pub mod store;
