//! Application shell — the catalog (list view) and session lifecycle
//! handlers that move the app between its two views.

pub mod handlers;
