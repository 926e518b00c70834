// Page view-model: one ToolSession per open tool, kept in the SessionStore
// and driven over HTTP by the session handlers.

pub mod handlers;
pub mod store;
pub mod view_model;

pub use store::SessionStore;
