use crate::generation::generator::Generator;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation facade. Owns the provider transport.
    pub generator: Generator,
    /// One view-model per open tool page.
    pub sessions: SessionStore,
}
