use std::sync::Arc;

use vietpdf::intake::Intake;

/// Shared application state available to all handlers via `State`.
///
/// Cheaply cloneable: the store implementations are handle types and the
/// intake is behind an `Arc`.
pub struct AppState<S, Q> {
    pub intake: Arc<Intake<S, Q>>,
    pub store: S,
}

impl<S: Clone, Q> Clone for AppState<S, Q> {
    fn clone(&self) -> Self {
        Self {
            intake: Arc::clone(&self.intake),
            store: self.store.clone(),
        }
    }
}

impl<S, Q> AppState<S, Q> {
    pub fn new(intake: Intake<S, Q>, store: S) -> Self {
        Self {
            intake: Arc::new(intake),
            store,
        }
    }
}
