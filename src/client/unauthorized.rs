use crate::client::interceptor::ResponseInterceptor;
use crate::client::request::RequestDescriptor;
use crate::error::ApiError;
use crate::session::{SessionEvent, SessionEvents, SessionStore};

/// Tears the session down on any authentication failure.
///
/// Clears the store and emits [`SessionEvent::Invalidated`] every time,
/// whichever resource triggered it. The original error still reaches the
/// caller.
pub struct UnauthorizedHandler {
    store: SessionStore,
    events: SessionEvents,
}

impl UnauthorizedHandler {
    pub fn new(store: SessionStore, events: SessionEvents) -> Self {
        Self { store, events }
    }
}

impl ResponseInterceptor for UnauthorizedHandler {
    fn name(&self) -> &'static str {
        "unauthorized_handler"
    }

    fn on_failure(&self, request: &RequestDescriptor, error: &ApiError) {
        if !error.is_authentication() {
            return;
        }
        tracing::info!(
            "Authentication failed on {} {}, clearing session",
            request.method,
            request.path
        );
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to persist cleared session: {}", e);
        }
        self.events.emit(SessionEvent::Invalidated);
    }
}
