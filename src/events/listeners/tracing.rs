use async_trait::async_trait;

use crate::events::{Listener, SessionEvent};

/// Emits session events as tracing events.
///
/// Requires the `tracing` feature to be enabled.
///
/// # Example
///
/// ```rust,ignore
/// use skillport_session::events::listeners::TracingListener;
///
/// manager.subscribe(Arc::new(TracingListener)).await;
/// ```
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &SessionEvent) {
        tracing::info!(
            target: "skillport_session::events",
            event_name = event.name(),
            authenticated = event.is_authenticated(),
            "session event"
        );
    }
}
