use async_trait::async_trait;

use super::SessionEvent;

/// Trait for handling session state changes asynchronously.
///
/// Each registered listener is invoked independently for every event; no
/// ordering is guaranteed between listeners and none of them can veto or
/// short-circuit the others.
///
/// # Example
///
/// ```rust,ignore
/// use skillport_session::events::{Listener, SessionEvent};
/// use async_trait::async_trait;
///
/// struct ToastOnSignOut;
///
/// #[async_trait]
/// impl Listener for ToastOnSignOut {
///     async fn handle(&self, event: &SessionEvent) {
///         if let SessionEvent::Unauthenticated { reason, .. } = event {
///             if let Some(notice) = reason.notice() {
///                 // show transient toast with `notice`
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handle a session event.
    ///
    /// Called for every event fired by the manager this listener is
    /// subscribed to. Filter by matching on the variant.
    async fn handle(&self, event: &SessionEvent);
}
