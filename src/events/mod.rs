//! State-change notifications for the session.
//!
//! Events are fired by [`SessionManager`](crate::SessionManager) after the
//! state mutation they describe has committed. Listeners are registered per
//! manager instance via
//! [`SessionManager::subscribe`](crate::SessionManager::subscribe); there is
//! no global registry, so each page composition wires exactly the listeners
//! it wants.
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait to react to state changes:
//!
//! ```rust,ignore
//! use skillport_session::events::{Listener, SessionEvent};
//! use async_trait::async_trait;
//!
//! struct NavbarRefresher;
//!
//! #[async_trait]
//! impl Listener for NavbarRefresher {
//!     async fn handle(&self, event: &SessionEvent) {
//!         match event {
//!             SessionEvent::Authenticated { user, .. } => {
//!                 // re-render the signed-in navbar
//!             }
//!             SessionEvent::Unauthenticated { .. } => {
//!                 // swap to the signed-out navbar
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;

pub mod listeners;

pub use event::SessionEvent;
pub use listener::Listener;
