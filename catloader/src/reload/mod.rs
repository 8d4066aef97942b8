//! Debounced reload scheduling and user notifications.
//!
//! A [`ReloadScheduler`] sits between interactive UI state changes and a
//! [`ViewLoader`]. It debounces bursts of requests, cancels superseded loads,
//! publishes the latest view over a `watch` channel and turns failures into
//! [`Notifier`] calls.

mod config;
mod notify;
mod scheduler;

pub use config::ReloadConfig;
pub use notify::{ChannelNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use scheduler::{ReloadScheduler, ReloadState, ViewLoader, ViewUpdate};
