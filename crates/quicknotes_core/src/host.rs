//! Narrow host collaborators consumed by the tag facade.
//!
//! The host application owns connectivity detection and transient UI notices;
//! core only sees these two traits.

use log::info;

/// Reports whether the host can reach the network.
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

impl<F> Connectivity for F
where
    F: Fn() -> bool,
{
    fn is_online(&self) -> bool {
        self()
    }
}

/// Sink for short user-visible messages (toasts, snackbars).
pub trait UserNotifier {
    fn show_notice(&self, message: &str);
}

impl<F> UserNotifier for F
where
    F: Fn(&str),
{
    fn show_notice(&self, message: &str) {
        self(message)
    }
}

/// Notifier for hosts without a notice surface; only logs that a notice fired.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn show_notice(&self, message: &str) {
        info!(
            "event=user_notice module=host status=ok chars={}",
            message.chars().count()
        );
    }
}
