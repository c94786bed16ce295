//! Port for delivering password reset links to account owners.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by reset notification adapters.
    pub enum ResetNotificationError {
        /// The message could not be handed over for delivery.
        Delivery { message: String } => "reset notification failed: {message}",
    }
}

/// Sends a reset link to an email address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    /// Deliver `reset_link` to `email`.
    async fn send_reset_link(
        &self,
        email: &str,
        reset_link: &str,
    ) -> Result<(), ResetNotificationError>;
}
