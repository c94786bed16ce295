//! Reset link delivery.
//!
//! No mail transport is wired in; the link is written to the structured log
//! so operators (and local developers) can hand it to the account owner.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{PasswordResetNotifier, ResetNotificationError};

/// [`PasswordResetNotifier`] that emits the reset link as a log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingResetNotifier;

#[async_trait]
impl PasswordResetNotifier for TracingResetNotifier {
    async fn send_reset_link(
        &self,
        email: &str,
        reset_link: &str,
    ) -> Result<(), ResetNotificationError> {
        info!(target: "forum::reset", %email, %reset_link, "password reset requested");
        Ok(())
    }
}
