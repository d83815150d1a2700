use async_trait::async_trait;

/// Delivers password-reset tokens to account owners.
#[async_trait]
pub trait PasswordResetNotifier: Send + Sync {
    async fn send_reset(&self, email: &str, username: &str, token: &str);
}

/// Records the reset in the log instead of sending mail.
#[derive(Debug, Default, Clone)]
pub struct LogResetNotifier;

#[async_trait]
impl PasswordResetNotifier for LogResetNotifier {
    async fn send_reset(&self, email: &str, username: &str, token: &str) {
        tracing::info!("Password reset requested for {} <{}>", username, email);
        tracing::debug!("Reset token for {}: {}", username, token);
    }
}
