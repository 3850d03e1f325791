use async_trait::async_trait;

/// Outbound delivery of a verification code (email or SMS). The serving
/// layer treats failures as non-fatal and only logs them.
#[async_trait]
pub trait VerificationSender: Send + Sync {
    async fn send_code(
        &self,
        destination: &str,
        code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Logs instead of sending. Used in development and tests.
pub struct MockVerificationSender;

#[async_trait]
impl VerificationSender for MockVerificationSender {
    async fn send_code(
        &self,
        destination: &str,
        code: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(destination, code, "verification code dispatched");
        Ok(())
    }
}
