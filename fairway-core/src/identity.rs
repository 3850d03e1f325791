use async_trait::async_trait;

/// External phone-auth provider: exchanges a provider token for the
/// verified phone number it attests to.
#[async_trait]
pub trait PhoneAuthenticator: Send + Sync {
    async fn authenticate(
        &self,
        token: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Stand-in provider for development and tests. Tokens of the form
/// `phone:<number>` verify as that number; everything else is rejected.
pub struct MockPhoneAuthenticator;

#[async_trait]
impl PhoneAuthenticator for MockPhoneAuthenticator {
    async fn authenticate(
        &self,
        token: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        // A real provider would verify the token signature and expiry
        // before trusting the embedded claim.
        match token.strip_prefix("phone:") {
            Some(number) if !number.is_empty() => {
                tracing::info!(number, "phone token verified");
                Ok(number.to_string())
            }
            _ => Err("phone token rejected".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_accepts_prefixed_tokens() {
        let auth = MockPhoneAuthenticator;
        let number = auth.authenticate("phone:+15550100").await.unwrap();
        assert_eq!(number, "+15550100");
        assert!(auth.authenticate("garbage").await.is_err());
    }
}
