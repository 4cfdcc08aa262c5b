use async_trait::async_trait;

use crate::error::UserError;
use crate::types::Account;

/// Trusted credential service: password hashing and session tokens live
/// outside this crate.
#[async_trait]
pub trait CredentialService: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, UserError>;

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, UserError>;

    async fn issue_token(&self, account: &Account) -> Result<String, UserError>;
}
