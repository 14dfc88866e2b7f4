use super::domain::UserRef;

/// Credentials a request may carry. Token formats and session storage are the
/// auth collaborator's concern; the directory only shuttles the raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    SessionToken(String),
    ApiKey(String),
}

/// Resolves presented credentials to a user account.
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` means the credentials are well-formed but match no account;
    /// handlers turn that into an authentication failure rather than treating
    /// the caller as anonymous.
    fn authenticate(&self, credentials: &Credentials) -> Result<Option<UserRef>, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),
}
