//! Caller-supplied bearer credential
//!
//! Every remote call takes one of these explicitly. An absent or blank token
//! produces an unauthenticated request; the remote side decides what that means.

use reqwest::RequestBuilder;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    token: Option<String>,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Parse an `Authorization` header value. Anything other than a
    /// `Bearer <token>` value is treated as anonymous.
    pub fn from_authorization_header(value: Option<&str>) -> Self {
        let token = value
            .map(str::trim)
            .and_then(|v| {
                v.strip_prefix("Bearer ")
                    .or_else(|| v.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match token {
            Some(t) => Self::bearer(t),
            None => Self::anonymous(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

// Tokens must never reach the logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_anonymous() {
        assert!(!Credential::bearer("   ").is_authenticated());
        assert!(!Credential::anonymous().is_authenticated());
        assert_eq!(Credential::bearer("abc").token(), Some("abc"));
    }

    #[test]
    fn test_header_parsing() {
        let cred = Credential::from_authorization_header(Some("Bearer tok-123"));
        assert_eq!(cred.token(), Some("tok-123"));

        assert!(!Credential::from_authorization_header(Some("Basic dXNlcg==")).is_authenticated());
        assert!(!Credential::from_authorization_header(Some("Bearer ")).is_authenticated());
        assert!(!Credential::from_authorization_header(None).is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", Credential::bearer("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }
}
