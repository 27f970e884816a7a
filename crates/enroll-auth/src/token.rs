use super::*;
use enroll_core::ID;

/// Signed bearer token handed back after registration. Never persisted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    token: String,
    claims: Claims,
}

impl IssuedToken {
    pub fn new(token: String, claims: Claims) -> Self {
        Self { token, claims }
    }
    pub fn subject(&self) -> ID<Account> {
        self.claims.user()
    }
    pub fn issued_at(&self) -> std::time::SystemTime {
        self.claims.issued_at()
    }
    pub fn expires_at(&self) -> std::time::SystemTime {
        self.claims.expires_at()
    }
    pub fn claims(&self) -> &Claims {
        &self.claims
    }
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl From<IssuedToken> for String {
    fn from(issued: IssuedToken) -> Self {
        issued.token
    }
}
