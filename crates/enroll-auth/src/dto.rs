use serde::Deserialize;
use serde::Serialize;

/// Registration form as posted by clients.
/// Missing fields deserialize empty so the rule table can report them.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// One entry of a client-error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FieldError {
    /// An error not tied to a request field.
    pub fn general(msg: &str) -> Self {
        Self {
            value: None,
            msg: msg.to_string(),
            param: None,
            location: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorList {
    pub errors: Vec<FieldError>,
}

impl From<Vec<FieldError>> for ErrorList {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}
