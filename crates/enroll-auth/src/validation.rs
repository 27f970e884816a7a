//! Field rules for registration requests.
//!
//! Checked before the pipeline runs; a request that fails any rule never
//! reaches the store or the hasher.
use super::*;
use enroll_core::MAX_NAME_LENGTH;
use enroll_core::MIN_PASSWORD_LENGTH;
use validator::ValidateEmail;

/// Message returned when the identifier is already taken.
pub const DUPLICATE_MESSAGE: &str = "User already exists";

/// Request fields subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    pub fn param(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
    fn read<'a>(&self, req: &'a RegisterRequest) -> &'a str {
        match self {
            Self::Name => &req.name,
            Self::Email => &req.email,
            Self::Password => &req.password,
        }
    }
    /// Secrets are never echoed back.
    fn echo(&self) -> bool {
        !matches!(self, Self::Password)
    }
}

/// One field constraint.
pub struct Rule {
    pub field: Field,
    pub check: fn(&str) -> bool,
    pub msg: &'static str,
}

fn present(s: &str) -> bool {
    !s.trim().is_empty()
}

fn short_enough(s: &str) -> bool {
    s.trim().chars().count() <= MAX_NAME_LENGTH
}

/// Postgres text cannot hold NUL; other control characters are refused too.
fn printable(s: &str) -> bool {
    !s.trim().chars().any(char::is_control)
}

fn emailish(s: &str) -> bool {
    s.trim().validate_email()
}

fn long_enough(s: &str) -> bool {
    s.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Registration constraints, evaluated in order.
pub static RULES: [Rule; 5] = [
    Rule {
        field: Field::Name,
        check: present,
        msg: "Name is required",
    },
    Rule {
        field: Field::Name,
        check: short_enough,
        msg: "Name must be 255 characters or fewer",
    },
    Rule {
        field: Field::Name,
        check: printable,
        msg: "Name must not contain control characters",
    },
    Rule {
        field: Field::Email,
        check: emailish,
        msg: "Please include a valid email",
    },
    Rule {
        field: Field::Password,
        check: long_enough,
        msg: "Please enter a password with 6 or more characters",
    },
];

/// Every rule the request breaks, in rule order.
pub fn validate(req: &RegisterRequest) -> Vec<FieldError> {
    RULES
        .iter()
        .filter(|rule| !(rule.check)(rule.field.read(req)))
        .map(|rule| FieldError {
            value: Some(rule.field)
                .filter(Field::echo)
                .map(|f| f.read(req).to_string()),
            msg: rule.msg.to_string(),
            param: Some(rule.field.param().to_string()),
            location: Some("body".to_string()),
        })
        .collect()
}
