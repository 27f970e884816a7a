use super::*;
use enroll_core::AVATAR_DEFAULT;
use enroll_core::AVATAR_RATING;
use enroll_core::AVATAR_SIZE;

/// Used when an [`Avatars`] implementation cannot produce a reference.
pub const FALLBACK_AVATAR: &str = "https://www.gravatar.com/avatar/?s=200&r=pg&d=mm";

/// Maps an account identifier to an image reference.
/// Implementations must be pure: same email, same reference.
pub trait Avatars: Send + Sync {
    fn resolve(&self, email: &Email) -> Option<String>;
}

/// Gravatar URLs keyed by the SHA-256 of the normalized email.
#[derive(Debug, Clone)]
pub struct Gravatar {
    size: u16,
    rating: &'static str,
    default: &'static str,
}

impl Default for Gravatar {
    fn default() -> Self {
        Self {
            size: AVATAR_SIZE,
            rating: AVATAR_RATING,
            default: AVATAR_DEFAULT,
        }
    }
}

impl Gravatar {
    pub fn new(size: u16, rating: &'static str, default: &'static str) -> Self {
        Self {
            size,
            rating,
            default,
        }
    }
    fn digest(email: &Email) -> String {
        use sha2::Digest;
        format!("{:x}", sha2::Sha256::digest(email.as_str().as_bytes()))
    }
}

impl Avatars for Gravatar {
    fn resolve(&self, email: &Email) -> Option<String> {
        Some(format!(
            "https://www.gravatar.com/avatar/{}?s={}&r={}&d={}",
            Self::digest(email),
            self.size,
            self.rating,
            self.default
        ))
    }
}
