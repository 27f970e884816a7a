use super::*;
use enroll_core::ID;

/// Token subject, nested as `{"user": {"id": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Subject {
    pub id: uuid::Uuid,
}

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub user: Subject,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: ID<Account>, now: std::time::SystemTime) -> Self {
        let now = now
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_secs() as i64;
        Self {
            user: Subject { id: user.inner() },
            iat: now,
            exp: now + Crypto::duration().as_secs() as i64,
        }
    }
    pub fn expired(&self) -> bool {
        self.exp
            < std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time")
                .as_secs() as i64
    }
    pub fn user(&self) -> ID<Account> {
        ID::from(self.user.id)
    }
    pub fn issued_at(&self) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + std::time::Duration::from_secs(self.iat as u64)
    }
    pub fn expires_at(&self) -> std::time::SystemTime {
        std::time::UNIX_EPOCH + std::time::Duration::from_secs(self.exp as u64)
    }
}
