use super::*;
use enroll_core::ID;
use enroll_core::Unique;

/// Registered account.
/// The secret hash is a storage-only field, not part of the domain type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    id: ID<Self>,
    name: String,
    email: Email,
    avatar: String,
}

impl Account {
    pub fn new(id: ID<Self>, name: String, email: Email, avatar: String) -> Self {
        Self {
            id,
            name,
            email,
            avatar,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &Email {
        &self.email
    }
    pub fn avatar(&self) -> &str {
        &self.avatar
    }
}

impl Unique for Account {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use enroll_pg::*;

    /// Accounts live in the users table. Emails are stored normalized,
    /// so the plain unique index is the uniqueness constraint.
    impl Schema for Account {
        fn name() -> &'static str {
            USERS
        }
        fn columns() -> &'static [tokio_postgres::types::Type] {
            &[
                tokio_postgres::types::Type::UUID,
                tokio_postgres::types::Type::TEXT,
                tokio_postgres::types::Type::TEXT,
                tokio_postgres::types::Type::TEXT,
                tokio_postgres::types::Type::TEXT,
                tokio_postgres::types::Type::TIMESTAMPTZ,
            ]
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    name        TEXT NOT NULL,
                    email       TEXT NOT NULL,
                    avatar      TEXT NOT NULL,
                    hashword    TEXT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON ",
                USERS,
                " (email);"
            )
        }
    }

}
