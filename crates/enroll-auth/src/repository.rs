use super::*;
use enroll_core::ID;
use enroll_core::Unique;
use enroll_pg::*;
use tokio_postgres::Client;

fn classify(e: PgErr) -> StoreError {
    match Fault::from(&e) {
        Fault::Conflict => StoreError::Duplicate,
        Fault::Unreachable => StoreError::Unavailable(describe(&e)),
        Fault::Rejected => StoreError::Failed(describe(&e)),
    }
}

/// Postgres-backed accounts. The unique index on `email` is the
/// uniqueness constraint; see [`Account`]'s schema.
#[async_trait::async_trait]
impl Accounts for Client {
    async fn find(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, name, email, avatar FROM ",
                USERS,
                " WHERE email = $1"
            ),
            &[&email.as_str()],
        )
        .await
        .map(|opt| {
            opt.map(|row| {
                Account::new(
                    ID::from(row.get::<_, uuid::Uuid>(0)),
                    row.get::<_, String>(1),
                    Email::from(row.get::<_, String>(2)),
                    row.get::<_, String>(3),
                )
            })
        })
        .map_err(classify)
    }

    async fn insert(&self, account: &Account, hashword: &str) -> Result<ID<Account>, StoreError> {
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (id, name, email, avatar, hashword) VALUES ($1, $2, $3, $4, $5) RETURNING id"
            ),
            &[
                &account.id().inner(),
                &account.name(),
                &account.email().as_str(),
                &account.avatar(),
                &hashword,
            ],
        )
        .await
        .map(|row| ID::from(row.get::<_, uuid::Uuid>(0)))
        .map_err(classify)
    }
}
