use super::*;
use enroll_core::ID;
use enroll_core::STORE_TIMEOUT;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Registration pipeline: resolve, transform, persist, sign.
///
/// Stages run strictly in that order for a single request. The only
/// state shared between requests is the account store and the signing
/// key, both behind `Arc`.
///
/// The existence check in [`Registrar::resolve`] only short-circuits the
/// common case. Two racing registrations can both see no account; the
/// store's unique constraint then rejects the loser at insert time and
/// [`Registrar::issue`] reports it as [`RegisterError::DuplicateIdentifier`].
pub struct Registrar<S> {
    store: Arc<S>,
    crypto: Arc<Crypto>,
    avatars: Arc<dyn Avatars>,
    hashing: Arc<Semaphore>,
}

impl<S> Registrar<S>
where
    S: Accounts + 'static,
{
    pub fn new(store: S, crypto: Crypto) -> Self {
        Self::shared(Arc::new(store), crypto)
    }

    /// Builds a pipeline over a store that is also used elsewhere.
    pub fn shared(store: Arc<S>, crypto: Crypto) -> Self {
        Self {
            store,
            crypto: Arc::new(crypto),
            avatars: Arc::new(Gravatar::default()),
            hashing: Arc::new(Semaphore::new(enroll_core::hashing_slots())),
        }
    }

    pub fn with_avatars(self, avatars: impl Avatars + 'static) -> Self {
        Self {
            avatars: Arc::new(avatars),
            ..self
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn crypto(&self) -> &Crypto {
        &self.crypto
    }

    /// Runs the full pipeline for one registration.
    pub async fn register(
        &self,
        name: &str,
        email: Email,
        password: &str,
    ) -> Result<IssuedToken, RegisterError> {
        if self.resolve(&email).await?.is_some() {
            log::info!("registration refused, {} already registered", email);
            return Err(RegisterError::DuplicateIdentifier);
        }
        let hashword = self.transform(password).await?;
        self.issue(email, name.to_string(), hashword).await
    }

    /// Looks up an identifier. Read-only.
    pub async fn resolve(&self, email: &Email) -> Result<Option<Account>, RegisterError> {
        let found = match tokio::time::timeout(STORE_TIMEOUT, self.store.find(email)).await {
            Err(_) => Err(RegisterError::StoreUnavailable("lookup timed out".into())),
            Ok(Err(e)) => Err(RegisterError::StoreUnavailable(e.to_string())),
            Ok(Ok(found)) => Ok(found),
        };
        found.inspect_err(|e| log::warn!("resolving {} failed: {}", email, e))
    }

    /// Hashes a secret on the blocking pool, at most
    /// [`enroll_core::hashing_slots`] at a time.
    pub async fn transform(&self, password: &str) -> Result<String, RegisterError> {
        let permit = self
            .hashing
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| RegisterError::TransformFailed(e.to_string()))?;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let hashword = password::hash(&password);
            drop(permit);
            hashword
        })
        .await
        .map_err(|e| RegisterError::TransformFailed(e.to_string()))?
        .map_err(RegisterError::from)
        .inspect_err(|e| log::error!("{}", e))
    }

    /// Persists a new account and signs a token for it.
    ///
    /// Insert and signing run on a detached task: once the insert has
    /// started it finishes even if the caller goes away.
    pub async fn issue(
        &self,
        email: Email,
        name: String,
        hashword: String,
    ) -> Result<IssuedToken, RegisterError> {
        let avatar = self
            .avatars
            .resolve(&email)
            .unwrap_or_else(|| FALLBACK_AVATAR.to_string());
        let account = Account::new(ID::default(), name, email, avatar);
        let store = self.store.clone();
        let crypto = self.crypto.clone();
        tokio::spawn(async move {
            let id = Self::persist(store.as_ref(), &account, &hashword).await?;
            Self::sign(crypto.as_ref(), id)
        })
        .await
        .map_err(|e| RegisterError::PersistenceFailed(e.to_string()))?
    }

    async fn persist(
        store: &S,
        account: &Account,
        hashword: &str,
    ) -> Result<ID<Account>, RegisterError> {
        let inserted = match tokio::time::timeout(STORE_TIMEOUT, store.insert(account, hashword)).await {
            Err(_) => Err(RegisterError::PersistenceFailed("insert timed out".into())),
            Ok(Err(StoreError::Duplicate)) => Err(RegisterError::DuplicateIdentifier),
            Ok(Err(StoreError::Unavailable(e))) => Err(RegisterError::StoreUnavailable(e)),
            Ok(Err(StoreError::Failed(e))) => Err(RegisterError::PersistenceFailed(e)),
            Ok(Ok(id)) => Ok(id),
        };
        inserted
            .inspect(|id| log::info!("created account {} for {}", id, account.email()))
            .inspect_err(|e| match e {
                RegisterError::DuplicateIdentifier => {
                    log::info!("insert lost race for {}", account.email())
                }
                e => log::warn!("persisting {} failed: {}", account.email(), e),
            })
    }

    fn sign(crypto: &Crypto, id: ID<Account>) -> Result<IssuedToken, RegisterError> {
        let claims = Claims::new(id, std::time::SystemTime::now());
        crypto
            .encode(&claims)
            .map(|token| IssuedToken::new(token, claims))
            .map_err(RegisterError::from)
            .inspect_err(|e| log::error!("account {} persisted but {}", id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enroll_core::Unique;

    const SECRET: &[u8] = b"registrar-test-secret";

    fn registrar() -> Registrar<Memory> {
        Registrar::new(Memory::default(), Crypto::new(SECRET).unwrap())
    }

    /// Answers `find` with nothing, forcing the insert to be the judge.
    #[derive(Default)]
    struct Blind(Memory);

    #[async_trait::async_trait]
    impl Accounts for Blind {
        async fn find(&self, _: &Email) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }
        async fn insert(&self, a: &Account, h: &str) -> Result<ID<Account>, StoreError> {
            self.0.insert(a, h).await
        }
    }

    struct Down;

    #[async_trait::async_trait]
    impl Accounts for Down {
        async fn find(&self, _: &Email) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn insert(&self, _: &Account, _: &str) -> Result<ID<Account>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    struct Full;

    #[async_trait::async_trait]
    impl Accounts for Full {
        async fn find(&self, _: &Email) -> Result<Option<Account>, StoreError> {
            Ok(None)
        }
        async fn insert(&self, _: &Account, _: &str) -> Result<ID<Account>, StoreError> {
            Err(StoreError::Failed("disk full".into()))
        }
    }

    /// Never answers the stalled operation.
    #[derive(Default)]
    struct Stalled {
        lookup: bool,
        inserts: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Accounts for Stalled {
        async fn find(&self, _: &Email) -> Result<Option<Account>, StoreError> {
            if self.lookup {
                std::future::pending().await
            } else {
                Ok(None)
            }
        }
        async fn insert(&self, _: &Account, _: &str) -> Result<ID<Account>, StoreError> {
            self.inserts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            std::future::pending().await
        }
    }

    struct Broken;

    impl Avatars for Broken {
        fn resolve(&self, _: &Email) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn issues_verifiable_token() {
        let registrar = registrar();
        let issued = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap();
        let claims = registrar.crypto().decode(issued.as_str()).unwrap();
        assert!(claims == *issued.claims());
        assert!(claims.user() == issued.subject());
        let ref email = Email::from("ada@example.com");
        let account = registrar.store().find(email).await.unwrap().unwrap();
        assert!(account.id() == issued.subject());
        assert!(account.name() == "Ada");
        assert!(Some(account.avatar().to_string()) == Gravatar::default().resolve(email));
        assert!(
            issued.expires_at().duration_since(issued.issued_at()).unwrap()
                == Crypto::duration()
        );
    }

    #[tokio::test]
    async fn stored_hash_verifies() {
        let registrar = registrar();
        registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap();
        let hashword = registrar
            .store()
            .hashword(&Email::from("ada@example.com"))
            .await
            .unwrap();
        assert!(hashword != "longenough");
        assert!(password::verify("longenough", &hashword));
    }

    #[tokio::test]
    async fn second_registration_is_duplicate() {
        let registrar = registrar();
        let first = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await;
        let second = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await;
        assert!(first.is_ok());
        assert!(matches!(second, Err(RegisterError::DuplicateIdentifier)));
        assert!(registrar.store().len().await == 1);
    }

    #[tokio::test]
    async fn duplicate_check_ignores_case() {
        let registrar = registrar();
        registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap();
        let again = registrar
            .register("Ada", Email::from("ADA@Example.com"), "longenough")
            .await;
        assert!(matches!(again, Err(RegisterError::DuplicateIdentifier)));
    }

    #[tokio::test]
    async fn insert_conflict_reads_as_duplicate() {
        let registrar = Registrar::new(Blind::default(), Crypto::new(SECRET).unwrap());
        registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap();
        let again = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await;
        assert!(matches!(again, Err(RegisterError::DuplicateIdentifier)));
        assert!(registrar.store().0.len().await == 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_race_has_one_winner() {
        let registrar = Arc::new(Registrar::new(
            Blind::default(),
            Crypto::new(SECRET).unwrap(),
        ));
        let attempts = (0..2)
            .map(|_| registrar.clone())
            .map(|r| {
                tokio::spawn(async move {
                    r.register("Racer", Email::from("race@example.com"), "longenough")
                        .await
                })
            })
            .collect::<Vec<_>>();
        let results = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect::<Vec<_>>();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let dups = results
            .iter()
            .filter(|r| matches!(r, Err(RegisterError::DuplicateIdentifier)))
            .count();
        assert!(wins == 1);
        assert!(dups == 1);
        assert!(registrar.store().0.len().await == 1);
    }

    #[tokio::test]
    async fn unreachable_store_is_retryable() {
        let registrar = Registrar::new(Down, Crypto::new(SECRET).unwrap());
        let result = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, RegisterError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn failed_insert_issues_no_token() {
        let registrar = Registrar::new(Full, Crypto::new(SECRET).unwrap());
        let result = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await;
        assert!(matches!(result, Err(RegisterError::PersistenceFailed(_))));
    }

    #[tokio::test]
    async fn avatar_fault_falls_back() {
        let registrar = registrar().with_avatars(Broken);
        registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap();
        let account = registrar
            .store()
            .find(&Email::from("ada@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert!(account.avatar() == FALLBACK_AVATAR);
    }

    #[tokio::test]
    async fn errors_never_echo_secret() {
        let registrar = Registrar::new(Full, Crypto::new(SECRET).unwrap());
        let err = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap_err();
        let text = format!("{} {:?}", err, err);
        assert!(!text.contains("longenough"));
        assert!(!text.contains("registrar-test-secret"));
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_timeout_is_unavailable() {
        let store = Stalled {
            lookup: true,
            ..Stalled::default()
        };
        let registrar = Registrar::new(store, Crypto::new(SECRET).unwrap());
        let err = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::StoreUnavailable(_)));
        assert!(err.is_retryable());
        assert!(!err.is_client_error());
        assert!(registrar.store().inserts.load(std::sync::atomic::Ordering::SeqCst) == 0);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_timeout_is_persistence_failure() {
        let registrar = Registrar::new(Stalled::default(), Crypto::new(SECRET).unwrap());
        let err = registrar
            .register("Ada", Email::from("ada@example.com"), "longenough")
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::PersistenceFailed(_)));
        assert!(err.is_retryable());
        assert!(registrar.store().inserts.load(std::sync::atomic::Ordering::SeqCst) == 1);
    }
}
