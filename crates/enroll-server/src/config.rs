use thiserror::Error;

/// Startup configuration problems. Any of these stops the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{name} is not a valid {kind}: {value}")]
    Invalid {
        name: &'static str,
        kind: &'static str,
        value: String,
    },
}

/// Process configuration, read once from the environment at startup.
///
/// - `JWT_SECRET` signing key (required)
/// - `DB_URL` Postgres connection string (required)
/// - `BIND_ADDR` listen address, default `0.0.0.0:5000`
/// - `WORKERS` actix worker count, default one per core
#[derive(Clone)]
pub struct Config {
    secret: String,
    database: String,
    bind: std::net::SocketAddr,
    workers: Option<usize>,
}

const DEFAULT_BIND: &str = "0.0.0.0:5000";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            get(key)
                .ok_or(ConfigError::Missing(key))
                .and_then(|v| match v.is_empty() {
                    true => Err(ConfigError::Empty(key)),
                    false => Ok(v),
                })
        };
        let secret = required("JWT_SECRET")?;
        let database = required("DB_URL")?;
        let bind = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            kind: "socket address",
            value: bind.clone(),
        })?;
        let workers = get("WORKERS")
            .map(|w| {
                w.parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or(ConfigError::Invalid {
                        name: "WORKERS",
                        kind: "positive integer",
                        value: w,
                    })
            })
            .transpose()?;
        Ok(Self {
            secret,
            database,
            bind,
            workers,
        })
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
    pub fn database(&self) -> &str {
        &self.database
    }
    pub fn bind(&self) -> std::net::SocketAddr {
        self.bind
    }
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"[REDACTED]")
            .field("database", &"[REDACTED]")
            .field("bind", &self.bind)
            .field("workers", &self.workers)
            .finish()
    }
}
