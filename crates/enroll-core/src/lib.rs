//! Core identifiers, traits, and tunable constants for enroll.
//!
//! This crate provides the foundational types and deployment parameters
//! shared by the rest of the workspace.

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

/// Fresh time-ordered (v7) identifier.
impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// TOKEN POLICY
// ============================================================================
/// Lifetime of an issued bearer token (100 hours).
pub const TOKEN_DURATION: std::time::Duration = std::time::Duration::from_secs(360000);

// ============================================================================
// SECRET HASHING COST
// Argon2id parameters. Fixed by the deployer, never derived from input.
// Higher memory/iterations = slower brute force, slower registration.
// ============================================================================
/// Memory cost in KiB (19 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
/// Number of passes over memory.
pub const ARGON2_ITERATIONS: u32 = 2;
/// Lanes computed per hash.
pub const ARGON2_PARALLELISM: u32 = 1;
/// Random salt length per hash.
pub const SALT_BYTES: usize = 16;
/// Hashing jobs allowed in flight, as a fraction of available cores.
/// Always at least one, always below the core count on multi-core hosts.
pub fn hashing_slots() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

// ============================================================================
// ACCOUNT STORE
// ============================================================================
/// Upper bound on any single store round-trip.
pub const STORE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

// ============================================================================
// AVATARS
// ============================================================================
/// Avatar edge length in pixels.
pub const AVATAR_SIZE: u16 = 200;
/// Maximum content rating for avatar images.
pub const AVATAR_RATING: &str = "pg";
/// Fallback image style when no avatar is registered ("mystery person").
pub const AVATAR_DEFAULT: &str = "mm";

// ============================================================================
// REGISTRATION INPUT
// ============================================================================
/// Minimum plaintext secret length accepted by the request adapter.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Longest display name accepted, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::warn!("interrupt received, exiting immediately"),
            Err(e) => log::error!("failed to listen for interrupt: {}", e),
        }
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn ids_are_unique() {
        let a = ID::<Thing>::default();
        let b = ID::<Thing>::default();
        assert!(a != b);
    }

    #[test]
    fn ids_roundtrip_uuid() {
        let id = ID::<Thing>::default();
        assert!(id == ID::from(uuid::Uuid::from(id)));
        assert!(id.to_string() == id.inner().to_string());
    }

    #[test]
    fn hashing_never_takes_every_core() {
        let slots = hashing_slots();
        let cores = num_cpus::get();
        assert!(slots >= 1);
        assert!(cores == 1 || slots < cores);
    }
}
