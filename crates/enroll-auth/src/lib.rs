//! Account registration and credential issuance.
//!
//! A registration flows through three stages, always in this order:
//!
//! 1. [`Registrar::resolve`] — is the identifier already taken?
//! 2. [`Registrar::transform`] — Argon2id hash of the secret, see [`password`]
//! 3. [`Registrar::issue`] — persist the [`Account`], then sign a JWT
//!
//! ## Identity
//!
//! - [`Email`] — Normalized account identifier
//! - [`Account`] — Registered account record
//! - [`Avatars`] / [`Gravatar`] — Identifier-derived avatar references
//!
//! ## Security
//!
//! - [`Crypto`] — JWT signing and verification
//! - [`Claims`] — JWT payload structure
//! - [`IssuedToken`] — Signed token plus its claims
//! - [`password`] — Argon2 hashing and verification
//!
//! ## Storage
//!
//! - [`Accounts`] — Store abstraction; uniqueness enforced at insert
//! - [`Memory`] — In-process store
//! - Postgres implementation behind the `database` feature
mod account;
mod avatar;
mod claims;
mod crypto;
mod dto;
mod email;
mod error;
pub mod password;
mod registrar;
mod store;
mod token;
pub mod validation;

pub use account::*;
pub use avatar::*;
pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use email::*;
pub use error::*;
pub use registrar::*;
pub use store::*;
pub use token::*;
pub use validation::*;

#[cfg(feature = "database")]
mod repository;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use handlers::*;
