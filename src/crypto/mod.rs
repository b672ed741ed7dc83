//! Cryptographic functions for PayUp
//!
//! Provides Argon2id password hashing for member credentials and a
//! zeroizing string type for passwords held in memory.

pub mod password;
pub mod secret;

pub use password::{hash_password, verify_password};
pub use secret::SecretString;
