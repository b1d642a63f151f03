//! Password hashing and strength rules.
//!
//! Roles and token claims live in `leavedesk_shared::auth`.

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, hash_password, validate_password_strength,
    verify_password,
};
