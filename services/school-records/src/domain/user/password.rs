//! 密码值对象

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use edu_errors::AppError;
use std::fmt;
use thiserror::Error;

/// 明文密码最小长度
pub const MIN_PASSWORD_LEN: usize = 6;
/// 明文密码最大长度
pub const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must be at most {0} characters")]
    TooLong(usize),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is invalid: {0}")]
    InvalidHash(String),
}

impl From<PasswordError> for AppError {
    fn from(error: PasswordError) -> Self {
        match error {
            PasswordError::TooShort(_) | PasswordError::TooLong(_) => {
                AppError::validation("password", error.to_string())
            }
            PasswordError::HashingFailed(_) | PasswordError::InvalidHash(_) => {
                AppError::internal(error.to_string())
            }
        }
    }
}

/// 哈希后的密码（Argon2 PHC 字符串）
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// 校验长度后哈希明文密码
    pub fn from_plain(plain_password: &str) -> Result<Self, PasswordError> {
        let len = plain_password.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err(PasswordError::TooShort(MIN_PASSWORD_LEN));
        }
        if len > MAX_PASSWORD_LEN {
            return Err(PasswordError::TooLong(MAX_PASSWORD_LEN));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            .to_string();

        Ok(Self(password_hash))
    }

    pub fn verify(&self, plain_password: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(&self.0).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(plain_password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// 从存储恢复
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = HashedPassword::from_plain("secret1").unwrap();
        assert!(hashed.verify("secret1").unwrap());
        assert!(!hashed.verify("secret2").unwrap());
        assert_ne!(hashed.as_str(), "secret1");
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            HashedPassword::from_plain("12345"),
            Err(PasswordError::TooShort(6))
        ));
        let long = "x".repeat(MAX_PASSWORD_LEN + 1);
        assert!(matches!(
            HashedPassword::from_plain(&long),
            Err(PasswordError::TooLong(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let hashed = HashedPassword::from_plain("secret1").unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2"));
    }
}
