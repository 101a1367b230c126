use async_trait::async_trait;
use borealis_mysql::scramble::{check_scramble, SCRAMBLE_LENGTH};

use crate::{
    auth::{AuthenticationInfo, AuthenticationProvider},
    config::AuthConfig,
    error::AuthenticationError,
};

/// Verifier for `mysql_native_password` accounts: scramble verification plus
/// the password-strength policy.
#[derive(Debug)]
pub struct PlainPasswordProvider {
    validate_password: bool,
    min_password_length: usize,
}

impl PlainPasswordProvider {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            validate_password: config.validate_password,
            min_password_length: config.min_password_length,
        }
    }
}

#[async_trait]
impl AuthenticationProvider for PlainPasswordProvider {
    fn validate_password(&self, password: &str) -> Result<(), AuthenticationError> {
        if !self.validate_password {
            return Ok(());
        }
        if password.len() < self.min_password_length {
            return Err(AuthenticationError::PasswordTooShort {
                min: self.min_password_length,
            });
        }
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
        let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
        if !(has_digit && has_lowercase && has_uppercase) {
            return Err(AuthenticationError::PasswordComposition);
        }
        Ok(())
    }

    async fn authenticate(
        &self,
        _user: &str,
        _remote_ip: &str,
        auth_response: &[u8],
        seed: &[u8],
        info: &AuthenticationInfo,
    ) -> Result<(), AuthenticationError> {
        // A password-less account accepts exactly the reserved empty response.
        if info.stored_hash.is_empty() && auth_response.is_empty() {
            return Ok(());
        }
        if auth_response.len() != SCRAMBLE_LENGTH {
            return Err(AuthenticationError::PasswordLengthMismatch);
        }
        if !check_scramble(auth_response, seed, &info.stored_hash) {
            return Err(AuthenticationError::PasswordMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use borealis_mysql::scramble::scramble;

    use super::*;
    use crate::session::UserIdentity;

    const SEED: &[u8] = b"petals on a wet black bough";

    fn provider(config: &AuthConfig) -> PlainPasswordProvider {
        PlainPasswordProvider::new(config)
    }

    fn identity() -> UserIdentity {
        UserIdentity::new("test", "%")
    }

    #[test]
    fn too_short_password_is_rejected_first() {
        let config = AuthConfig::default().validate_password(8);
        assert!(matches!(
            provider(&config).validate_password("aaa"),
            Err(AuthenticationError::PasswordTooShort { min: 8 })
        ));
    }

    #[test]
    fn composition_failure_names_all_three_requirements() {
        let config = AuthConfig::default().validate_password(8);
        let bad_passwords = [
            "starrocks",
            "STARROCKS",
            "123456789",
            "STARROCKS123",
            "starrocks123",
            "STARROCKSstar",
        ];
        for bad in bad_passwords {
            let error = provider(&config).validate_password(bad).unwrap_err();
            let message = error.to_string();
            assert!(message.contains("one digit"), "{message}");
            assert!(message.contains("one lowercase letter"), "{message}");
            assert!(message.contains("one uppercase letter"), "{message}");
        }
        provider(&config).validate_password("aaaAAA123").unwrap();
    }

    #[test]
    fn disabled_policy_skips_every_rule() {
        let config = AuthConfig::default();
        provider(&config).validate_password("aaa").unwrap();
        provider(&config).validate_password("").unwrap();
    }

    #[tokio::test]
    async fn accepts_matching_scramble() {
        let config = AuthConfig::default();
        for password in ["asdf123", "starrocks", "testtest"] {
            let info = AuthenticationInfo::plain_password(identity(), password);
            let response = scramble(SEED, password);
            provider(&config)
                .authenticate("test", "10.1.1.1", &response, SEED, &info)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn rejects_altered_scramble() {
        let config = AuthConfig::default();
        let info = AuthenticationInfo::plain_password(identity(), "asdf123");
        let mut response = scramble(SEED, "asdf123");
        response[7] ^= 0x01;
        assert!(matches!(
            provider(&config)
                .authenticate("test", "10.1.1.1", &response, SEED, &info)
                .await,
            Err(AuthenticationError::PasswordMismatch)
        ));
    }

    #[tokio::test]
    async fn password_less_account_accepts_only_empty_response() {
        let config = AuthConfig::default();
        let info = AuthenticationInfo::plain_password(identity(), "");
        provider(&config)
            .authenticate("test", "10.1.1.1", &[], &[], &info)
            .await
            .unwrap();
        assert!(matches!(
            provider(&config)
                .authenticate("test", "10.1.1.1", b"xx", b"x", &info)
                .await,
            Err(AuthenticationError::PasswordLengthMismatch)
        ));
    }

    #[tokio::test]
    async fn length_mismatch_is_distinct_from_content_mismatch() {
        let config = AuthConfig::default();
        let info = AuthenticationInfo::plain_password(identity(), "bb");
        assert!(matches!(
            provider(&config)
                .authenticate("test", "10.1.1.1", b"wrong length", SEED, &info)
                .await,
            Err(AuthenticationError::PasswordLengthMismatch)
        ));
        assert!(matches!(
            provider(&config)
                .authenticate("test", "10.1.1.1", &scramble(SEED, "xx"), SEED, &info)
                .await,
            Err(AuthenticationError::PasswordMismatch)
        ));
    }
}
