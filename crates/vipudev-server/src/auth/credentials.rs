//! Credential verification for the single operator account.

use crate::config::Config;

/// Pluggable credential check. The dashboard targets one operator, so the
/// only shipped implementation compares against a fixed username/password
/// pair from the environment.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.admin_username.clone(), cfg.admin_password.clone())
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_requires_both_fields_to_match() {
        let creds = StaticCredentials::new("admin", "secret");
        assert!(creds.verify("admin", "secret"));
        assert!(!creds.verify("admin", "wrong"));
        assert!(!creds.verify("root", "secret"));
    }
}
