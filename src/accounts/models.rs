// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steam account handed to the external downloader
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub username: String,

    /// Opaque credential, passed through to the downloader untouched
    pub password: String,

    #[serde(default)]
    pub display_name: Option<String>,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: None,
        }
    }

    /// Name shown to the user
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            label: self.label().to_string(),
            username: self.username.clone(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Credential-free view of an account for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub label: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prefers_display_name() {
        let mut account = Account::new("steamuser", "hunter2");
        assert_eq!(account.label(), "steamuser");

        account.display_name = Some("Account 1".to_string());
        assert_eq!(account.label(), "Account 1");
    }

    #[test]
    fn test_debug_redacts_password() {
        let account = Account::new("steamuser", "hunter2");
        let debug = format!("{:?}", account);
        assert!(debug.contains("steamuser"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_summary_serializes_without_password() {
        let account = Account {
            username: "steamuser".to_string(),
            password: "hunter2".to_string(),
            display_name: Some("Main".to_string()),
        };

        let json = serde_json::to_string(&account.summary()).unwrap();
        assert!(json.contains("\"label\":\"Main\""));
        assert!(json.contains("\"username\":\"steamuser\""));
        assert!(!json.contains("hunter2"));
    }
}
