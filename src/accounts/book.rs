// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::accounts::models::{Account, AccountSummary};

#[derive(Debug, Default, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<Account>,
}

/// Selectable accounts, loaded once at startup and never modified
#[derive(Debug, Clone, Default)]
pub struct AccountBook {
    accounts: Vec<Account>,
}

impl AccountBook {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// Load accounts from a TOML file; a missing file yields an empty book
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Accounts file not found, no accounts available");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read accounts file: {}", path.display()))?;
        let book = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse accounts file: {}", path.display()))?;

        info!(path = %path.display(), count = book.len(), "Loaded accounts");
        Ok(book)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let file: AccountsFile = toml::from_str(contents)?;
        if let Some(account) = file.accounts.iter().find(|a| a.username.trim().is_empty()) {
            return Err(anyhow::anyhow!("Account '{}' has an empty username", account.label()));
        }
        Ok(Self::new(file.accounts))
    }

    /// Find an account by display name or username
    pub fn find(&self, name: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.display_name.as_deref() == Some(name))
            .or_else(|| self.accounts.iter().find(|a| a.username == name))
    }

    /// Account preselected when the user names none
    pub fn default_account(&self) -> Option<&Account> {
        self.accounts.first()
    }

    pub fn summaries(&self) -> Vec<AccountSummary> {
        self.accounts.iter().map(Account::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
