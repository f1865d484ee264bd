// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The accounts file: agent command, directories, and deployment accounts.
//!
//! Tokens never live in the file. Each account names the environment
//! variable holding its token, resolved once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use forge_adapters::ExecIdentity;
use forge_core::Account;
use forge_engine::{SupervisorConfig, DEFAULT_AGENT_ARGS, DEFAULT_ENV_ALLOW};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_AGENT_COMMAND: &str = "claude";
pub const DEFAULT_WORKSPACE_ROOT: &str = "/workspace";
pub const DEFAULT_LOG_DIR: &str = "/logs";
/// Accent used when an account sets no color
pub const DEFAULT_COLOR: u32 = 0x5865f2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("account '{account}' has no token: ${var} is not set")]
    MissingToken { account: String, var: String },

    #[error("unknown account '{0}'")]
    UnknownAccount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSection {
    pub command: String,
    pub args: Vec<String>,
    /// Orchestrator variables passed through to the agent
    pub env_allow: Vec<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            command: DEFAULT_AGENT_COMMAND.to_string(),
            args: DEFAULT_AGENT_ARGS.iter().map(|s| s.to_string()).collect(),
            env_allow: DEFAULT_ENV_ALLOW.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Unprivileged user the agent runs as
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    pub uid: u32,
    pub gid: u32,
    pub user: String,
    pub home: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSection {
    /// Identity name on the hosting service
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<u32>,
    /// Environment variable holding the deploy token
    pub token_env: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    pub agent: AgentSection,
    pub workspace_root: PathBuf,
    pub log_dir: PathBuf,
    pub identity: Option<IdentitySection>,
    pub accounts: BTreeMap<String, AccountSection>,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            agent: AgentSection::default(),
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            identity: None,
            accounts: BTreeMap::new(),
        }
    }
}

impl ForgeConfig {
    /// Load from `path`. A missing file yields the defaults with no accounts.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path: path.to_owned(), source }),
        }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    /// Resolve every account's token through `lookup`.
    pub fn resolve_accounts(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<AccountBook, ConfigError> {
        let mut accounts = BTreeMap::new();
        for (key, section) in &self.accounts {
            let token = lookup(&section.token_env).filter(|t| !t.is_empty()).ok_or_else(|| {
                ConfigError::MissingToken { account: key.clone(), var: section.token_env.clone() }
            })?;
            accounts.insert(
                key.clone(),
                Account {
                    key: key.clone(),
                    name: section.name.clone(),
                    label: section.label.clone().unwrap_or_else(|| key.clone()),
                    token,
                    color: section.color.unwrap_or(DEFAULT_COLOR),
                },
            );
        }
        Ok(AccountBook::new(accounts))
    }

    /// Supervisor settings for this file; timing comes from the environment.
    pub fn supervisor_config(&self) -> SupervisorConfig {
        let config = SupervisorConfig::new(self.agent.command.clone(), self.workspace_root.clone())
            .args(self.agent.args.clone())
            .env_allow(self.agent.env_allow.clone());
        match &self.identity {
            Some(i) => config.identity(ExecIdentity {
                uid: i.uid,
                gid: i.gid,
                user: i.user.clone(),
                home: i.home.clone(),
            }),
            None => config,
        }
    }
}

/// Accounts with their tokens resolved, keyed by config key.
#[derive(Debug, Clone, Default)]
pub struct AccountBook {
    accounts: BTreeMap<String, Account>,
}

impl AccountBook {
    pub fn new(accounts: BTreeMap<String, Account>) -> Self {
        Self { accounts }
    }

    pub fn get(&self, key: &str) -> Result<&Account, ConfigError> {
        self.accounts.get(key).ok_or_else(|| ConfigError::UnknownAccount(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl FromIterator<Account> for AccountBook {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|a| (a.key.clone(), a)).collect())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
