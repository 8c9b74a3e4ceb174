//! airdesk settings.
//!
//! Layered as: built-in defaults, then ~/.config/airdesk/config.toml (optional),
//! then `AIRTABLE_*` environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AirdeskError, AirdeskResult};

pub const ENV_PREFIX: &str = "AIRTABLE";
pub const DEFAULT_VIEW: &str = "Grid view";
/// Largest page the record store will serve.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: usize = 500;

/// Table names inside the base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default = "default_contacts_table")]
    pub contacts: String,
    #[serde(default = "default_agents_table")]
    pub agents: String,
    #[serde(default = "default_appointments_table")]
    pub appointments: String,
}

fn default_contacts_table() -> String {
    "contacts".into()
}

fn default_agents_table() -> String {
    "agents".into()
}

fn default_appointments_table() -> String {
    "appointments".into()
}

impl Default for Tables {
    fn default() -> Self {
        Tables {
            contacts: default_contacts_table(),
            agents: default_agents_table(),
            appointments: default_appointments_table(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Base URL including the base id, e.g. `https://api.airtable.com/v0/appXXXX`.
    pub api_url: String,
    pub api_key: String,
    pub view: String,
    pub page_size: u32,
    pub max_pages: usize,
    #[serde(default)]
    pub tables: Tables,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("view", &self.view)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("tables", &self.tables)
            .finish()
    }
}

impl Settings {
    pub fn config_path() -> AirdeskResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AirdeskError::Config("Could not determine config directory".into()))?
            .join("airdesk");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config file and the process environment.
    pub fn load() -> AirdeskResult<Self> {
        Self::load_from(&Self::config_path()?, None)
    }

    /// Load from `path` (if it exists) and environment variables.
    ///
    /// `env` replaces the process environment when given.
    pub fn load_from(path: &Path, env: Option<HashMap<String, String>>) -> AirdeskResult<Self> {
        // AIRTABLE_TABLES__AGENTS maps to tables.agents
        let env_source = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        let settings: Settings = config::Config::builder()
            .set_default("view", DEFAULT_VIEW)
            .and_then(|b| b.set_default("page_size", i64::from(MAX_PAGE_SIZE)))
            .and_then(|b| b.set_default("max_pages", DEFAULT_MAX_PAGES as i64))
            .and_then(|b| b.set_default("api_url", ""))
            .and_then(|b| b.set_default("api_key", ""))
            .map_err(|e| AirdeskError::Config(e.to_string()))?
            .add_source(config::File::from(path).required(false))
            .add_source(env_source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AirdeskError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> AirdeskResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(AirdeskError::Config(format!(
                "No API URL configured. Set {ENV_PREFIX}_API_URL or api_url in the config file"
            )));
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| AirdeskError::Config(format!("Invalid api_url '{}': {e}", self.api_url)))?;

        if self.api_key.trim().is_empty() {
            return Err(AirdeskError::Config(format!(
                "No API key configured. Set {ENV_PREFIX}_API_KEY or api_key in the config file"
            )));
        }
        if self.max_pages == 0 {
            return Err(AirdeskError::Config("max_pages must be at least 1".into()));
        }
        Ok(())
    }

    /// Page size clamped to what the record store accepts.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AirdeskResult<()> {
        let contents = format!(
            "\
# airdesk configuration
#
# Every key can also be set through the environment, e.g. {ENV_PREFIX}_API_KEY.
# Table names nest with a double underscore: {ENV_PREFIX}_TABLES__AGENTS.

# Base URL including your base id:
# api_url = \"https://api.airtable.com/v0/appXXXXXXXXXXXXXX\"

# Personal access token:
# api_key = \"pat...\"

# view = \"{DEFAULT_VIEW}\"
# page_size = {MAX_PAGE_SIZE}
# max_pages = {DEFAULT_MAX_PAGES}

# [tables]
# contacts = \"contacts\"
# agents = \"agents\"
# appointments = \"appointments\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AirdeskError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AirdeskError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
