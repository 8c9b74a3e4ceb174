//! Entry point bundling the settings and one service per table.

use std::path::Path;

use crate::client::AirtableClient;
use crate::config::Settings;
use crate::entities::{Agent, Appointment, Contact};
use crate::error::AirdeskResult;
use crate::service::EntityService;
use crate::store::AgentDirectory;

#[derive(Clone)]
pub struct Airdesk {
    settings: Settings,
    pub contacts: EntityService<Contact>,
    pub agents: EntityService<Agent>,
    pub appointments: EntityService<Appointment>,
}

impl Airdesk {
    /// Load settings from the default config file and environment, writing a
    /// commented config file on first run.
    pub fn load() -> AirdeskResult<Self> {
        let path = Settings::config_path()?;
        if !path.exists() {
            Settings::create_default_config(&path)?;
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> AirdeskResult<Self> {
        let settings = Settings::load_from(path, None)?;
        Self::from_settings(settings)
    }

    pub fn from_settings(settings: Settings) -> AirdeskResult<Self> {
        settings.validate()?;
        let client = AirtableClient::from_settings(&settings)?;

        Ok(Airdesk {
            contacts: EntityService::new(client.clone(), &settings),
            agents: EntityService::new(client.clone(), &settings),
            appointments: EntityService::new(client, &settings),
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch every agent into a fresh directory.
    pub async fn agent_directory(&self) -> AirdeskResult<AgentDirectory> {
        let agents = self.agents.list_all(None).await?.into_data();
        let mut directory = AgentDirectory::new();
        directory.set_agents(agents);
        Ok(directory)
    }
}
