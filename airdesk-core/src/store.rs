//! In-memory agent directory.
//!
//! A volatile cache of the agent list used by front ends to color badges and
//! label assignees. It is never written back; call [`AgentDirectory::set_agents`]
//! again after re-fetching to refresh it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::Agent;
use crate::entities::contact::join_name;

/// Background used when an agent has no color anywhere.
pub const DEFAULT_BADGE_COLOR: &str = "#e5e7eb";
pub const BADGE_TEXT_COLOR: &str = "#ffffff";

/// The parts of an agent the directory needs to look it up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub code: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub color: Option<String>,
}

impl AgentRef {
    fn code_key(&self) -> Option<String> {
        non_blank(self.code.as_deref()).map(str::to_uppercase)
    }

    fn name_key(&self) -> Option<String> {
        let full = join_name(self.name.as_deref(), self.surname.as_deref());
        (!full.is_empty()).then(|| full.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStyle {
    pub background: String,
    pub foreground: String,
}

#[derive(Debug, Clone, Default)]
pub struct AgentDirectory {
    agents: Vec<Agent>,
    color_by_code: HashMap<String, String>,
    color_by_name: HashMap<String, String>,
    loaded: bool,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached agents and rebuild the color indexes.
    pub fn set_agents(&mut self, agents: Vec<Agent>) {
        self.color_by_code.clear();
        self.color_by_name.clear();

        for agent in &agents {
            let Some(color) = non_blank(agent.color.as_deref()) else {
                continue;
            };
            let r = agent.to_agent_ref();
            if let Some(code) = r.code_key() {
                self.color_by_code.insert(code, color.to_string());
            }
            if let Some(name) = r.name_key() {
                self.color_by_name.insert(name, color.to_string());
            }
        }

        tracing::debug!(count = agents.len(), "agent directory loaded");
        self.agents = agents;
        self.loaded = true;
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Color for `agent`: by code, then by full name, then its own color.
    pub fn color_for<'a>(&'a self, agent: &'a AgentRef) -> Option<&'a str> {
        agent
            .code_key()
            .and_then(|code| self.color_by_code.get(&code))
            .or_else(|| agent.name_key().and_then(|name| self.color_by_name.get(&name)))
            .map(String::as_str)
            .or_else(|| non_blank(agent.color.as_deref()))
    }

    pub fn badge_style_for(&self, agent: &AgentRef) -> BadgeStyle {
        BadgeStyle {
            background: self
                .color_for(agent)
                .unwrap_or(DEFAULT_BADGE_COLOR)
                .to_string(),
            foreground: BADGE_TEXT_COLOR.to_string(),
        }
    }

    pub fn initials_for(&self, agent: &AgentRef) -> String {
        initials(agent)
    }

    pub fn display_name_for(&self, agent: &AgentRef) -> String {
        display_name(agent)
    }
}

/// First letter of each name part present, else the first two characters of
/// the code, else `??`.
pub fn initials(agent: &AgentRef) -> String {
    let letters: String = [agent.name.as_deref(), agent.surname.as_deref()]
        .into_iter()
        .filter_map(non_blank)
        .filter_map(|s| s.chars().next())
        .collect();
    if !letters.is_empty() {
        return letters.to_uppercase();
    }

    match non_blank(agent.code.as_deref()) {
        Some(code) => code.chars().take(2).collect::<String>().to_uppercase(),
        None => "??".to_string(),
    }
}

/// Whichever name parts are present, else the code, else `Agent`.
pub fn display_name(agent: &AgentRef) -> String {
    let full = join_name(agent.name.as_deref(), agent.surname.as_deref());
    if !full.is_empty() {
        return full;
    }
    non_blank(agent.code.as_deref())
        .unwrap_or("Agent")
        .to_string()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
