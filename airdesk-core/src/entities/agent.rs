use serde::{Deserialize, Serialize};

use super::Entity;
use super::contact::join_name;
use crate::config::Tables;
use crate::error::AirdeskResult;
use crate::formula::record_id_clause;
use crate::query::ListQuery;
use crate::response::ApiResponse;
use crate::service::EntityService;
use crate::store::AgentRef;

pub mod fields {
    pub const NAME: &str = "agent_name";
    pub const SURNAME: &str = "agent_surname";
    pub const EMAIL: &str = "agent_email";
    /// Badge color, a hex string like `#CCD070`.
    pub const COLOR: &str = "color";
    pub const CODE: &str = "code";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    #[serde(rename = "agent_name", default)]
    pub name: Option<String>,
    #[serde(rename = "agent_surname", default)]
    pub surname: Option<String>,
    #[serde(rename = "agent_email", default)]
    pub email: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl Entity for Agent {
    const NAME: &'static str = "agent";
    const MANUAL_FIELDS: &'static [&'static str] = &[
        fields::NAME,
        fields::SURNAME,
        fields::EMAIL,
        fields::COLOR,
        fields::CODE,
    ];

    fn table(tables: &Tables) -> &str {
        &tables.agents
    }
}

impl Agent {
    pub fn full_name(&self) -> String {
        join_name(self.name.as_deref(), self.surname.as_deref())
    }

    pub fn to_agent_ref(&self) -> AgentRef {
        AgentRef {
            code: self.code.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            color: self.color.clone(),
        }
    }
}

impl EntityService<Agent> {
    /// One page through the configured view, with caller overrides.
    pub async fn list_agents(
        &self,
        query: Option<ListQuery>,
    ) -> AirdeskResult<ApiResponse<Vec<Agent>>> {
        self.list(Some(self.with_default_view(query))).await
    }

    /// Agents whose record id is in `ids`. Malformed ids are skipped; if none
    /// remain, no request is made.
    pub async fn get_agents_by_ids(&self, ids: &[String]) -> AirdeskResult<Vec<Agent>> {
        let ids = crate::record::valid_ids(ids.iter().map(String::as_str));
        let Some(formula) = record_id_clause(&ids) else {
            return Ok(Vec::new());
        };

        let query = self.default_query().formula(Some(formula));
        Ok(self.list_all(Some(query)).await?.into_data())
    }
}
