//! List-request parameters for the record store.

use serde::{Deserialize, Serialize};

use crate::config::MAX_PAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: &str) -> Self {
        Sort {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Sort {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Query parameters for a list request. Unset values are omitted from the URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub view: Option<String>,
    pub page_size: Option<u32>,
    pub max_records: Option<u32>,
    pub offset: Option<String>,
    pub sort: Vec<Sort>,
    pub filter_by_formula: Option<String>,
    pub fields: Vec<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Clamped to 1..=100.
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size.clamp(1, MAX_PAGE_SIZE));
        self
    }

    pub fn max_records(mut self, max: u32) -> Self {
        self.max_records = Some(max);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn formula(mut self, formula: Option<String>) -> Self {
        self.filter_by_formula = formula;
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Same query positioned at `offset`.
    pub(crate) fn at_offset(&self, offset: Option<String>) -> Self {
        ListQuery {
            offset,
            ..self.clone()
        }
    }

    /// Key/value pairs in the record store's bracket notation.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(view) = &self.view {
            pairs.push(("view".into(), view.clone()));
        }
        if let Some(size) = self.page_size {
            let size = size.clamp(1, MAX_PAGE_SIZE);
            pairs.push(("pageSize".into(), size.to_string()));
        }
        if let Some(max) = self.max_records {
            pairs.push(("maxRecords".into(), max.to_string()));
        }
        if let Some(offset) = &self.offset {
            pairs.push(("offset".into(), offset.clone()));
        }
        for (i, sort) in self.sort.iter().enumerate() {
            pairs.push((format!("sort[{i}][field]"), sort.field.clone()));
            pairs.push((format!("sort[{i}][direction]"), sort.direction.as_str().into()));
        }
        if let Some(formula) = &self.filter_by_formula {
            pairs.push(("filterByFormula".into(), formula.clone()));
        }
        for field in &self.fields {
            pairs.push(("fields[]".into(), field.clone()));
        }

        pairs
    }
}
