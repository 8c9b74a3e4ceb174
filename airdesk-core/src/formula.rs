//! Builds `filterByFormula` expressions from structured appointment filters.

use serde::{Deserialize, Serialize};

use crate::entities::appointment::{AppointmentStatus, fields};

/// Both bounds are required; a half-open range is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRange {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    fn bounds(&self) -> Option<(&str, &str)> {
        let start = self.start.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let end = self.end.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((start, end))
    }
}

/// Filter state for the appointment list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub date_range: Option<DateRange>,
    pub search: Option<String>,
}

impl AppointmentFilter {
    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Formula for this filter, or `None` when no filter is active.
    pub fn to_formula(&self) -> Option<String> {
        let mut clauses = Vec::new();

        if let Some(status) = self.status {
            clauses.push(status_clause(status));
        }

        if let Some((start, end)) = self.date_range.as_ref().and_then(DateRange::bounds) {
            clauses.push(format!(
                "AND(IS_AFTER({date}, {start}), IS_BEFORE({date}, {end}))",
                date = field(fields::DATE),
                start = string_literal(start),
                end = string_literal(end),
            ));
        }

        if let Some(text) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push(search_clause(
                &text.to_lowercase(),
                &[fields::ADDRESS, fields::CONTACT_NAME, fields::CONTACT_EMAIL],
            ));
        }

        and_all(clauses)
    }
}

fn status_clause(status: AppointmentStatus) -> String {
    let cancelled = field(fields::IS_CANCELLED);
    let date = field(fields::DATE);
    match status {
        AppointmentStatus::Upcoming => {
            format!("AND(NOT({cancelled}), IS_AFTER({date}, NOW()))")
        }
        AppointmentStatus::Completed => {
            format!("AND(NOT({cancelled}), IS_BEFORE({date}, NOW()))")
        }
        AppointmentStatus::Cancelled => cancelled,
    }
}

/// `OR(SEARCH('needle', LOWER({f1})), ...)`. `needle` must already be lower-cased.
pub fn search_clause(needle: &str, search_fields: &[&str]) -> String {
    let needle = string_literal(needle);
    let terms: Vec<String> = search_fields
        .iter()
        .map(|f| format!("SEARCH({needle}, LOWER({}))", field(f)))
        .collect();
    or_any(terms).unwrap_or_default()
}

/// `OR(RECORD_ID() = 'rec…', ...)`
pub fn record_id_clause(ids: &[String]) -> Option<String> {
    or_any(
        ids.iter()
            .map(|id| format!("RECORD_ID() = {}", string_literal(id)))
            .collect(),
    )
}

/// `{name}` field reference.
pub fn field(name: &str) -> String {
    format!("{{{name}}}")
}

/// Single-quoted string literal with `\` and `'` escaped.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn and_all(clauses: Vec<String>) -> Option<String> {
    combine("AND", clauses)
}

fn or_any(clauses: Vec<String>) -> Option<String> {
    combine("OR", clauses)
}

/// A lone clause is emitted bare.
fn combine(op: &str, mut clauses: Vec<String>) -> Option<String> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(format!("{op}({})", clauses.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_no_formula() {
        assert_eq!(AppointmentFilter::default().to_formula(), None);
        assert_eq!(
            AppointmentFilter::default().search("   ").to_formula(),
            None
        );
    }

    #[test]
    fn test_cancelled_is_exactly_the_flag() {
        let filter = AppointmentFilter::default().status(AppointmentStatus::Cancelled);
        assert_eq!(filter.to_formula().as_deref(), Some("{is_cancelled}"));

        // unset keys and a half-open range don't add anything
        let filter = AppointmentFilter {
            status: Some(AppointmentStatus::Cancelled),
            date_range: Some(DateRange {
                start: Some("2025-01-01".into()),
                end: None,
            }),
            search: None,
        };
        assert_eq!(filter.to_formula().as_deref(), Some("{is_cancelled}"));
    }

    #[test]
    fn test_upcoming_and_completed() {
        assert_eq!(
            AppointmentFilter::default()
                .status(AppointmentStatus::Upcoming)
                .to_formula()
                .unwrap(),
            "AND(NOT({is_cancelled}), IS_AFTER({appointment_date}, NOW()))"
        );
        assert_eq!(
            AppointmentFilter::default()
                .status(AppointmentStatus::Completed)
                .to_formula()
                .unwrap(),
            "AND(NOT({is_cancelled}), IS_BEFORE({appointment_date}, NOW()))"
        );
    }

    #[test]
    fn test_partial_date_range_is_dropped() {
        let only_start = AppointmentFilter::default().date_range(DateRange {
            start: Some("2025-01-01".into()),
            end: None,
        });
        assert_eq!(only_start.to_formula(), None);

        let only_end = AppointmentFilter::default().date_range(DateRange {
            start: Some("  ".into()),
            end: Some("2025-02-01".into()),
        });
        assert_eq!(only_end.to_formula(), None);
    }

    #[test]
    fn test_full_date_range() {
        let filter =
            AppointmentFilter::default().date_range(DateRange::new("2025-01-01", "2025-02-01"));
        assert_eq!(
            filter.to_formula().unwrap(),
            "AND(IS_AFTER({appointment_date}, '2025-01-01'), IS_BEFORE({appointment_date}, '2025-02-01'))"
        );
    }

    #[test]
    fn test_search_is_lowercased_across_three_fields() {
        let filter = AppointmentFilter::default().search("Baker STREET");
        assert_eq!(
            filter.to_formula().unwrap(),
            "OR(SEARCH('baker street', LOWER({appointment_address})), \
             SEARCH('baker street', LOWER({contact_name})), \
             SEARCH('baker street', LOWER({contact_email})))"
        );
    }

    #[test]
    fn test_search_quotes_are_escaped() {
        let formula = AppointmentFilter::default()
            .search("o'brien') , TRUE()")
            .to_formula()
            .unwrap();
        assert!(formula.contains(r"SEARCH('o\'brien\') , true()', LOWER({contact_name}))"));
    }

    #[test]
    fn test_clauses_are_and_combined() {
        let filter = AppointmentFilter::default()
            .status(AppointmentStatus::Cancelled)
            .date_range(DateRange::new("2025-01-01", "2025-02-01"))
            .search("x");
        let formula = filter.to_formula().unwrap();
        assert!(formula.starts_with("AND({is_cancelled}, AND(IS_AFTER("));
        assert!(formula.ends_with("SEARCH('x', LOWER({contact_email}))))"));
    }

    #[test]
    fn test_record_id_clause() {
        assert_eq!(record_id_clause(&[]), None);
        assert_eq!(
            record_id_clause(&["recA".into()]).unwrap(),
            "RECORD_ID() = 'recA'"
        );
        assert_eq!(
            record_id_clause(&["recA".into(), "recB".into()]).unwrap(),
            "OR(RECORD_ID() = 'recA', RECORD_ID() = 'recB')"
        );
    }

    #[test]
    fn test_filter_deserializes_from_ui_shape() {
        let filter: AppointmentFilter = serde_json::from_str(
            r#"{"status":"upcoming","dateRange":{"start":"2025-01-01","end":"2025-01-31"},"search":"x"}"#,
        )
        .unwrap();
        assert_eq!(filter.status, Some(AppointmentStatus::Upcoming));
        assert_eq!(
            filter.date_range,
            Some(DateRange::new("2025-01-01", "2025-01-31"))
        );
    }
}
