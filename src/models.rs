//! Data models for the knowledge dashboard.
//!
//! This module contains the wire-shaped entities fetched from the HR
//! backend and the analytics report structures produced for consumers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Sentinel team label for employees without a team assignment.
pub const NO_TEAM_LABEL: &str = "Sem Equipe";

/// Fallback display name for links pointing at a knowledge id that is
/// absent from the catalog.
pub const UNKNOWN_KNOWLEDGE_LABEL: &str = "Desconhecido";

/// Status of an employee-knowledge link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    /// Obtained / completed.
    Obtido,
    /// Desired / aspirational.
    Desejado,
    /// Mandatory but not yet obtained.
    Obrigatorio,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Obtido => write!(f, "Obtained"),
            LinkStatus::Desejado => write!(f, "Desired"),
            LinkStatus::Obrigatorio => write!(f, "Mandatory"),
        }
    }
}

impl LinkStatus {
    /// Fixed display color used by chart consumers.
    pub fn color(&self) -> &'static str {
        match self {
            LinkStatus::Obtido => "#22c55e",
            LinkStatus::Desejado => "#3b82f6",
            LinkStatus::Obrigatorio => "#ef4444",
        }
    }
}

/// A catalog entry: certification, course, or degree.
///
/// Extra fields on the wire (descriptions, categories, etc.) are ignored;
/// the dashboard only needs identity and display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

/// An employee record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    /// Team assignment. Absent or blank means "no team".
    #[serde(rename = "equipe", default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl Employee {
    /// Team label, falling back to the no-team sentinel when the
    /// assignment is absent or blank.
    pub fn team_label(&self) -> &str {
        match self.team.as_deref() {
            Some(team) if !team.trim().is_empty() => team,
            _ => NO_TEAM_LABEL,
        }
    }
}

/// One employee's relationship to one knowledge item.
///
/// Multiple links per employee and per knowledge item are allowed; the
/// backend enforces no uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeLink {
    pub id: i64,
    pub employee_id: i64,
    pub knowledge_id: i64,
    pub status: LinkStatus,
    /// Expiration of an obtained certification, if any.
    #[serde(
        rename = "data_expiracao",
        default,
        deserialize_with = "lenient_expiration",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Deserialize an optional expiration date, accepting RFC 3339 timestamps
/// or bare `YYYY-MM-DD` dates. Unparseable values degrade to `None`
/// instead of failing the record.
fn lenient_expiration<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_expiration))
}

fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    // Date-only values land at midnight UTC.
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

/// Priority of a dashboard alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertPriority::Low => write!(f, "Low"),
            AlertPriority::Medium => write!(f, "Medium"),
            AlertPriority::High => write!(f, "High"),
        }
    }
}

impl AlertPriority {
    /// Returns an emoji representation of the priority.
    pub fn emoji(&self) -> &'static str {
        match self {
            AlertPriority::Low => "🟢",
            AlertPriority::Medium => "🟡",
            AlertPriority::High => "🔴",
        }
    }
}

/// Qualifying records carried by an alert, tagged by alert kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "records", rename_all = "camelCase")]
pub enum AlertData {
    ExpiringCertifications(Vec<EmployeeLink>),
    EmployeesWithoutLinks(Vec<Employee>),
    KnowledgeWithoutLinks(Vec<KnowledgeItem>),
}

impl AlertData {
    /// Number of qualifying records behind the alert.
    pub fn len(&self) -> usize {
        match self {
            AlertData::ExpiringCertifications(links) => links.len(),
            AlertData::EmployeesWithoutLinks(employees) => employees.len(),
            AlertData::KnowledgeWithoutLinks(items) => items.len(),
        }
    }

    #[allow(dead_code)] // Utility accessor
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An advisory entry surfaced on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub title: String,
    pub description: String,
    pub priority: AlertPriority,
    #[serde(flatten)]
    pub data: AlertData,
}

/// Per-team aggregate over employees and their links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCoverage {
    pub team: String,
    /// Member count.
    pub employees: usize,
    /// Links belonging to any member, across all statuses.
    pub certifications: usize,
    /// Subset of those links in obtained status.
    pub obtained: usize,
}

/// Demand tallies for one knowledge item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeDemand {
    pub id: i64,
    pub name: String,
    pub desired: usize,
    pub obtained: usize,
    pub required: usize,
}

/// One slice of the status distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSlice {
    pub name: String,
    pub value: usize,
    pub color: String,
}

/// One row of the per-team chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamChartRow {
    /// Display label, truncated for chart axes.
    pub team: String,
    /// Untruncated team name.
    pub full_team: String,
    pub employees: usize,
    pub certifications: usize,
    pub obtained: usize,
    /// Integer percentage in [0, 100].
    pub coverage: u32,
}

/// The complete analytics report, recomputed on every aggregation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_employees: usize,
    pub total_knowledge: usize,
    pub total_links: usize,
    pub total_obtained: usize,
    pub total_expiring: usize,
    /// Overall obtained/total percentage, integer-rounded.
    pub coverage_rate: u32,
    pub team_coverage: Vec<TeamCoverage>,
    pub top_desired_knowledge: Vec<KnowledgeDemand>,
    pub status_data: Vec<StatusSlice>,
    pub team_data: Vec<TeamChartRow>,
    pub alerts: Vec<Alert>,
    pub employees_without_links: Vec<Employee>,
    pub knowledge_without_links: Vec<KnowledgeItem>,
    pub expiring_certifications: Vec<EmployeeLink>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Base URL of the backend the data came from.
    pub base_url: String,
    /// Date and time of the generation.
    pub generated_at: DateTime<Utc>,
    /// Wall-clock time spent fetching and aggregating, in seconds.
    pub duration_seconds: f64,
    /// Collections the backend failed to deliver (report is partial).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable_collections: Vec<String>,
}

/// Report document written to disk: metadata plus the analytics payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub analytics: AnalyticsReport,
}
