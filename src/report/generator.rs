//! Markdown report generation.
//!
//! This module renders the analytics report as a Markdown dashboard
//! document, or as JSON for downstream tooling.

use crate::config::ReportConfig;
use crate::models::{AnalyticsReport, ReportDocument, ReportMetadata};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(document: &ReportDocument, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Team Knowledge Dashboard\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&document.metadata));

    // Overview totals
    output.push_str(&generate_overview_section(&document.analytics));

    // Status distribution
    output.push_str(&generate_status_section(&document.analytics));

    // Team coverage
    output.push_str(&generate_team_section(&document.analytics));

    // Top desired knowledge
    output.push_str(&generate_top_desired_section(&document.analytics));

    // Alerts
    if config.include_alerts {
        output.push_str(&generate_alerts_section(&document.analytics));
    }

    // Drill-down lists
    if config.include_drilldown {
        output.push_str(&generate_drilldown_section(&document.analytics));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Backend:** {}\n", metadata.base_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));

    if !metadata.unavailable_collections.is_empty() {
        section.push_str(&format!(
            "- ⚠️ **Partial data** — unavailable: {}\n",
            metadata.unavailable_collections.join(", ")
        ));
    }

    section.push('\n');

    section
}

/// Generate the overview totals section.
fn generate_overview_section(analytics: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Employees | Knowledge Items | Links | Obtained | Expiring | Coverage |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} | **{}%** |\n\n",
        analytics.total_employees,
        analytics.total_knowledge,
        analytics.total_links,
        analytics.total_obtained,
        analytics.total_expiring,
        analytics.coverage_rate
    ));

    section
}

/// Generate the status distribution section.
fn generate_status_section(analytics: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Status Distribution\n\n");
    section.push_str("| Status | Links |\n");
    section.push_str("|:---|:---:|\n");

    for slice in &analytics.status_data {
        section.push_str(&format!("| {} | {} |\n", slice.name, slice.value));
    }
    section.push('\n');

    section
}

/// Generate the per-team coverage section.
fn generate_team_section(analytics: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Team Coverage\n\n");

    if analytics.team_data.is_empty() {
        section.push_str("No employees found.\n\n");
        return section;
    }

    section.push_str("| Team | Members | Links | Obtained | Coverage |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");

    for row in &analytics.team_data {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {}% |\n",
            row.full_team, row.employees, row.certifications, row.obtained, row.coverage
        ));
    }
    section.push('\n');

    section
}

/// Generate the top desired knowledge section.
fn generate_top_desired_section(analytics: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Most Desired Knowledge\n\n");

    if analytics.top_desired_knowledge.is_empty() {
        section.push_str("No links registered yet.\n\n");
        return section;
    }

    section.push_str("| # | Knowledge | Desired | Obtained | Mandatory |\n");
    section.push_str("|:---:|:---|:---:|:---:|:---:|\n");

    for (rank, entry) in analytics.top_desired_knowledge.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            rank + 1,
            entry.name,
            entry.desired,
            entry.obtained,
            entry.required
        ));
    }
    section.push('\n');

    section
}

/// Generate the alerts section.
fn generate_alerts_section(analytics: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Alerts\n\n");

    if analytics.alerts.is_empty() {
        section.push_str("No alerts. Everything looks healthy! 🎉\n\n");
        return section;
    }

    for alert in &analytics.alerts {
        section.push_str(&format!(
            "### {} {} — {}\n\n",
            alert.priority.emoji(),
            alert.priority,
            alert.title
        ));

        if !alert.description.is_empty() {
            section.push_str(&format!("{}\n\n", alert.description));
        }

        section.push_str(&format!("*{} record(s) affected.*\n\n", alert.data.len()));
    }

    section
}

/// Generate the drill-down lists.
fn generate_drilldown_section(analytics: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Drill-down\n\n");

    section.push_str("### Expiring Certifications\n\n");
    if analytics.expiring_certifications.is_empty() {
        section.push_str("None within the next 30 days.\n\n");
    } else {
        section.push_str("| Link | Employee | Knowledge | Expires |\n");
        section.push_str("|:---:|:---:|:---:|:---|\n");
        for link in &analytics.expiring_certifications {
            let expires = link
                .expires_at
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                link.id, link.employee_id, link.knowledge_id, expires
            ));
        }
        section.push('\n');
    }

    section.push_str("### Employees Without Links\n\n");
    if analytics.employees_without_links.is_empty() {
        section.push_str("None.\n\n");
    } else {
        for employee in &analytics.employees_without_links {
            section.push_str(&format!(
                "- {} ({})\n",
                employee.name,
                employee.team_label()
            ));
        }
        section.push('\n');
    }

    section.push_str("### Knowledge Without Links\n\n");
    if analytics.knowledge_without_links.is_empty() {
        section.push_str("None.\n\n");
    } else {
        for item in &analytics.knowledge_without_links {
            section.push_str(&format!("- {}\n", item.name));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by skillboard*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(document: &ReportDocument) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}
