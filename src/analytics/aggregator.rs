//! Dashboard analytics aggregation.
//!
//! This module computes the full analytics report from the three fetched
//! collections. It is pure: the caller supplies the clock, inputs are
//! never mutated, and the report owns all of its data.

use crate::models::{
    Alert, AlertData, AlertPriority, AnalyticsReport, Employee, EmployeeLink, KnowledgeDemand,
    KnowledgeItem, LinkStatus, StatusSlice, TeamChartRow, TeamCoverage, UNKNOWN_KNOWLEDGE_LABEL,
};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Certifications expiring within this many days raise an alert.
const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Number of entries kept in the top-desired ranking.
const TOP_DESIRED_LIMIT: usize = 5;

/// Chart axis labels longer than this are truncated.
const TEAM_LABEL_MAX_CHARS: usize = 15;

/// Insertion-order-preserving grouping map.
///
/// Report ordering follows first-encounter order of the inputs, never the
/// iteration order of a hash map.
struct OrderedMap<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K: Eq + Hash + Clone, V: Default> OrderedMap<K, V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Aggregate slot for `key`, created on first sight.
    fn entry(&mut self, key: K) -> &mut V {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries.push((key.clone(), V::default()));
                self.index.insert(key, slot);
                slot
            }
        };
        &mut self.entries[slot].1
    }

    fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

#[derive(Default)]
struct TeamTally {
    employees: usize,
    certifications: usize,
    obtained: usize,
}

#[derive(Default)]
struct DemandTally {
    desired: usize,
    obtained: usize,
    required: usize,
}

/// Compute the complete analytics report for one snapshot of the data.
///
/// `now` is the caller's clock; expiration comparisons use it at full
/// timestamp precision, so tests must pass a fixed value.
pub fn compute_analytics(
    knowledge: &[KnowledgeItem],
    employees: &[Employee],
    links: &[EmployeeLink],
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let window_end = now + Duration::days(EXPIRING_WINDOW_DAYS);

    // Obtained links whose expiration falls inside [now, now + 30d],
    // inclusive on both ends. Already-expired links do not qualify.
    let expiring_certifications: Vec<EmployeeLink> = links
        .iter()
        .filter(|link| link.status == LinkStatus::Obtido)
        .filter(|link| matches!(link.expires_at, Some(exp) if exp >= now && exp <= window_end))
        .cloned()
        .collect();

    // Links indexed by employee, for team rollups and orphan detection.
    let mut links_by_employee: HashMap<i64, Vec<&EmployeeLink>> = HashMap::new();
    for link in links {
        links_by_employee
            .entry(link.employee_id)
            .or_default()
            .push(link);
    }

    // Team coverage, grouped in first-member-encountered order. Links whose
    // employee_id resolves to no employee belong to no team.
    let mut teams: OrderedMap<String, TeamTally> = OrderedMap::new();
    for employee in employees {
        let tally = teams.entry(employee.team_label().to_string());
        tally.employees += 1;

        if let Some(member_links) = links_by_employee.get(&employee.id) {
            tally.certifications += member_links.len();
            tally.obtained += member_links
                .iter()
                .filter(|link| link.status == LinkStatus::Obtido)
                .count();
        }
    }

    let team_coverage: Vec<TeamCoverage> = teams
        .into_entries()
        .into_iter()
        .map(|(team, tally)| TeamCoverage {
            team,
            employees: tally.employees,
            certifications: tally.certifications,
            obtained: tally.obtained,
        })
        .collect();

    let team_data: Vec<TeamChartRow> = team_coverage
        .iter()
        .map(|entry| TeamChartRow {
            team: truncate_label(&entry.team),
            full_team: entry.team.clone(),
            employees: entry.employees,
            certifications: entry.certifications,
            obtained: entry.obtained,
            coverage: percentage(entry.obtained, entry.certifications),
        })
        .collect();

    // Per-knowledge demand, grouped in first-link-encountered order.
    let name_by_id: HashMap<i64, &str> = knowledge
        .iter()
        .map(|item| (item.id, item.name.as_str()))
        .collect();

    let mut demand: OrderedMap<i64, DemandTally> = OrderedMap::new();
    for link in links {
        let tally = demand.entry(link.knowledge_id);
        match link.status {
            LinkStatus::Obtido => tally.obtained += 1,
            LinkStatus::Desejado => tally.desired += 1,
            LinkStatus::Obrigatorio => tally.required += 1,
        }
    }

    let mut top_desired_knowledge: Vec<KnowledgeDemand> = demand
        .into_entries()
        .into_iter()
        .map(|(id, tally)| KnowledgeDemand {
            id,
            name: name_by_id
                .get(&id)
                .copied()
                .unwrap_or(UNKNOWN_KNOWLEDGE_LABEL)
                .to_string(),
            desired: tally.desired,
            obtained: tally.obtained,
            required: tally.required,
        })
        .collect();

    // sort_by_key is stable: ties keep encounter order.
    top_desired_knowledge.sort_by_key(|entry| Reverse(entry.desired));
    top_desired_knowledge.truncate(TOP_DESIRED_LIMIT);

    // Status distribution. The enum is exhaustive, so the three slices
    // always sum to the link count.
    let mut obtained_count = 0;
    let mut desired_count = 0;
    let mut required_count = 0;
    for link in links {
        match link.status {
            LinkStatus::Obtido => obtained_count += 1,
            LinkStatus::Desejado => desired_count += 1,
            LinkStatus::Obrigatorio => required_count += 1,
        }
    }

    let status_data = vec![
        status_slice(LinkStatus::Obtido, obtained_count),
        status_slice(LinkStatus::Desejado, desired_count),
        status_slice(LinkStatus::Obrigatorio, required_count),
    ];

    // Orphans: employees with zero links, knowledge referenced by none.
    let employees_without_links: Vec<Employee> = employees
        .iter()
        .filter(|employee| !links_by_employee.contains_key(&employee.id))
        .cloned()
        .collect();

    let linked_knowledge: HashSet<i64> = links.iter().map(|link| link.knowledge_id).collect();
    let knowledge_without_links: Vec<KnowledgeItem> = knowledge
        .iter()
        .filter(|item| !linked_knowledge.contains(&item.id))
        .cloned()
        .collect();

    let alerts = build_alerts(
        &expiring_certifications,
        &employees_without_links,
        &knowledge_without_links,
    );

    AnalyticsReport {
        total_employees: employees.len(),
        total_knowledge: knowledge.len(),
        total_links: links.len(),
        total_obtained: obtained_count,
        total_expiring: expiring_certifications.len(),
        coverage_rate: percentage(obtained_count, links.len()),
        team_coverage,
        top_desired_knowledge,
        status_data,
        team_data,
        alerts,
        employees_without_links,
        knowledge_without_links,
        expiring_certifications,
    }
}

/// Build the alert list in fixed priority order. An alert is only emitted
/// when its trigger count is above zero.
fn build_alerts(
    expiring: &[EmployeeLink],
    orphan_employees: &[Employee],
    orphan_knowledge: &[KnowledgeItem],
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if !expiring.is_empty() {
        alerts.push(Alert {
            title: format!(
                "{} certification(s) expiring within {} days",
                expiring.len(),
                EXPIRING_WINDOW_DAYS
            ),
            description: "Obtained certifications with an expiration date inside the next 30 days."
                .to_string(),
            priority: AlertPriority::High,
            data: AlertData::ExpiringCertifications(expiring.to_vec()),
        });
    }

    if !orphan_employees.is_empty() {
        alerts.push(Alert {
            title: format!(
                "{} employee(s) without registered knowledge",
                orphan_employees.len()
            ),
            description: preview_names(orphan_employees.iter().map(|e| e.name.as_str()), 3),
            priority: AlertPriority::Medium,
            data: AlertData::EmployeesWithoutLinks(orphan_employees.to_vec()),
        });
    }

    if !orphan_knowledge.is_empty() {
        alerts.push(Alert {
            title: format!(
                "{} knowledge item(s) without any links",
                orphan_knowledge.len()
            ),
            description: preview_names(orphan_knowledge.iter().map(|k| k.name.as_str()), 2),
            priority: AlertPriority::Low,
            data: AlertData::KnowledgeWithoutLinks(orphan_knowledge.to_vec()),
        });
    }

    alerts
}

fn status_slice(status: LinkStatus, value: usize) -> StatusSlice {
    StatusSlice {
        name: status.to_string(),
        value,
        color: status.color().to_string(),
    }
}

/// Integer-rounded percentage; a zero denominator yields zero.
fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// Chart axis label: first 15 characters plus an ellipsis when longer.
fn truncate_label(name: &str) -> String {
    if name.chars().count() > TEAM_LABEL_MAX_CHARS {
        let prefix: String = name.chars().take(TEAM_LABEL_MAX_CHARS).collect();
        format!("{}...", prefix)
    } else {
        name.to_string()
    }
}

/// First `limit` names joined by ", ", with a trailing "..." when more exist.
fn preview_names<'a>(names: impl Iterator<Item = &'a str>, limit: usize) -> String {
    let names: Vec<&str> = names.collect();
    let mut preview = names
        .iter()
        .take(limit)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > limit {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn item(id: i64, name: &str) -> KnowledgeItem {
        KnowledgeItem {
            id,
            name: name.to_string(),
        }
    }

    fn employee(id: i64, name: &str, team: Option<&str>) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            team: team.map(String::from),
        }
    }

    fn link(id: i64, employee_id: i64, knowledge_id: i64, status: LinkStatus) -> EmployeeLink {
        EmployeeLink {
            id,
            employee_id,
            knowledge_id,
            status,
            expires_at: None,
        }
    }

    fn expiring_link(
        id: i64,
        employee_id: i64,
        knowledge_id: i64,
        status: LinkStatus,
        expires_at: DateTime<Utc>,
    ) -> EmployeeLink {
        EmployeeLink {
            expires_at: Some(expires_at),
            ..link(id, employee_id, knowledge_id, status)
        }
    }

    #[test]
    fn test_empty_inputs_yield_empty_report() {
        let report = compute_analytics(&[], &[], &[], fixed_now());

        assert_eq!(report.total_employees, 0);
        assert_eq!(report.total_links, 0);
        assert_eq!(report.coverage_rate, 0);
        assert!(report.team_coverage.is_empty());
        assert!(report.top_desired_knowledge.is_empty());
        assert!(report.team_data.is_empty());
        assert!(report.alerts.is_empty());

        // The status chart keeps its fixed three slices even with no data.
        assert_eq!(report.status_data.len(), 3);
        assert!(report.status_data.iter().all(|slice| slice.value == 0));
    }

    #[test]
    fn test_single_employee_without_links() {
        let employees = vec![employee(1, "Ana", None)];
        let report = compute_analytics(&[], &employees, &[], fixed_now());

        assert_eq!(report.coverage_rate, 0);
        assert_eq!(report.employees_without_links.len(), 1);
        assert_eq!(report.employees_without_links[0].id, 1);

        assert_eq!(report.alerts.len(), 1);
        let alert = &report.alerts[0];
        assert_eq!(alert.priority, AlertPriority::Medium);
        assert!(alert.title.starts_with('1'));
        assert_eq!(alert.data.len(), 1);
    }

    #[test]
    fn test_expiring_window_boundaries() {
        let now = fixed_now();
        let employees = vec![employee(1, "Ana", Some("Dados"))];
        let knowledge = vec![item(10, "AWS")];
        let links = vec![
            expiring_link(1, 1, 10, LinkStatus::Obtido, now + Duration::days(10)),
            expiring_link(2, 1, 10, LinkStatus::Obtido, now + Duration::days(40)),
            expiring_link(3, 1, 10, LinkStatus::Obtido, now - Duration::days(1)),
            // Desired links never expire regardless of date.
            expiring_link(4, 1, 10, LinkStatus::Desejado, now + Duration::days(5)),
        ];

        let report = compute_analytics(&knowledge, &employees, &links, now);

        assert_eq!(report.total_expiring, 1);
        assert_eq!(report.expiring_certifications[0].id, 1);
    }

    #[test]
    fn test_expiring_window_is_inclusive() {
        let now = fixed_now();
        let employees = vec![employee(1, "Ana", None)];
        let knowledge = vec![item(10, "AWS")];
        let links = vec![
            expiring_link(1, 1, 10, LinkStatus::Obtido, now),
            expiring_link(2, 1, 10, LinkStatus::Obtido, now + Duration::days(30)),
        ];

        let report = compute_analytics(&knowledge, &employees, &links, now);
        assert_eq!(report.total_expiring, 2);
    }

    #[test]
    fn test_team_coverage_full_obtained() {
        // 6 employees across two teams, each holding one obtained link.
        let employees = vec![
            employee(1, "Ana", Some("A")),
            employee(2, "Bruno", Some("A")),
            employee(3, "Carla", Some("A")),
            employee(4, "Davi", Some("A")),
            employee(5, "Elisa", Some("B")),
            employee(6, "Fabio", Some("B")),
        ];
        let knowledge = vec![item(10, "AWS")];
        let links: Vec<EmployeeLink> = (1..=6)
            .map(|id| link(id, id, 10, LinkStatus::Obtido))
            .collect();

        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        assert_eq!(report.team_coverage.len(), 2);
        let team_a = &report.team_coverage[0];
        assert_eq!(team_a.team, "A");
        assert_eq!(team_a.employees, 4);
        assert_eq!(team_a.obtained, 4);

        assert!(report.team_data.iter().all(|row| row.coverage == 100));
    }

    #[test]
    fn test_member_sum_matches_employee_count() {
        let employees = vec![
            employee(1, "Ana", Some("Dados")),
            employee(2, "Bruno", None),
            employee(3, "Carla", Some("Plataforma")),
            employee(4, "Davi", Some("Dados")),
            employee(5, "Elisa", Some("")),
        ];

        let report = compute_analytics(&[], &employees, &[], fixed_now());

        let member_sum: usize = report.team_coverage.iter().map(|t| t.employees).sum();
        assert_eq!(member_sum, employees.len());

        // Absent and blank team labels both collapse into the sentinel.
        let no_team = report
            .team_coverage
            .iter()
            .find(|t| t.team == crate::models::NO_TEAM_LABEL)
            .unwrap();
        assert_eq!(no_team.employees, 2);
    }

    #[test]
    fn test_team_obtained_never_exceeds_certifications() {
        let employees = vec![
            employee(1, "Ana", Some("Dados")),
            employee(2, "Bruno", Some("Dados")),
        ];
        let knowledge = vec![item(10, "AWS"), item(11, "GCP")];
        let links = vec![
            link(1, 1, 10, LinkStatus::Obtido),
            link(2, 1, 11, LinkStatus::Desejado),
            link(3, 2, 10, LinkStatus::Obrigatorio),
        ];

        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        for entry in &report.team_coverage {
            assert!(entry.obtained <= entry.certifications);
        }
        let dados = &report.team_coverage[0];
        assert_eq!(dados.certifications, 3);
        assert_eq!(dados.obtained, 1);

        // round(100 * 1/3) == 33
        assert_eq!(report.team_data[0].coverage, 33);
    }

    #[test]
    fn test_unassigned_links_count_toward_no_team() {
        // A link whose employee_id resolves to nobody joins no team tally.
        let employees = vec![employee(1, "Ana", Some("Dados"))];
        let knowledge = vec![item(10, "AWS")];
        let links = vec![
            link(1, 1, 10, LinkStatus::Obtido),
            link(2, 99, 10, LinkStatus::Obtido),
        ];

        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        let total_team_certifications: usize =
            report.team_coverage.iter().map(|t| t.certifications).sum();
        assert_eq!(total_team_certifications, 1);

        // The stray link still counts in the global totals.
        assert_eq!(report.total_links, 2);
        assert_eq!(report.total_obtained, 2);
    }

    #[test]
    fn test_top_desired_ranking_and_limit() {
        let knowledge: Vec<KnowledgeItem> = (1..=7).map(|id| item(id, &format!("K{}", id))).collect();
        let mut links = Vec::new();
        let mut next_id = 0;
        // Knowledge item N receives N desired links, so 7 > 6 > ... > 1.
        for knowledge_id in 1..=7 {
            for _ in 0..knowledge_id {
                next_id += 1;
                links.push(link(next_id, 1, knowledge_id, LinkStatus::Desejado));
            }
        }

        let employees = vec![employee(1, "Ana", None)];
        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        assert_eq!(report.top_desired_knowledge.len(), 5);
        let desired: Vec<usize> = report
            .top_desired_knowledge
            .iter()
            .map(|entry| entry.desired)
            .collect();
        assert_eq!(desired, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_top_desired_ties_keep_encounter_order() {
        let knowledge = vec![item(1, "First"), item(2, "Second"), item(3, "Third")];
        let links = vec![
            link(1, 1, 2, LinkStatus::Desejado),
            link(2, 1, 1, LinkStatus::Desejado),
            link(3, 1, 3, LinkStatus::Desejado),
        ];
        let employees = vec![employee(1, "Ana", None)];

        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        // All tied at 1 desired; order follows the link stream: 2, 1, 3.
        let ids: Vec<i64> = report
            .top_desired_knowledge
            .iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_unknown_knowledge_resolves_to_fallback_name() {
        let employees = vec![employee(1, "Ana", None)];
        let links = vec![link(1, 1, 404, LinkStatus::Desejado)];

        let report = compute_analytics(&[], &employees, &links, fixed_now());

        assert_eq!(report.top_desired_knowledge.len(), 1);
        assert_eq!(report.top_desired_knowledge[0].name, UNKNOWN_KNOWLEDGE_LABEL);
        assert_eq!(report.top_desired_knowledge[0].id, 404);
    }

    #[test]
    fn test_status_distribution_sums_to_link_count() {
        let employees = vec![employee(1, "Ana", None)];
        let knowledge = vec![item(10, "AWS")];
        let links = vec![
            link(1, 1, 10, LinkStatus::Obtido),
            link(2, 1, 10, LinkStatus::Obtido),
            link(3, 1, 10, LinkStatus::Desejado),
            link(4, 1, 10, LinkStatus::Obrigatorio),
        ];

        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        let total: usize = report.status_data.iter().map(|slice| slice.value).sum();
        assert_eq!(total, links.len());

        assert_eq!(report.status_data[0].value, 2);
        assert_eq!(report.status_data[0].color, "#22c55e");
        assert_eq!(report.status_data[1].value, 1);
        assert_eq!(report.status_data[2].value, 1);
    }

    #[test]
    fn test_overall_coverage_rounding() {
        let employees = vec![employee(1, "Ana", None)];
        let knowledge = vec![item(10, "AWS")];
        let links = vec![
            link(1, 1, 10, LinkStatus::Obtido),
            link(2, 1, 10, LinkStatus::Obtido),
            link(3, 1, 10, LinkStatus::Desejado),
        ];

        let report = compute_analytics(&knowledge, &employees, &links, fixed_now());

        // round(100 * 2/3) == 67
        assert_eq!(report.coverage_rate, 67);
    }

    #[test]
    fn test_team_label_truncation() {
        let employees = vec![employee(1, "Ana", Some("Engenharia de Confiabilidade"))];

        let report = compute_analytics(&[], &employees, &[], fixed_now());

        let row = &report.team_data[0];
        assert_eq!(row.team, "Engenharia de C...");
        assert_eq!(row.full_team, "Engenharia de Confiabilidade");

        // Short labels pass through untouched.
        let short = compute_analytics(&[], &[employee(1, "Ana", Some("Dados"))], &[], fixed_now());
        assert_eq!(short.team_data[0].team, "Dados");
    }

    #[test]
    fn test_alert_order_and_previews() {
        let now = fixed_now();
        let employees = vec![
            employee(1, "Ana", None),
            employee(2, "Bruno", None),
            employee(3, "Carla", None),
            employee(4, "Davi", None),
            employee(5, "Elisa", None),
        ];
        let knowledge = vec![item(10, "AWS"), item(11, "GCP"), item(12, "Azure")];
        let links = vec![expiring_link(
            1,
            5,
            99,
            LinkStatus::Obtido,
            now + Duration::days(3),
        )];

        let report = compute_analytics(&knowledge, &employees, &links, now);

        assert_eq!(report.alerts.len(), 3);
        assert_eq!(report.alerts[0].priority, AlertPriority::High);
        assert_eq!(report.alerts[1].priority, AlertPriority::Medium);
        assert_eq!(report.alerts[2].priority, AlertPriority::Low);

        // Four orphan employees: first three names plus ellipsis.
        assert_eq!(report.alerts[1].description, "Ana, Bruno, Carla...");
        assert_eq!(report.alerts[1].data.len(), 4);

        // Three orphan knowledge items: first two names plus ellipsis.
        assert_eq!(report.alerts[2].description, "AWS, GCP...");
        assert_eq!(report.alerts[2].data.len(), 3);
    }

    #[test]
    fn test_alert_preview_without_overflow() {
        let employees = vec![employee(1, "Ana", None), employee(2, "Bruno", None)];

        let report = compute_analytics(&[], &employees, &[], fixed_now());

        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].description, "Ana, Bruno");
    }

    #[test]
    fn test_idempotent_for_identical_inputs() {
        let now = fixed_now();
        let employees = vec![
            employee(1, "Ana", Some("Dados")),
            employee(2, "Bruno", None),
        ];
        let knowledge = vec![item(10, "AWS"), item(11, "GCP")];
        let links = vec![
            link(1, 1, 10, LinkStatus::Obtido),
            link(2, 1, 11, LinkStatus::Desejado),
            expiring_link(3, 2, 10, LinkStatus::Obtido, now + Duration::days(7)),
        ];

        let first = compute_analytics(&knowledge, &employees, &links, now);
        let second = compute_analytics(&knowledge, &employees, &links, now);

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_percentage_helper() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_ordered_map_preserves_insertion_order() {
        let mut map: OrderedMap<String, usize> = OrderedMap::new();
        *map.entry("b".to_string()) += 1;
        *map.entry("a".to_string()) += 1;
        *map.entry("b".to_string()) += 1;
        *map.entry("c".to_string()) += 1;

        let keys: Vec<String> = map.into_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
