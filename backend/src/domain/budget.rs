//! Budget aggregation over a year's activities, sections and entries.
//!
//! Everything here is pure: the budget service loads the records and hands
//! them in. Amounts are accumulated unrounded and rounded to cents on output.

use std::collections::HashMap;

use chrono::Datelike;
use shared::{
    BudgetReport, MonthlyCost, MoneyFlow, SectionKind, SectionSummary, TrainerHours,
    TypeCostSummary,
};

use crate::domain::models::{Activity, BudgetEntry, BudgetSection, Trainer, TrainingType};

pub const UNASSIGNED_SECTION_NAME: &str = "Unassigned activities";

pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Summed hourly rate of the assigned trainers. Unknown trainers cost nothing.
pub fn combined_rate(activity: &Activity, trainers: &HashMap<String, Trainer>) -> f64 {
    let mut seen: Vec<&str> = Vec::new();
    let mut rate = 0.0;
    for trainer_id in &activity.trainer_ids {
        if seen.contains(&trainer_id.as_str()) {
            continue;
        }
        seen.push(trainer_id.as_str());
        rate += trainers.get(trainer_id).map(|t| t.hourly_rate).unwrap_or(0.0);
    }
    rate
}

/// `hours × Σ hourly_rate` over the assigned trainers
pub fn activity_cost(activity: &Activity, trainers: &HashMap<String, Trainer>) -> f64 {
    activity.hours * combined_rate(activity, trainers)
}

#[derive(Default)]
struct Tally {
    count: u32,
    hours: f64,
    cost: f64,
}

impl Tally {
    fn add(&mut self, hours: f64, cost: f64) {
        self.count += 1;
        self.hours += hours;
        self.cost += cost;
    }
}

/// Hours and cost per training type, sorted by type name
pub fn totals_by_type(
    activities: &[Activity],
    types: &HashMap<String, TrainingType>,
    trainers: &HashMap<String, Trainer>,
) -> Vec<TypeCostSummary> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for activity in activities {
        tallies
            .entry(activity.training_type_id.as_str())
            .or_default()
            .add(activity.hours, activity_cost(activity, trainers));
    }

    let mut summaries: Vec<TypeCostSummary> = tallies
        .into_iter()
        .map(|(type_id, tally)| TypeCostSummary {
            training_type_id: type_id.to_string(),
            training_type_name: types
                .get(type_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| type_id.to_string()),
            activity_count: tally.count,
            hours: round_money(tally.hours),
            cost: round_money(tally.cost),
        })
        .collect();
    summaries.sort_by(|a, b| {
        a.training_type_name
            .cmp(&b.training_type_name)
            .then_with(|| a.training_type_id.cmp(&b.training_type_id))
    });
    summaries
}

/// Hours and cost per trainer, sorted by trainer name.
///
/// An activity with two trainers counts its full hours for each of them,
/// each billed at their own rate.
pub fn totals_by_trainer(
    activities: &[Activity],
    trainers: &HashMap<String, Trainer>,
) -> Vec<TrainerHours> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for activity in activities {
        let mut seen: Vec<&str> = Vec::new();
        for trainer_id in &activity.trainer_ids {
            if seen.contains(&trainer_id.as_str()) {
                continue;
            }
            seen.push(trainer_id.as_str());
            let rate = trainers.get(trainer_id).map(|t| t.hourly_rate).unwrap_or(0.0);
            tallies
                .entry(trainer_id.as_str())
                .or_default()
                .add(activity.hours, activity.hours * rate);
        }
    }

    let mut rows: Vec<TrainerHours> = tallies
        .into_iter()
        .map(|(trainer_id, tally)| TrainerHours {
            trainer_id: trainer_id.to_string(),
            trainer_name: trainers
                .get(trainer_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| trainer_id.to_string()),
            activity_count: tally.count,
            hours: round_money(tally.hours),
            cost: round_money(tally.cost),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.trainer_name
            .cmp(&b.trainer_name)
            .then_with(|| a.trainer_id.cmp(&b.trainer_id))
    });
    rows
}

/// Twelve rows, January first. Activities are assumed to lie in one year.
pub fn totals_by_month(
    activities: &[Activity],
    trainers: &HashMap<String, Trainer>,
) -> Vec<MonthlyCost> {
    let mut months: Vec<MonthlyCost> = (1..=12)
        .map(|month| MonthlyCost {
            month,
            hours: 0.0,
            cost: 0.0,
        })
        .collect();
    for activity in activities {
        let row = &mut months[activity.date.month0() as usize];
        row.hours += activity.hours;
        row.cost += activity_cost(activity, trainers);
    }
    for row in &mut months {
        row.hours = round_money(row.hours);
        row.cost = round_money(row.cost);
    }
    months
}

/// One line per section (in the given order) plus the unassigned line when
/// some activity cost has no auto section to land in.
pub fn section_summaries(
    sections: &[BudgetSection],
    entries: &[BudgetEntry],
    by_type: &[TypeCostSummary],
) -> Vec<SectionSummary> {
    let type_costs: HashMap<&str, f64> = by_type
        .iter()
        .map(|t| (t.training_type_id.as_str(), t.cost))
        .collect();

    let mut manual_totals: HashMap<&str, (f64, f64)> = HashMap::new();
    for entry in entries {
        let totals = manual_totals.entry(entry.section_id.as_str()).or_default();
        match entry.flow {
            MoneyFlow::Cost => totals.0 += entry.amount,
            MoneyFlow::Income => totals.1 += entry.amount,
        }
    }

    let mut summaries = Vec::with_capacity(sections.len() + 1);
    for section in sections {
        let (costs, income) = match section.kind {
            SectionKind::Auto => {
                let costs = section
                    .training_type_id
                    .as_deref()
                    .and_then(|type_id| type_costs.get(type_id).copied())
                    .unwrap_or(0.0);
                (costs, 0.0)
            }
            SectionKind::Manual => manual_totals
                .get(section.id.as_str())
                .copied()
                .unwrap_or((0.0, 0.0)),
        };
        summaries.push(SectionSummary {
            section_id: Some(section.id.clone()),
            name: section.name.clone(),
            kind: section.kind,
            costs: round_money(costs),
            income: round_money(income),
            planned: section.planned_amount,
            remaining: section.planned_amount.map(|p| round_money(p - costs)),
        });
    }

    let covered: Vec<&str> = sections
        .iter()
        .filter(|s| s.kind == SectionKind::Auto)
        .filter_map(|s| s.training_type_id.as_deref())
        .collect();
    let uncovered: Vec<&TypeCostSummary> = by_type
        .iter()
        .filter(|t| !covered.contains(&t.training_type_id.as_str()))
        .collect();
    if !uncovered.is_empty() {
        let unassigned: f64 = uncovered.iter().map(|t| t.cost).sum();
        summaries.push(SectionSummary {
            section_id: None,
            name: UNASSIGNED_SECTION_NAME.to_string(),
            kind: SectionKind::Auto,
            costs: round_money(unassigned),
            income: 0.0,
            planned: None,
            remaining: None,
        });
    }
    summaries
}

/// Full yearly report. `entries` must belong to manual sections of `year`.
pub fn build_report(
    year: i32,
    activities: &[Activity],
    types: &HashMap<String, TrainingType>,
    trainers: &HashMap<String, Trainer>,
    sections: &[BudgetSection],
    entries: &[BudgetEntry],
) -> BudgetReport {
    let activities: Vec<Activity> = activities
        .iter()
        .filter(|a| a.date.year() == year)
        .cloned()
        .collect();
    let by_type = totals_by_type(&activities, types, trainers);
    let by_trainer = totals_by_trainer(&activities, trainers);
    let by_month = totals_by_month(&activities, trainers);
    let sections_summary = section_summaries(sections, entries, &by_type);

    let activity_costs: f64 = activities.iter().map(|a| activity_cost(a, trainers)).sum();
    let mut manual_costs = 0.0;
    let mut total_income = 0.0;
    for entry in entries {
        match entry.flow {
            MoneyFlow::Cost => manual_costs += entry.amount,
            MoneyFlow::Income => total_income += entry.amount,
        }
    }
    let total_costs = activity_costs + manual_costs;

    BudgetReport {
        year,
        by_type,
        by_trainer,
        by_month,
        sections: sections_summary,
        total_costs: round_money(total_costs),
        total_income: round_money(total_income),
        net: round_money(total_income - total_costs),
    }
}

/// Auto sections before manual ones, then by name
pub fn sort_sections(sections: &mut [BudgetSection]) {
    sections.sort_by_key(|s| {
        let kind = match s.kind {
            SectionKind::Auto => 0,
            SectionKind::Manual => 1,
        };
        (kind, s.name.to_lowercase(), s.id.clone())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn trainer(id: &str, name: &str, rate: f64) -> Trainer {
        Trainer {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            hourly_rate: rate,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn training_type(id: &str, name: &str) -> TrainingType {
        TrainingType {
            id: id.to_string(),
            name: name.to_string(),
            color: "#336699".to_string(),
            default_trainer_id: None,
            default_hours: 1.0,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn activity(id: &str, date: (i32, u32, u32), type_id: &str, trainers: &[&str], hours: f64) -> Activity {
        Activity {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            training_type_id: type_id.to_string(),
            trainer_ids: trainers.iter().map(|t| t.to_string()).collect(),
            hours,
            start_time: None,
            notes: None,
            series_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn section(id: &str, name: &str, kind: SectionKind, type_id: Option<&str>, planned: Option<f64>) -> BudgetSection {
        BudgetSection {
            id: id.to_string(),
            year: 2025,
            name: name.to_string(),
            kind,
            training_type_id: type_id.map(str::to_string),
            planned_amount: planned,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(section_id: &str, amount: f64, flow: MoneyFlow) -> BudgetEntry {
        BudgetEntry {
            id: format!("e-{}-{}", section_id, amount),
            section_id: section_id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            description: "line".to_string(),
            amount,
            flow,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fixtures() -> (HashMap<String, Trainer>, HashMap<String, TrainingType>) {
        let trainers = [trainer("t1", "Anna", 20.0), trainer("t2", "Ben", 15.5)]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        let types = [training_type("y1", "Youth"), training_type("s1", "Seniors")]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        (trainers, types)
    }

    #[test]
    fn test_activity_cost_sums_trainer_rates() {
        let (trainers, _) = fixtures();
        let a = activity("a", (2025, 1, 6), "y1", &["t1", "t2"], 1.5);
        assert_eq!(activity_cost(&a, &trainers), 53.25);

        let unknown = activity("b", (2025, 1, 6), "y1", &["ghost"], 2.0);
        assert_eq!(activity_cost(&unknown, &trainers), 0.0);

        let unstaffed = activity("c", (2025, 1, 6), "y1", &[], 2.0);
        assert_eq!(activity_cost(&unstaffed, &trainers), 0.0);
    }

    #[test]
    fn test_totals_by_type_and_trainer() {
        let (trainers, types) = fixtures();
        let activities = vec![
            activity("a", (2025, 1, 6), "y1", &["t1"], 2.0),
            activity("b", (2025, 1, 8), "y1", &["t1", "t2"], 1.0),
            activity("c", (2025, 2, 3), "s1", &["t2"], 1.0),
        ];

        let by_type = totals_by_type(&activities, &types, &trainers);
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[0].training_type_name, "Seniors");
        assert_eq!(by_type[0].cost, 15.5);
        assert_eq!(by_type[1].training_type_name, "Youth");
        assert_eq!(by_type[1].activity_count, 2);
        assert_eq!(by_type[1].hours, 3.0);
        assert_eq!(by_type[1].cost, 75.5);

        let by_trainer = totals_by_trainer(&activities, &trainers);
        assert_eq!(by_trainer[0].trainer_name, "Anna");
        assert_eq!(by_trainer[0].hours, 3.0);
        assert_eq!(by_trainer[0].cost, 60.0);
        assert_eq!(by_trainer[1].trainer_name, "Ben");
        assert_eq!(by_trainer[1].activity_count, 2);
        assert_eq!(by_trainer[1].cost, 31.0);
    }

    #[test]
    fn test_totals_by_month_has_twelve_rows() {
        let (trainers, _) = fixtures();
        let activities = vec![
            activity("a", (2025, 1, 6), "y1", &["t1"], 2.0),
            activity("b", (2025, 12, 1), "y1", &["t1"], 1.0),
        ];
        let months = totals_by_month(&activities, &trainers);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].cost, 40.0);
        assert_eq!(months[5].hours, 0.0);
        assert_eq!(months[11].month, 12);
        assert_eq!(months[11].cost, 20.0);
    }

    #[test]
    fn test_report_sections_and_totals() {
        let (trainers, types) = fixtures();
        let activities = vec![
            activity("a", (2025, 1, 6), "y1", &["t1"], 2.0),
            activity("b", (2025, 2, 3), "s1", &["t2"], 2.0),
            activity("old", (2024, 12, 30), "y1", &["t1"], 5.0),
        ];
        let sections = vec![
            section("auto", "Youth training", SectionKind::Auto, Some("y1"), Some(100.0)),
            section("fees", "Membership", SectionKind::Manual, None, None),
        ];
        let entries = vec![
            entry("fees", 500.0, MoneyFlow::Income),
            entry("fees", 20.0, MoneyFlow::Cost),
        ];

        let report = build_report(2025, &activities, &types, &trainers, &sections, &entries);

        assert_eq!(report.sections.len(), 3);
        assert_eq!(report.sections[0].costs, 40.0);
        assert_eq!(report.sections[0].remaining, Some(60.0));
        assert_eq!(report.sections[1].income, 500.0);
        assert_eq!(report.sections[1].costs, 20.0);
        assert_eq!(report.sections[2].name, UNASSIGNED_SECTION_NAME);
        assert_eq!(report.sections[2].section_id, None);
        assert_eq!(report.sections[2].costs, 31.0);

        assert_eq!(report.total_costs, 91.0);
        assert_eq!(report.total_income, 500.0);
        assert_eq!(report.net, 409.0);
    }

    #[test]
    fn test_no_unassigned_line_when_all_types_covered() {
        let (trainers, types) = fixtures();
        let activities = vec![activity("a", (2025, 1, 6), "y1", &["t1"], 1.0)];
        let sections = vec![section("auto", "Youth", SectionKind::Auto, Some("y1"), None)];
        let report = build_report(2025, &activities, &types, &trainers, &sections, &[]);
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].remaining, None);
    }

    #[test]
    fn test_sort_sections_auto_first() {
        let mut sections = vec![
            section("m", "Apparel", SectionKind::Manual, None, None),
            section("b", "Youth", SectionKind::Auto, Some("y1"), None),
            section("a", "Adults", SectionKind::Auto, Some("s1"), None),
        ];
        sort_sections(&mut sections);
        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "m"]);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(10.005_1), 10.01);
        assert_eq!(round_money(3.333), 3.33);
    }
}
