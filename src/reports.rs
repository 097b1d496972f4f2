use crate::calendar::WorkCalendar;
use crate::types::{
    ActivityLookAhead, ActivityLookaheadRow, LookaheadSummary, ProjectLookAhead,
    ProjectLookaheadRow, ZoneAnalytics, ZoneRankingRow, ZoneSummaryRow,
};
use crate::util::{format_date, format_number};
use chrono::NaiveDate;
use serde::Serialize;

fn activity_status(f: &ActivityLookAhead) -> &'static str {
    if f.is_completed {
        "Completed"
    } else if f.completion_date.is_some() {
        "Forecast"
    } else {
        "No forecast"
    }
}

pub fn activity_rows(projects: &[ProjectLookAhead]) -> Vec<ActivityLookaheadRow> {
    projects
        .iter()
        .flat_map(|p| {
            p.activities.iter().map(move |f| ActivityLookaheadRow {
                project: p.project_code.clone(),
                activity: f.activity.name.clone(),
                zone: f.activity.zone_tag().unwrap_or("-").to_string(),
                total_units: format_number(f.total_units, 2),
                actual_units: format_number(f.actual_units, 2),
                remaining_units: format_number(f.remaining_units, 2),
                actual_productivity: format_number(f.actual_productivity, 2),
                planned_productivity: format_number(f.planned_productivity, 2),
                remaining_days: f.remaining_days,
                completion_date: format_date(f.completion_date),
                status: activity_status(f).to_string(),
            })
        })
        .collect()
}

/// Project rows, latest completion first; unforecastable projects sink to the bottom.
pub fn project_rows(
    projects: &[ProjectLookAhead],
    calendar: &WorkCalendar,
    today: NaiveDate,
) -> Vec<ProjectLookaheadRow> {
    let mut sorted: Vec<&ProjectLookAhead> = projects.iter().collect();
    sorted.sort_by(|a, b| b.latest_completion_date.cmp(&a.latest_completion_date));
    sorted
        .into_iter()
        .map(|p| ProjectLookaheadRow {
            project: p.project_code.clone(),
            activities: p.activities.len(),
            completed: p.activities.iter().filter(|f| f.is_completed).count(),
            latest_completion: format_date(p.latest_completion_date),
            month: p.completion_month.clone().unwrap_or_else(|| "-".to_string()),
            week: p.completion_week.clone().unwrap_or_else(|| "-".to_string()),
            day: p.completion_day.clone().unwrap_or_else(|| "-".to_string()),
            workdays_left: p
                .latest_completion_date
                .map(|d| calendar.workdays_between(today, d).to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn zone_rows(analytics: &ZoneAnalytics) -> Vec<ZoneSummaryRow> {
    analytics
        .zones
        .iter()
        .map(|z| ZoneSummaryRow {
            zone: z.zone.clone(),
            name: z.name.clone(),
            activities: z.activity_count,
            planned_units: format_number(z.planned_units, 2),
            actual_units: format_number(z.actual_units, 2),
            progress: format!("{}%", format_number(z.progress_percentage, 2)),
            status: z.zone_status.as_str().to_string(),
            priority: z.zone_priority.as_str().to_string(),
            color: z.color.clone(),
        })
        .collect()
}

pub fn ranking_rows(analytics: &ZoneAnalytics) -> Vec<ZoneRankingRow> {
    analytics
        .ranking
        .iter()
        .map(|r| ZoneRankingRow {
            rank: r.rank,
            zone: r.zone.clone(),
            name: r.name.clone(),
            progress: format!("{}%", format_number(r.progress_percentage, 2)),
            activities: r.activity_count,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct LookaheadReport<'a> {
    pub generated_for: NaiveDate,
    pub summary: &'a LookaheadSummary,
    pub projects: &'a [ProjectLookAhead],
}

pub fn lookahead_report<'a>(
    today: NaiveDate,
    summary: &'a LookaheadSummary,
    projects: &'a [ProjectLookAhead],
) -> LookaheadReport<'a> {
    LookaheadReport {
        generated_for: today,
        summary,
        projects,
    }
}
