// Productivity and completion forecasting.
//
// Actual progress is reconciled against each activity through the
// matcher, turned into an observed daily rate, and projected forward on
// the work calendar. Planned productivity stands in when nothing has been
// observed yet.
use chrono::{Duration, Local, NaiveDate};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::calendar::WorkCalendar;
use crate::matcher::KpiMatcher;
use crate::types::{
    Activity, ActivityLookAhead, InputType, LookaheadSummary, ProgressRecord, ProjectLookAhead,
};
use crate::util::{parse_date_safe, positive_ratio};

/// Forecasts needing more workdays than this are reported as unforecastable.
pub const MAX_FORECAST_WORKDAYS: u32 = 3650;

/// Inputs that shape a forecasting pass besides the data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookaheadOptions {
    /// Forecasts start here; only records up to the day before count.
    pub today: NaiveDate,
    /// Count matched records whose date is missing or unreadable.
    pub include_undated: bool,
    pub matcher: KpiMatcher,
}

impl Default for LookaheadOptions {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
            include_undated: true,
            matcher: KpiMatcher::default(),
        }
    }
}

impl LookaheadOptions {
    pub fn at(today: NaiveDate) -> Self {
        Self {
            today,
            ..Self::default()
        }
    }

    /// Last day whose records are counted: end of yesterday.
    pub fn cutoff(&self) -> NaiveDate {
        self.today - Duration::days(1)
    }
}

/// Forecast a single activity against the full record collection.
pub fn forecast_activity(
    activity: &Activity,
    records: &[ProgressRecord],
    calendar: &WorkCalendar,
    options: &LookaheadOptions,
) -> ActivityLookAhead {
    let total_units = activity.resolved_total();
    let cutoff = options.cutoff();

    let mut actual_units = 0.0;
    let mut days: HashSet<NaiveDate> = HashSet::new();
    let mut undated_records = 0usize;
    for record in records {
        if record.input_type != InputType::Actual || !options.matcher.matches(record, activity) {
            continue;
        }
        match parse_date_safe(record.date.as_deref()) {
            Some(d) if d <= cutoff => {
                days.insert(d);
            }
            Some(_) => continue,
            None if options.include_undated => undated_records += 1,
            None => continue,
        }
        actual_units += record.quantity;
    }

    // Correction entries can drive the sum negative; progress never goes below zero.
    actual_units = actual_units.max(0.0);
    if total_units > 0.0 {
        actual_units = actual_units.min(total_units);
    }
    let actual_days = days.len() as f64;

    let actual_productivity = positive_ratio(actual_units, actual_days);
    let planned_productivity =
        positive_ratio(total_units, activity.calendar_duration.unwrap_or(0.0));
    let productivity = if actual_productivity > 0.0 {
        actual_productivity
    } else {
        planned_productivity
    };

    let remaining_units = (total_units - actual_units).max(0.0);
    let is_completed = remaining_units == 0.0 && total_units > 0.0;

    let mut remaining_days = 0u32;
    let mut completion_date = None;
    // A zero-total activity has nothing left to schedule even when it is not completed.
    if !is_completed && remaining_units > 0.0 && productivity > 0.0 {
        let needed = (remaining_units / productivity).ceil();
        if needed <= f64::from(MAX_FORECAST_WORKDAYS) {
            remaining_days = needed as u32;
            completion_date = Some(calendar.advance(options.today, remaining_days));
        } else {
            debug!(activity = %activity.name, needed, "forecast beyond horizon, left unforecast");
        }
    }

    debug!(
        activity = %activity.name,
        project = %activity.full_code(),
        total_units,
        actual_units,
        actual_days,
        productivity,
        remaining_days,
        "forecast activity"
    );

    ActivityLookAhead {
        activity: activity.clone(),
        total_units,
        actual_units,
        remaining_units,
        actual_productivity,
        planned_productivity,
        remaining_days,
        completion_date,
        is_completed,
        undated_records,
    }
}

/// Forecast every activity of one project and roll up the latest date.
pub fn forecast_project(
    project_code: &str,
    activities: &[Activity],
    records: &[ProgressRecord],
    calendar: &WorkCalendar,
    options: &LookaheadOptions,
) -> ProjectLookAhead {
    let forecasts: Vec<ActivityLookAhead> = activities
        .par_iter()
        .map(|a| forecast_activity(a, records, calendar, options))
        .collect();

    let latest = forecasts.iter().filter_map(|f| f.completion_date).max();

    ProjectLookAhead {
        project_code: project_code.to_string(),
        activities: forecasts,
        latest_completion_date: latest,
        completion_month: latest.map(|d| d.format("%B %Y").to_string()),
        completion_week: latest.map(|d| d.format("%G-W%V").to_string()),
        completion_day: latest.map(|d| d.format("%A, %d %B %Y").to_string()),
    }
}

/// Group activities by project full code (first-seen order) and forecast
/// each project.
pub fn forecast_portfolio(
    activities: &[Activity],
    records: &[ProgressRecord],
    calendar: &WorkCalendar,
    options: &LookaheadOptions,
) -> (Vec<ProjectLookAhead>, LookaheadSummary) {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Activity>> = HashMap::new();
    for a in activities {
        let key = a.full_code();
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(a.clone());
    }

    let projects: Vec<ProjectLookAhead> = order
        .iter()
        .map(|code| {
            let group = groups.get(code).map(Vec::as_slice).unwrap_or(&[]);
            forecast_project(code, group, records, calendar, options)
        })
        .collect();

    let summary = summarize(&projects);
    info!(
        projects = summary.projects,
        activities = summary.activities,
        completed = summary.completed,
        unforecastable = summary.unforecastable,
        undated_records = summary.undated_records_included,
        "lookahead pass finished"
    );
    (projects, summary)
}

pub fn summarize(projects: &[ProjectLookAhead]) -> LookaheadSummary {
    let mut summary = LookaheadSummary {
        projects: projects.len(),
        ..Default::default()
    };
    for f in projects.iter().flat_map(|p| p.activities.iter()) {
        summary.activities += 1;
        summary.undated_records_included += f.undated_records;
        if f.is_completed {
            summary.completed += 1;
        } else if f.completion_date.is_some() {
            summary.forecastable += 1;
        } else {
            summary.unforecastable += 1;
        }
    }
    summary.latest_completion_date = projects.iter().filter_map(|p| p.latest_completion_date).max();
    summary
}
