use crate::error::Result;
use crate::types::{
    Activity, InputType, ProgressRecord, RawActivityRow, RawHolidayRow, RawRecordRow,
    RawZoneMappingRow, ZoneMapping, ZonePriority, ZoneStatus,
};
use crate::util::{parse_date_safe, parse_f64_safe, parse_quantity};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Trimmed, with empty strings collapsed to `None`.
fn clean(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Deserialize every row of `path`, converting each with `convert`. Rows that
/// fail to deserialize or convert are skipped and counted.
fn load_rows<R, T>(
    path: &Path,
    mut convert: impl FnMut(R) -> Option<T>,
) -> Result<(Vec<T>, LoadReport)>
where
    R: DeserializeOwned,
{
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let mut report = LoadReport::default();
    let mut out = Vec::new();

    for (idx, result) in rdr.deserialize::<R>().enumerate() {
        report.total_rows += 1;
        let converted = match result {
            Ok(row) => convert(row),
            Err(e) => {
                warn!(path = %path.display(), row = idx + 1, error = %e, "unreadable row");
                None
            }
        };
        match converted {
            Some(item) => out.push(item),
            None => report.parse_errors += 1,
        }
    }

    report.loaded_rows = out.len();
    info!(
        path = %path.display(),
        total = report.total_rows,
        loaded = report.loaded_rows,
        skipped = report.parse_errors,
        "loaded csv"
    );
    Ok((out, report))
}

pub fn load_activities(path: &Path) -> Result<(Vec<Activity>, LoadReport)> {
    load_rows(path, |row: RawActivityRow| {
        let name = clean(row.activity_name)?;
        Some(Activity {
            project_code: clean(row.project_code).unwrap_or_default(),
            project_sub_code: clean(row.project_sub_code),
            name,
            zone: clean(row.zone),
            unit: clean(row.unit),
            total_units: parse_f64_safe(row.total_units.as_deref()),
            planned_units: parse_f64_safe(row.planned_units.as_deref()),
            calendar_duration: parse_f64_safe(row.calendar_duration.as_deref()),
            actual_units: parse_f64_safe(row.actual_units.as_deref()),
        })
    })
}

pub fn load_progress_records(path: &Path) -> Result<(Vec<ProgressRecord>, LoadReport)> {
    load_rows(path, |row: RawRecordRow| {
        let input_type = match row.input_type.as_deref().and_then(InputType::parse) {
            Some(t) => t,
            None => {
                warn!(input_type = ?row.input_type, "unknown input type, skipping record");
                return None;
            }
        };
        Some(ProgressRecord {
            project_code: clean(row.project_code).unwrap_or_default(),
            project_sub_code: clean(row.project_sub_code),
            activity_name: clean(row.activity_name).unwrap_or_default(),
            zone: clean(row.zone),
            quantity: parse_quantity(row.quantity.as_deref()),
            input_type,
            // Kept raw; the engine decides how an unreadable date is treated.
            date: clean(row.date),
        })
    })
}

pub fn load_holidays(path: &Path) -> Result<(Vec<NaiveDate>, LoadReport)> {
    load_rows(path, |row: RawHolidayRow| {
        let date = parse_date_safe(row.date.as_deref());
        if date.is_none() {
            warn!(date = ?row.date, name = ?row.name, "unreadable holiday date");
        }
        date
    })
}

pub fn load_zone_mappings(path: &Path) -> Result<(Vec<ZoneMapping>, LoadReport)> {
    load_rows(path, |row: RawZoneMappingRow| {
        let zone = clean(row.zone)?;
        Some(ZoneMapping {
            zone,
            name: clean(row.name),
            description: clean(row.description),
            color: clean(row.color),
            priority: row.priority.as_deref().and_then(ZonePriority::parse),
            status: row.status.as_deref().and_then(ZoneStatus::parse),
        })
    })
}
