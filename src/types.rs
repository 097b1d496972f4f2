use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A planned BOQ work item, read-only to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub project_code: String,
    pub project_sub_code: Option<String>,
    pub name: String,
    pub zone: Option<String>,
    pub unit: Option<String>,
    pub total_units: Option<f64>,
    pub planned_units: Option<f64>,
    pub calendar_duration: Option<f64>,
    /// Progress already rolled up on the activity itself; used by zone
    /// analytics when no progress records are supplied.
    pub actual_units: Option<f64>,
}

impl Activity {
    /// `project_code`, suffixed with `-sub_code` when a sub-code exists.
    pub fn full_code(&self) -> String {
        full_code(&self.project_code, self.project_sub_code.as_deref())
    }

    /// Planned total quantity: `total_units`, falling back to `planned_units`.
    pub fn resolved_total(&self) -> f64 {
        self.total_units
            .or(self.planned_units)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// The zone tag, or `None` when it is empty or the "0" placeholder.
    pub fn zone_tag(&self) -> Option<&str> {
        zone_tag(self.zone.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    Planned,
    Actual,
}

impl InputType {
    /// Case-insensitive, whitespace-trimmed.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Some(InputType::Planned),
            "actual" => Some(InputType::Actual),
            _ => None,
        }
    }
}

/// A KPI entry reported from the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub project_code: String,
    pub project_sub_code: Option<String>,
    pub activity_name: String,
    pub zone: Option<String>,
    pub quantity: f64,
    pub input_type: InputType,
    /// Raw date text as entered; parsing is left to the engine.
    pub date: Option<String>,
}

impl ProgressRecord {
    pub fn full_code(&self) -> String {
        full_code(&self.project_code, self.project_sub_code.as_deref())
    }

    pub fn zone_tag(&self) -> Option<&str> {
        zone_tag(self.zone.as_deref())
    }
}

pub fn full_code(code: &str, sub_code: Option<&str>) -> String {
    let code = code.trim();
    match sub_code.map(str::trim) {
        Some(sub) if !sub.is_empty() => format!("{}-{}", code, sub),
        _ => code.to_string(),
    }
}

fn zone_tag(zone: Option<&str>) -> Option<&str> {
    let z = zone?.trim();
    if z.is_empty() || z == "0" {
        None
    } else {
        Some(z)
    }
}

/// Per-activity forecast; rebuilt from scratch on every pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLookAhead {
    pub activity: Activity,
    pub total_units: f64,
    pub actual_units: f64,
    pub remaining_units: f64,
    pub actual_productivity: f64,
    pub planned_productivity: f64,
    pub remaining_days: u32,
    pub completion_date: Option<NaiveDate>,
    pub is_completed: bool,
    /// Matched records without a usable date that were counted anyway.
    pub undated_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectLookAhead {
    pub project_code: String,
    pub activities: Vec<ActivityLookAhead>,
    pub latest_completion_date: Option<NaiveDate>,
    pub completion_month: Option<String>,
    pub completion_week: Option<String>,
    pub completion_day: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookaheadSummary {
    pub projects: usize,
    pub activities: usize,
    pub completed: usize,
    pub forecastable: usize,
    pub unforecastable: usize,
    pub latest_completion_date: Option<NaiveDate>,
    pub undated_records_included: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Pending,
    Active,
    Completed,
}

impl ZoneStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneStatus::Pending => "pending",
            ZoneStatus::Active => "active",
            ZoneStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ZoneStatus::Pending),
            "active" => Some(ZoneStatus::Active),
            "completed" => Some(ZoneStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZonePriority {
    High,
    Medium,
    Low,
}

impl ZonePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            ZonePriority::High => "high",
            ZonePriority::Medium => "medium",
            ZonePriority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(ZonePriority::High),
            "medium" => Some(ZonePriority::Medium),
            "low" => Some(ZonePriority::Low),
            _ => None,
        }
    }
}

/// Explicit per-zone override; each populated field replaces the computed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneMapping {
    pub zone: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub priority: Option<ZonePriority>,
    pub status: Option<ZoneStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneInfo {
    pub zone: String,
    pub name: String,
    pub description: String,
    pub activity_count: usize,
    pub planned_units: f64,
    pub actual_units: f64,
    pub progress_percentage: f64,
    pub zone_status: ZoneStatus,
    pub zone_priority: ZonePriority,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRanking {
    pub rank: usize,
    pub zone: String,
    pub name: String,
    pub progress_percentage: f64,
    pub activity_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAnalytics {
    pub total_zones: usize,
    pub active_zones: usize,
    pub completed_zones: usize,
    pub average_progress: f64,
    pub zones: Vec<ZoneInfo>,
    pub ranking: Vec<ZoneRanking>,
    pub recommendations: Vec<String>,
}

// ---- CSV input rows --------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RawActivityRow {
    pub project_code: Option<String>,
    pub project_sub_code: Option<String>,
    pub activity_name: Option<String>,
    pub zone: Option<String>,
    pub unit: Option<String>,
    pub total_units: Option<String>,
    pub planned_units: Option<String>,
    pub calendar_duration: Option<String>,
    pub actual_units: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawRecordRow {
    pub project_code: Option<String>,
    pub project_sub_code: Option<String>,
    pub activity_name: Option<String>,
    pub zone: Option<String>,
    pub quantity: Option<String>,
    pub input_type: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawHolidayRow {
    pub date: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawZoneMappingRow {
    pub zone: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

// ---- Report rows -----------------------------------------------------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ActivityLookaheadRow {
    #[serde(rename = "Project")]
    #[tabled(rename = "Project")]
    pub project: String,
    #[serde(rename = "Activity")]
    #[tabled(rename = "Activity")]
    pub activity: String,
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "TotalUnits")]
    #[tabled(rename = "TotalUnits")]
    pub total_units: String,
    #[serde(rename = "ActualUnits")]
    #[tabled(rename = "ActualUnits")]
    pub actual_units: String,
    #[serde(rename = "RemainingUnits")]
    #[tabled(rename = "RemainingUnits")]
    pub remaining_units: String,
    #[serde(rename = "ActualProductivity")]
    #[tabled(rename = "ActualProductivity")]
    pub actual_productivity: String,
    #[serde(rename = "PlannedProductivity")]
    #[tabled(rename = "PlannedProductivity")]
    pub planned_productivity: String,
    #[serde(rename = "RemainingDays")]
    #[tabled(rename = "RemainingDays")]
    pub remaining_days: u32,
    #[serde(rename = "CompletionDate")]
    #[tabled(rename = "CompletionDate")]
    pub completion_date: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectLookaheadRow {
    #[serde(rename = "Project")]
    #[tabled(rename = "Project")]
    pub project: String,
    #[serde(rename = "Activities")]
    #[tabled(rename = "Activities")]
    pub activities: usize,
    #[serde(rename = "Completed")]
    #[tabled(rename = "Completed")]
    pub completed: usize,
    #[serde(rename = "LatestCompletion")]
    #[tabled(rename = "LatestCompletion")]
    pub latest_completion: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Week")]
    #[tabled(rename = "Week")]
    pub week: String,
    #[serde(rename = "Day")]
    #[tabled(rename = "Day")]
    pub day: String,
    #[serde(rename = "WorkdaysLeft")]
    #[tabled(rename = "WorkdaysLeft")]
    pub workdays_left: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ZoneSummaryRow {
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Activities")]
    #[tabled(rename = "Activities")]
    pub activities: usize,
    #[serde(rename = "PlannedUnits")]
    #[tabled(rename = "PlannedUnits")]
    pub planned_units: String,
    #[serde(rename = "ActualUnits")]
    #[tabled(rename = "ActualUnits")]
    pub actual_units: String,
    #[serde(rename = "Progress")]
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Priority")]
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ZoneRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Progress")]
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[serde(rename = "Activities")]
    #[tabled(rename = "Activities")]
    pub activities: usize,
}
