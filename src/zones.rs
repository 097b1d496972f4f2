// Zone rollups for the progress dashboard.
//
// Status, priority and color are computed from progress first; an explicit
// mapping is then layered on top, one field at a time. Nothing here is
// cached between requests.
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::matcher::KpiMatcher;
use crate::types::{
    Activity, InputType, ProgressRecord, ZoneAnalytics, ZoneInfo, ZoneMapping, ZonePriority,
    ZoneRanking, ZoneStatus,
};
use crate::util::average;

pub const COLOR_COMPLETED: &str = "#28a745";
pub const COLOR_ACTIVE: &str = "#ffc107";
pub const COLOR_PENDING: &str = "#6c757d";

const FOCUS_THRESHOLD: f64 = 25.0;
const RESOURCING_THRESHOLD: f64 = 50.0;
const RESOURCING_MIN_ACTIVITIES: usize = 3;

pub struct ZoneEngine<'a> {
    activities: &'a [Activity],
    records: Option<&'a [ProgressRecord]>,
    mappings: HashMap<String, ZoneMapping>,
    matcher: KpiMatcher,
}

impl<'a> ZoneEngine<'a> {
    pub fn new(activities: &'a [Activity]) -> Self {
        Self {
            activities,
            records: None,
            mappings: HashMap::new(),
            matcher: KpiMatcher::default().with_zone_enforced(true),
        }
    }

    /// Derive actual units from progress records instead of the activities' own figures.
    pub fn with_records(mut self, records: &'a [ProgressRecord]) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_mappings(mut self, mappings: impl IntoIterator<Item = ZoneMapping>) -> Self {
        self.mappings = mappings
            .into_iter()
            .map(|m| (m.zone.trim().to_string(), m))
            .collect();
        self
    }

    pub fn with_matcher(mut self, matcher: KpiMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Distinct assigned zone tags, in first-seen order.
    pub fn unique_zones(&self) -> Vec<String> {
        let mut zones: Vec<String> = Vec::new();
        for zone in self.activities.iter().filter_map(Activity::zone_tag) {
            if !zones.iter().any(|z| z == zone) {
                zones.push(zone.to_string());
            }
        }
        zones
    }

    /// Actual units per activity, indexed like `activities`. A record that
    /// matches several activities (a zone-less record, or overlapping names)
    /// is split evenly between them, so each record counts once overall.
    fn actual_units(&self) -> Vec<f64> {
        let Some(records) = self.records else {
            return self
                .activities
                .iter()
                .map(|a| a.actual_units.unwrap_or(0.0))
                .collect();
        };
        let mut units = vec![0.0; self.activities.len()];
        let mut hits: Vec<usize> = Vec::new();
        for record in records.iter().filter(|r| r.input_type == InputType::Actual) {
            hits.clear();
            hits.extend(
                self.activities
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| self.matcher.matches(record, a))
                    .map(|(i, _)| i),
            );
            if hits.is_empty() {
                continue;
            }
            let share = record.quantity / hits.len() as f64;
            for &i in &hits {
                units[i] += share;
            }
        }
        units
    }

    pub fn zone_info(&self, zone: &str) -> ZoneInfo {
        let zone = zone.trim();
        let members: Vec<usize> = self
            .activities
            .iter()
            .enumerate()
            .filter(|(_, a)| a.zone_tag() == Some(zone))
            .map(|(i, _)| i)
            .collect();
        let activity_count = members.len();
        let planned_units: f64 = members
            .iter()
            .map(|&i| self.activities[i].resolved_total())
            .sum();
        let units = if members.is_empty() {
            Vec::new()
        } else {
            self.actual_units()
        };
        let actual_units: f64 = members.iter().map(|&i| units[i]).sum();
        // Not capped: a zone may report more than was planned.
        let progress_percentage = if planned_units > 0.0 {
            actual_units / planned_units * 100.0
        } else {
            0.0
        };

        let status = derive_status(progress_percentage);
        let mut info = ZoneInfo {
            zone: zone.to_string(),
            name: format!("Zone {}", zone),
            description: String::new(),
            activity_count,
            planned_units,
            actual_units,
            progress_percentage,
            zone_status: status,
            zone_priority: derive_priority(progress_percentage, activity_count),
            color: status_color(status).to_string(),
        };
        if let Some(mapping) = self.mappings.get(zone) {
            apply_mapping(&mut info, mapping);
        }
        debug!(zone = %info.zone, progress = info.progress_percentage, "zone info");
        info
    }

    pub fn analytics(&self) -> ZoneAnalytics {
        let zones: Vec<ZoneInfo> = self
            .unique_zones()
            .iter()
            .map(|z| self.zone_info(z))
            .collect();

        let active_zones = zones
            .iter()
            .filter(|z| z.zone_status == ZoneStatus::Active)
            .count();
        let completed_zones = zones
            .iter()
            .filter(|z| z.zone_status == ZoneStatus::Completed)
            .count();
        let average_progress = average(
            &zones
                .iter()
                .map(|z| z.progress_percentage)
                .collect::<Vec<_>>(),
        );

        ZoneAnalytics {
            total_zones: zones.len(),
            active_zones,
            completed_zones,
            average_progress,
            ranking: rank_zones(&zones),
            recommendations: recommendations(&zones),
            zones,
        }
    }
}

pub fn derive_status(progress: f64) -> ZoneStatus {
    if progress >= 100.0 {
        ZoneStatus::Completed
    } else if progress > 0.0 {
        ZoneStatus::Active
    } else {
        ZoneStatus::Pending
    }
}

pub fn derive_priority(progress: f64, activity_count: usize) -> ZonePriority {
    if progress < 20.0 && activity_count > 5 {
        ZonePriority::High
    } else if progress > 80.0 {
        ZonePriority::Low
    } else {
        ZonePriority::Medium
    }
}

pub fn status_color(status: ZoneStatus) -> &'static str {
    match status {
        ZoneStatus::Completed => COLOR_COMPLETED,
        ZoneStatus::Active => COLOR_ACTIVE,
        ZoneStatus::Pending => COLOR_PENDING,
    }
}

fn apply_mapping(info: &mut ZoneInfo, mapping: &ZoneMapping) {
    if let Some(name) = &mapping.name {
        info.name = name.clone();
    }
    if let Some(description) = &mapping.description {
        info.description = description.clone();
    }
    if let Some(status) = mapping.status {
        info.zone_status = status;
        // Keep the color in step with an overridden status unless it is set too.
        info.color = status_color(status).to_string();
    }
    if let Some(color) = &mapping.color {
        info.color = color.clone();
    }
    if let Some(priority) = mapping.priority {
        info.zone_priority = priority;
    }
}

/// Descending progress, 1-indexed; ties keep input order.
pub fn rank_zones(zones: &[ZoneInfo]) -> Vec<ZoneRanking> {
    let mut sorted: Vec<&ZoneInfo> = zones.iter().collect();
    sorted.sort_by(|a, b| {
        b.progress_percentage
            .partial_cmp(&a.progress_percentage)
            .unwrap_or(Ordering::Equal)
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, z)| ZoneRanking {
            rank: idx + 1,
            zone: z.zone.clone(),
            name: z.name.clone(),
            progress_percentage: z.progress_percentage,
            activity_count: z.activity_count,
        })
        .collect()
}

fn zone_names(zones: &[ZoneInfo], pred: impl Fn(&ZoneInfo) -> bool) -> Vec<&str> {
    zones
        .iter()
        .filter(|z| pred(z))
        .map(|z| z.name.as_str())
        .collect()
}

/// One line per rule that fires, naming the zones it fired for.
pub fn recommendations(zones: &[ZoneInfo]) -> Vec<String> {
    let focus = zone_names(zones, |z| z.progress_percentage < FOCUS_THRESHOLD);
    let resourcing = zone_names(zones, |z| {
        z.activity_count > RESOURCING_MIN_ACTIVITIES && z.progress_percentage < RESOURCING_THRESHOLD
    });
    let completed = zone_names(zones, |z| z.progress_percentage >= 100.0);

    let mut out = Vec::new();
    if !focus.is_empty() {
        out.push(format!(
            "Focus needed: zones {} are below 25% progress",
            focus.join(", ")
        ));
    }
    if !resourcing.is_empty() {
        out.push(format!(
            "Resourcing concern: zones {} have more than 3 activities but less than 50% progress",
            resourcing.join(", ")
        ));
    }
    if !completed.is_empty() {
        out.push(format!(
            "Completed: zones {} have reached 100% progress",
            completed.join(", ")
        ));
    }
    if out.is_empty() {
        out.push("All zones are progressing within expected ranges".to_string());
    }
    out
}
