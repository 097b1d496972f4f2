// Reconciles free-text progress records against planned activities.
//
// Project identity is strict when the activity carries a sub-code and
// tolerant otherwise. Names are compared through a swappable predicate.
use serde::{Deserialize, Serialize};

use crate::types::{Activity, ProgressRecord};

/// How a record's activity-name field is compared with an activity name.
/// Both sides are trimmed and lower-cased first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatch {
    /// Equal, or either string contains the other. Over-matches on purpose
    /// to absorb free-text drift in field entries. A name that is empty
    /// after trimming is not a substring of anything: it matches only another
    /// empty name, so blank entries never attach to every activity.
    #[default]
    Substring,
    /// Equal after normalization.
    Exact,
}

impl NameMatch {
    pub fn is_match(self, record_name: &str, activity_name: &str) -> bool {
        let a = record_name.trim().to_lowercase();
        let b = activity_name.trim().to_lowercase();
        match self {
            NameMatch::Exact => a == b,
            NameMatch::Substring => {
                if a == b {
                    return true;
                }
                // An empty name would be a substring of everything.
                if a.is_empty() || b.is_empty() {
                    return false;
                }
                a.contains(&b) || b.contains(&a)
            }
        }
    }
}

/// Decides whether a progress record belongs to an activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiMatcher {
    pub name_match: NameMatch,
    /// When set, a record carrying a zone must carry the activity's zone.
    pub enforce_zone: bool,
}

impl KpiMatcher {
    pub fn new(name_match: NameMatch) -> Self {
        Self {
            name_match,
            enforce_zone: false,
        }
    }

    pub fn with_zone_enforced(mut self, enforce: bool) -> Self {
        self.enforce_zone = enforce;
        self
    }

    pub fn matches(&self, record: &ProgressRecord, activity: &Activity) -> bool {
        project_matches(record, activity)
            && self.name_match.is_match(&record.activity_name, &activity.name)
            && (!self.enforce_zone || zone_matches(record, activity))
    }
}

/// Project identity stage.
///
/// With a sub-code on the activity, only an exact full-code match counts, so
/// progress never bleeds across sub-projects. Without one, any pairing of
/// code and full code from either side is accepted.
pub fn project_matches(record: &ProgressRecord, activity: &Activity) -> bool {
    let activity_full = activity.full_code();
    let record_full = record.full_code();
    if activity_full.contains('-') {
        return record_full == activity_full;
    }
    let activity_code = activity.project_code.trim();
    let record_code = record.project_code.trim();
    record_code == activity_code
        || record_code == activity_full
        || record_full == activity_code
        || record_full == activity_full
}

/// A record without a zone tag is zone-agnostic and always passes.
fn zone_matches(record: &ProgressRecord, activity: &Activity) -> bool {
    match record.zone_tag() {
        None => true,
        Some(zone) => activity.zone_tag() == Some(zone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InputType;

    fn activity(code: &str, sub: Option<&str>, name: &str) -> Activity {
        Activity {
            project_code: code.to_string(),
            project_sub_code: sub.map(str::to_string),
            name: name.to_string(),
            zone: Some("Z1".to_string()),
            ..Default::default()
        }
    }

    fn record(code: &str, sub: Option<&str>, name: &str) -> ProgressRecord {
        ProgressRecord {
            project_code: code.to_string(),
            project_sub_code: sub.map(str::to_string),
            activity_name: name.to_string(),
            zone: None,
            quantity: 1.0,
            input_type: InputType::Actual,
            date: None,
        }
    }

    #[test]
    fn sub_coded_activity_requires_exact_full_code() {
        let m = KpiMatcher::default();
        let act = activity("P1", Some("A"), "Excavation");
        assert!(m.matches(&record("P1", Some("A"), "Excavation"), &act));
        assert!(!m.matches(&record("P1", None, "Excavation"), &act));
        assert!(!m.matches(&record("P1", Some("B"), "Excavation"), &act));
    }

    #[test]
    fn full_code_match_ignores_bare_code_mismatch() {
        // Record's bare code differs but its full code "P1-A" lines up.
        let m = KpiMatcher::default();
        let act = activity("P1", Some("A"), "Excavation");
        let rec = record("P1-A", None, "Excavation");
        assert_eq!(rec.full_code(), "P1-A");
        assert!(m.matches(&rec, &act));
    }

    #[test]
    fn bare_code_activity_accepts_code_or_full_code() {
        let m = KpiMatcher::default();
        let act = activity("P1", None, "Excavation");
        assert!(m.matches(&record("P1", None, "Excavation"), &act));
        // Bare codes agree even though the record names a sub-project.
        assert!(m.matches(&record("P1", Some("A"), "Excavation"), &act));
        // An empty sub-code counts as none.
        assert!(m.matches(&record("P1", None, "Excavation"), &activity("P1", Some(""), "Excavation")));
        assert!(!m.matches(&record("P2", None, "Excavation"), &act));
    }

    #[test]
    fn no_sub_code_fallback_is_symmetric() {
        let pairs = [("P1", "P1"), ("P1", "P2"), ("P1", " P1 "), ("P10", "P1")];
        for (a, b) in pairs {
            let forward = project_matches(&record(a, None, "x"), &activity(b, None, "x"));
            let backward = project_matches(&record(b, None, "x"), &activity(a, None, "x"));
            assert_eq!(forward, backward, "{a} vs {b}");
        }
    }

    #[test]
    fn sub_code_rule_is_not_symmetric() {
        // A sub-coded record reaches a plain activity through the bare code,
        // but a plain record never reaches a sub-coded activity.
        let sub_record = record("P1", Some("A"), "x");
        let plain_activity = activity("P1", None, "x");
        let plain_record = record("P1", None, "x");
        let sub_activity = activity("P1", Some("A"), "x");
        assert!(project_matches(&sub_record, &plain_activity));
        assert!(!project_matches(&plain_record, &sub_activity));
    }

    #[test]
    fn names_match_case_insensitively_and_by_containment() {
        let m = NameMatch::Substring;
        assert!(m.is_match("  EXCAVATION ", "excavation"));
        assert!(m.is_match("Excavation - Block B", "excavation"));
        assert!(m.is_match("Excav", "Excavation"));
        assert!(!m.is_match("Backfill", "Excavation"));
        assert!(!m.is_match("", "Excavation"));
        assert!(!m.is_match("Excavation", "   "));
        assert!(m.is_match("", ""));
    }

    #[test]
    fn exact_name_match_rejects_containment() {
        let m = NameMatch::Exact;
        assert!(m.is_match("Excavation ", "excavation"));
        assert!(!m.is_match("Excavation - Block B", "excavation"));
    }

    #[test]
    fn zone_is_ignored_unless_enforced() {
        let act = activity("P1", None, "Excavation");
        let mut rec = record("P1", None, "Excavation");
        rec.zone = Some("Z9".to_string());
        assert!(KpiMatcher::default().matches(&rec, &act));
        let strict = KpiMatcher::default().with_zone_enforced(true);
        assert!(!strict.matches(&rec, &act));
        rec.zone = Some("Z1".to_string());
        assert!(strict.matches(&rec, &act));
        rec.zone = Some("0".to_string());
        assert!(strict.matches(&rec, &act));
    }
}
