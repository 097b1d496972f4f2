// Engine configuration loaded from a JSON file.
//
// Every field has a default, so an empty object `{}` is a valid config.
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::calendar::WorkCalendar;
use crate::error::{BoqError, Result};
use crate::lookahead::LookaheadOptions;
use crate::matcher::{KpiMatcher, NameMatch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Weekend days, 0 = Sunday.
    pub weekend_days: Vec<u8>,
    pub holidays: Vec<NaiveDate>,
    pub include_undated_records: bool,
    pub name_match: NameMatch,
    pub enforce_zone: bool,
    pub today: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weekend_days: vec![5, 6],
            holidays: Vec::new(),
            include_undated_records: true,
            name_match: NameMatch::Substring,
            enforce_zone: false,
            today: None,
        }
    }
}

impl EngineConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(bad) = self.weekend_days.iter().find(|d| **d > 6) {
            return Err(BoqError::Config {
                path: path.to_path_buf(),
                message: format!("weekend day {} is outside 0..=6 (0 = Sunday)", bad),
            });
        }
        Ok(())
    }

    pub fn calendar(&self) -> WorkCalendar {
        WorkCalendar::new(
            self.weekend_days
                .iter()
                .filter_map(|d| WorkCalendar::weekday_from_index(*d)),
            self.holidays.iter().copied(),
        )
    }

    pub fn matcher(&self) -> KpiMatcher {
        KpiMatcher::new(self.name_match).with_zone_enforced(self.enforce_zone)
    }

    pub fn lookahead_options(&self) -> LookaheadOptions {
        LookaheadOptions {
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
            include_undated: self.include_undated_records,
            matcher: self.matcher(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn defaults_match_friday_saturday_calendar() {
        let config = EngineConfig::default();
        assert_eq!(config.calendar(), WorkCalendar::default());
        assert!(config.include_undated_records);
        assert_eq!(config.name_match, NameMatch::Substring);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"weekend_days": [0, 6], "holidays": ["2024-03-11"], "name_match": "exact", "today": "2024-03-13"}"#,
        )
        .unwrap();
        let cal = config.calendar();
        assert_eq!(cal, WorkCalendar::new([Weekday::Sun, Weekday::Sat], NaiveDate::from_ymd_opt(2024, 3, 11)));
        let opts = config.lookahead_options();
        assert_eq!(opts.today, NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
        assert_eq!(opts.matcher.name_match, NameMatch::Exact);
        assert!(opts.include_undated);
    }

    #[test]
    fn out_of_range_weekday_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"weekend_days": [7]}"#).unwrap();
        let err = EngineConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, BoqError::Config { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: std::result::Result<EngineConfig, _> = serde_json::from_str(r#"{"weekends": [5]}"#);
        assert!(parsed.is_err());
    }
}
