use boq_lookahead::config::EngineConfig;
use boq_lookahead::types::{ZonePriority, ZoneStatus};
use boq_lookahead::{loader, lookahead, output, reports, ZoneEngine};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

const ACTIVITIES: &str = "\
project_code,project_sub_code,activity_name,zone,unit,total_units,planned_units,calendar_duration,actual_units
P1,A,Excavation,Z1,m3,\"1,000\",,20,400
P1,A,Blinding Concrete,Z1,m3,50,,5,50
P1,,Fencing,Z2,m,200,,10,0
P2,,Survey,0,ls,,1,1,
";

const RECORDS: &str = "\
project_code,project_sub_code,activity_name,zone,quantity,input_type,date
P1,A,excavation - grid 4,Z1,100,Actual,2024-03-10
P1,A,Excavation,Z1,100,actual,2024-03-11
P1,A,Excavation,Z1,\"1,000\",Planned,2024-03-11
P1,,Excavation,Z1,500,Actual,2024-03-11
P1,A,Excavation,Z1,300,Actual,2024-03-13
P1,A,Blinding Concrete,Z1,50,Actual,not a date
P2,,Survey,,1,Actual,2024-03-01
";

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
}

#[test]
fn csv_to_lookahead_reports() {
    let dir = tempfile::tempdir().unwrap();
    let acts_path = write(dir.path(), "activities.csv", ACTIVITIES);
    let kpi_path = write(dir.path(), "kpi.csv", RECORDS);
    let hol_path = write(dir.path(), "holidays.csv", "date,name\n2024-03-14,Site closure\n");

    let (acts, _) = loader::load_activities(&acts_path).unwrap();
    let (kpis, _) = loader::load_progress_records(&kpi_path).unwrap();
    let (holidays, _) = loader::load_holidays(&hol_path).unwrap();

    let config = EngineConfig {
        today: Some(today()),
        ..EngineConfig::default()
    };
    let mut calendar = config.calendar();
    calendar.add_holidays(holidays);
    let options = config.lookahead_options();

    let (projects, summary) = lookahead::forecast_portfolio(&acts, &kpis, &calendar, &options);
    assert_eq!(projects.len(), 3);
    assert_eq!(projects[0].project_code, "P1-A");

    // Two dated days (10th, 11th) with 200 units; the bare "P1" record and
    // the record dated today are both excluded.
    let excavation = &projects[0].activities[0];
    assert_eq!(excavation.actual_units, 200.0);
    assert_eq!(excavation.actual_productivity, 100.0);
    assert_eq!(excavation.remaining_days, 8);
    // Thu 14th is a holiday: 17,18,19,20,21,24,25,26.
    assert_eq!(excavation.completion_date, NaiveDate::from_ymd_opt(2024, 3, 26));

    let blinding = &projects[0].activities[1];
    assert!(blinding.is_completed);
    assert_eq!(blinding.undated_records, 1);

    // P1 fencing: planned 20/day over 200 units.
    assert_eq!(projects[1].project_code, "P1");
    assert_eq!(projects[1].activities[0].remaining_days, 10);

    // Survey total falls back to planned_units and is done.
    assert!(projects[2].activities[0].is_completed);
    assert_eq!(projects[2].latest_completion_date, None);

    assert_eq!(summary.activities, 4);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.forecastable, 2);
    assert_eq!(summary.undated_records_included, 1);

    let out = dir.path().join("project_lookahead.csv");
    output::write_csv(&out, &reports::project_rows(&projects, &calendar, today())).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Project,Activities,Completed,LatestCompletion,Month,Week,Day,WorkdaysLeft"));

    let json = dir.path().join("summary.json");
    output::write_json(&json, &reports::lookahead_report(today(), &summary, &projects)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed["summary"]["undated_records_included"], 1);
    assert_eq!(parsed["generated_for"], "2024-03-13");
}

#[test]
fn excluding_undated_records_changes_the_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let acts_path = write(dir.path(), "activities.csv", ACTIVITIES);
    let kpi_path = write(dir.path(), "kpi.csv", RECORDS);
    let (acts, _) = loader::load_activities(&acts_path).unwrap();
    let (kpis, _) = loader::load_progress_records(&kpi_path).unwrap();

    let config = EngineConfig {
        today: Some(today()),
        include_undated_records: false,
        ..EngineConfig::default()
    };
    let (projects, summary) =
        lookahead::forecast_portfolio(&acts, &kpis, &config.calendar(), &config.lookahead_options());
    let blinding = &projects[0].activities[1];
    assert!(!blinding.is_completed);
    assert_eq!(blinding.actual_units, 0.0);
    assert_eq!(summary.undated_records_included, 0);
}

#[test]
fn csv_to_zone_analytics() {
    let dir = tempfile::tempdir().unwrap();
    let acts_path = write(dir.path(), "activities.csv", ACTIVITIES);
    let map_path = write(
        dir.path(),
        "zones.csv",
        "zone,name,description,color,priority,status\nZ2,Perimeter,Boundary works,,high,\n",
    );
    let (acts, _) = loader::load_activities(&acts_path).unwrap();
    let (maps, _) = loader::load_zone_mappings(&map_path).unwrap();

    let analytics = ZoneEngine::new(&acts).with_mappings(maps).analytics();
    assert_eq!(analytics.total_zones, 2);

    let z1 = &analytics.zones[0];
    assert_eq!(z1.zone, "Z1");
    assert_eq!(z1.actual_units, 450.0);
    assert!((z1.progress_percentage - 450.0 / 1050.0 * 100.0).abs() < 1e-9);
    assert_eq!(z1.zone_status, ZoneStatus::Active);

    let z2 = &analytics.zones[1];
    assert_eq!(z2.name, "Perimeter");
    assert_eq!(z2.description, "Boundary works");
    assert_eq!(z2.zone_priority, ZonePriority::High);
    assert_eq!(z2.zone_status, ZoneStatus::Pending);

    assert_eq!(analytics.ranking[0].zone, "Z1");
    assert_eq!(
        analytics.recommendations,
        vec!["Focus needed: zones Perimeter are below 25% progress".to_string()]
    );

    let out = dir.path().join("zone_summary.csv");
    output::write_csv(&out, &reports::zone_rows(&analytics)).unwrap();
    assert!(fs::read_to_string(&out).unwrap().contains("Perimeter"));
}

#[test]
fn zone_analytics_from_progress_records_is_zone_scoped() {
    let dir = tempfile::tempdir().unwrap();
    let acts_path = write(dir.path(), "activities.csv", ACTIVITIES);
    let kpi_path = write(dir.path(), "kpi.csv", RECORDS);
    let (acts, _) = loader::load_activities(&acts_path).unwrap();
    let (kpis, _) = loader::load_progress_records(&kpi_path).unwrap();

    let analytics = ZoneEngine::new(&acts).with_records(&kpis).analytics();
    let z1 = &analytics.zones[0];
    // Every P1-A actual, dated or not, counts; the bare "P1" row does not.
    assert_eq!(z1.actual_units, 100.0 + 100.0 + 300.0 + 50.0);
}
