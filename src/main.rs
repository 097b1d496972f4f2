// Command-line front end.
//
// - `lookahead` loads activities and progress records, forecasts every
//   project and writes the activity/project reports plus a JSON summary.
// - `zones` rolls activities up by zone and writes the dashboard tables
//   and recommendations.
use std::path::{Path, PathBuf};

use anyhow::Context;
use boq_lookahead::config::EngineConfig;
use boq_lookahead::{loader, lookahead, output, reports, util, ZoneEngine};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "boq-lookahead")]
#[command(about = "Progress reconciliation and completion forecasting for BOQ activities", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Engine configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutDir {
    /// Directory for generated reports
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Rows shown in each console preview
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast completion dates per activity and project
    Lookahead {
        #[arg(long)]
        activities: PathBuf,
        #[arg(long)]
        records: PathBuf,
        /// Holiday list (date[,name])
        #[arg(long)]
        holidays: Option<PathBuf>,
        /// Only forecast this project (code or full code)
        #[arg(long)]
        project: Option<String>,
        #[command(flatten)]
        out: OutDir,
    },
    /// Summarize progress by zone
    Zones {
        #[arg(long)]
        activities: PathBuf,
        #[arg(long)]
        records: Option<PathBuf>,
        /// Explicit zone overrides (zone,name,description,color,priority,status)
        #[arg(long)]
        mappings: Option<PathBuf>,
        #[command(flatten)]
        out: OutDir,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load_from(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn print_load(label: &str, report: &loader::LoadReport) {
    println!(
        "Loaded {} {} ({} rows read, {} skipped)",
        util::format_int(report.loaded_rows),
        label,
        util::format_int(report.total_rows),
        util::format_int(report.parse_errors)
    );
}

fn run_lookahead(
    config: &EngineConfig,
    activities: &Path,
    records: &Path,
    holidays: Option<&Path>,
    project: Option<&str>,
    out: &OutDir,
) -> anyhow::Result<()> {
    let (mut acts, report) = loader::load_activities(activities)
        .with_context(|| format!("failed to read activities from {}", activities.display()))?;
    print_load("activities", &report);
    let (kpis, report) = loader::load_progress_records(records)
        .with_context(|| format!("failed to read progress records from {}", records.display()))?;
    print_load("progress records", &report);

    let mut calendar = config.calendar();
    if let Some(path) = holidays {
        let (dates, report) = loader::load_holidays(path)
            .with_context(|| format!("failed to read holidays from {}", path.display()))?;
        print_load("holidays", &report);
        calendar.add_holidays(dates);
    }

    if let Some(code) = project {
        acts.retain(|a| a.project_code == code || a.full_code() == code);
        if acts.is_empty() {
            println!("No activities found for project {}.", code);
            return Ok(());
        }
    }

    let options = config.lookahead_options();
    let (projects, summary) = lookahead::forecast_portfolio(&acts, &kpis, &calendar, &options);
    println!();

    let activity_rows = reports::activity_rows(&projects);
    let file = out.out_dir.join("activity_lookahead.csv");
    output::write_csv(&file, &activity_rows)
        .with_context(|| format!("failed to write {}", file.display()))?;
    output::preview_table(
        "Activity Lookahead",
        Some(format!("Forecast from {}", options.today).as_str()),
        &activity_rows,
        out.preview,
    );
    println!("(Full table exported to {})\n", file.display());

    let project_rows = reports::project_rows(&projects, &calendar, options.today);
    let file = out.out_dir.join("project_lookahead.csv");
    output::write_csv(&file, &project_rows)
        .with_context(|| format!("failed to write {}", file.display()))?;
    output::preview_table(
        "Project Completion Forecast",
        Some("Latest completion across open activities"),
        &project_rows,
        out.preview,
    );
    println!("(Full table exported to {})\n", file.display());

    let file = out.out_dir.join("lookahead_summary.json");
    output::write_json(&file, &reports::lookahead_report(options.today, &summary, &projects))
        .with_context(|| format!("failed to write {}", file.display()))?;
    println!(
        "Summary: {} activities, {} completed, {} forecast, {} without forecast",
        util::format_int(summary.activities),
        util::format_int(summary.completed),
        util::format_int(summary.forecastable),
        util::format_int(summary.unforecastable)
    );
    if summary.undated_records_included > 0 {
        println!(
            "Note: {} progress records without a usable date were counted.",
            util::format_int(summary.undated_records_included)
        );
    }
    Ok(())
}

fn run_zones(
    config: &EngineConfig,
    activities: &Path,
    records: Option<&Path>,
    mappings: Option<&Path>,
    out: &OutDir,
) -> anyhow::Result<()> {
    let (acts, report) = loader::load_activities(activities)
        .with_context(|| format!("failed to read activities from {}", activities.display()))?;
    print_load("activities", &report);

    let kpis = match records {
        Some(path) => {
            let (kpis, report) = loader::load_progress_records(path)
                .with_context(|| format!("failed to read progress records from {}", path.display()))?;
            print_load("progress records", &report);
            Some(kpis)
        }
        None => None,
    };
    let overrides = match mappings {
        Some(path) => {
            let (maps, report) = loader::load_zone_mappings(path)
                .with_context(|| format!("failed to read zone mappings from {}", path.display()))?;
            print_load("zone mappings", &report);
            maps
        }
        None => Vec::new(),
    };

    let mut engine = ZoneEngine::new(&acts)
        .with_matcher(config.matcher().with_zone_enforced(true))
        .with_mappings(overrides);
    if let Some(kpis) = kpis.as_deref() {
        engine = engine.with_records(kpis);
    }
    let analytics = engine.analytics();
    println!();

    let zone_rows = reports::zone_rows(&analytics);
    let file = out.out_dir.join("zone_summary.csv");
    output::write_csv(&file, &zone_rows)
        .with_context(|| format!("failed to write {}", file.display()))?;
    output::preview_table(
        "Zone Summary",
        Some(
            format!(
                "{} zones, {} active, {} completed, average progress {}%",
                analytics.total_zones,
                analytics.active_zones,
                analytics.completed_zones,
                util::format_number(analytics.average_progress, 2)
            )
            .as_str(),
        ),
        &zone_rows,
        out.preview,
    );

    let ranking_rows = reports::ranking_rows(&analytics);
    let file = out.out_dir.join("zone_ranking.csv");
    output::write_csv(&file, &ranking_rows)
        .with_context(|| format!("failed to write {}", file.display()))?;
    output::preview_table("Zone Performance Ranking", None, &ranking_rows, out.preview);

    let file = out.out_dir.join("zone_analytics.json");
    output::write_json(&file, &analytics)
        .with_context(|| format!("failed to write {}", file.display()))?;

    println!("Recommendations:");
    for line in &analytics.recommendations {
        println!("- {}", line);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Lookahead {
            activities,
            records,
            holidays,
            project,
            out,
        } => run_lookahead(
            &config,
            &activities,
            &records,
            holidays.as_deref(),
            project.as_deref(),
            &out,
        ),
        Commands::Zones {
            activities,
            records,
            mappings,
            out,
        } => run_zones(&config, &activities, records.as_deref(), mappings.as_deref(), &out),
    }
}
