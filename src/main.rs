use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

mod config;
mod import;
mod models;
mod notify;
mod registry;
mod report;
mod session;
mod stats;
mod telemetry;

use config::{ReportFormat, RosterSources, Settings, TelemetrySettings};
use models::Course;
use registry::Registry;
use stats::CourseStats;

#[derive(Parser)]
#[command(name = "learning-progress-tracker")]
#[command(about = "Track student progress across the Python, DSA, Databases and Flask courses", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive tracker (default)
    Run {
        /// Preload students from a first_name,last_name,email CSV
        #[arg(long)]
        students: Option<PathBuf>,
        /// Preload points from an email,python,dsa,databases,flask CSV
        #[arg(long)]
        points: Option<PathBuf>,
    },
    /// Load a roster, send pending notifications and write a report
    Report {
        #[arg(long)]
        students: PathBuf,
        #[arg(long)]
        points: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        students: None,
        points: None,
    });

    let roster = match &command {
        Commands::Run { students, points } => RosterSources {
            students: students.clone(),
            points: points.clone(),
        },
        Commands::Report {
            students, points, ..
        } => RosterSources {
            students: Some(students.clone()),
            points: points.clone(),
        },
    };
    let settings = Settings::new(
        TelemetrySettings {
            log_level: cli.log_level,
            json: cli.log_json,
        },
        roster,
    );
    telemetry::init_tracing(&settings).context("failed to initialise logging")?;

    let mut registry = load_roster(&settings)?;

    match command {
        Commands::Run { .. } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            session::Session::new(&mut registry, stdin.lock(), stdout.lock())
                .run()
                .context("interactive session failed")?;
        }
        Commands::Report { format, out, .. } => {
            let dispatch = notify::dispatch_notifications(&mut registry);
            let stats = CourseStats::new(&registry);
            let summary = stats.summary();
            let details: Vec<_> = Course::ALL
                .into_iter()
                .map(|course| (course, stats.course_details(course)))
                .collect();
            let generated_on = Utc::now().date_naive();

            let contents = match format {
                ReportFormat::Markdown => {
                    report::build_markdown(generated_on, &summary, &details, &dispatch.notifications)
                }
                ReportFormat::Json => {
                    report::build_json(generated_on, &summary, &details, &dispatch.notifications)
                        .context("failed to serialise report")?
                }
            };
            std::fs::write(&out, contents)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("{}", report::notified_total(dispatch.students_notified));
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_roster(settings: &Settings) -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    let roster = settings.roster();

    if let Some(path) = &roster.students {
        let summary = import::load_students_file(&mut registry, path)?;
        tracing::info!(
            added = summary.added,
            rejected = summary.rejected,
            roster = registry.len(),
            path = %path.display(),
            "Students imported"
        );
    }
    if let Some(path) = &roster.points {
        let summary = import::load_points_file(&mut registry, path)?;
        tracing::info!(
            applied = summary.added,
            rejected = summary.rejected,
            path = %path.display(),
            "Points imported"
        );
    }

    Ok(registry)
}
