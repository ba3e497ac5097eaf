use std::path::PathBuf;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub json: bool,
}

/// CSV files loaded into the registry before any command runs.
#[derive(Debug, Clone, Default)]
pub struct RosterSources {
    pub students: Option<PathBuf>,
    pub points: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    telemetry: TelemetrySettings,
    roster: RosterSources,
}

impl Settings {
    pub fn new(telemetry: TelemetrySettings, roster: RosterSources) -> Self {
        Settings { telemetry, roster }
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn roster(&self) -> &RosterSources {
        &self.roster
    }
}
