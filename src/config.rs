use crate::collector::CollectorOptions;
use crate::error::{Error, Result};
use crate::fetch::{HLT_PATH, StreamFetchMode};
use crate::oms::OmsClientOptions;
use crate::range::LsRange;
use crate::runs::RunSelection;
use clap::{ArgGroup, Parser, ValueEnum};
use spdlog::{Level, LevelFilter};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Critical,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        let level = match self {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        };
        LevelFilter::MoreSevereEqual(level)
    }
}

/// Fetch and save detailed lumisection and stream data.
#[derive(Parser, Debug)]
#[command(name = "get-stream-info", version)]
#[command(group(ArgGroup::new("selection").required(true).args(["run", "fill"])))]
pub struct Args {
    /// Run number
    #[arg(long)]
    pub run: Option<u32>,

    /// Fill number; every run with stable beams and physics declared is processed
    #[arg(long)]
    pub fill: Option<u32>,

    /// Minimum lumisection
    #[arg(long = "lsMin", default_value_t = 1)]
    pub ls_min: u32,

    /// Maximum lumisection
    #[arg(long = "lsMax", default_value_t = 9999)]
    pub ls_max: u32,

    /// Output JSON file
    #[arg(long, default_value = "detailed_stream_data.json")]
    pub output: PathBuf,

    /// Trigger path whose rate is added to every record
    #[arg(long = "hlt-path", default_value = HLT_PATH)]
    pub hlt_path: String,

    #[arg(long = "stream-fetch", value_enum, default_value_t = StreamFetchMode::PerLumisection)]
    pub stream_fetch: StreamFetchMode,

    /// JSON file holding client_id and client_secret
    #[arg(long = "secret-file", env = "OMS_SECRET_FILE", default_value = ".oms_secret.json")]
    pub secret_file: PathBuf,

    #[arg(long = "oms-url", env = "OMS_URL", default_value = "https://cmsoms.cern.ch/agg/api")]
    pub oms_url: String,

    #[arg(long = "api-version", default_value = "v1")]
    pub api_version: String,

    #[arg(
        long = "token-url",
        env = "OMS_TOKEN_URL",
        default_value = "https://auth.cern.ch/auth/realms/cern/api-access/token"
    )]
    pub token_url: String,

    #[arg(long, default_value = "cmsoms-prod")]
    pub audience: String,

    /// Per-request timeout
    #[arg(long = "timeout-secs", default_value_t = 60)]
    pub timeout_secs: u64,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    pub fn selection(&self) -> Result<RunSelection> {
        match (self.run, self.fill) {
            (Some(run), None) => Ok(RunSelection::Run(run)),
            (None, Some(fill)) => Ok(RunSelection::Fill(fill)),
            (Some(_), Some(_)) => Err(Error::Config(
                "Please provide only one of --run or --fill, not both.".into(),
            )),
            (None, None) => Err(Error::Config(
                "Either --run or --fill must be provided.".into(),
            )),
        }
    }

    pub fn window(&self) -> Result<LsRange> {
        if self.ls_min > self.ls_max {
            return Err(Error::Config(format!(
                "--lsMin ({}) is greater than --lsMax ({})",
                self.ls_min, self.ls_max
            )));
        }
        Ok(LsRange::new(self.ls_min, self.ls_max))
    }

    pub fn collector_options(&self) -> Result<CollectorOptions> {
        Ok(CollectorOptions {
            window: self.window()?,
            hlt_path: self.hlt_path.clone(),
            stream_fetch: self.stream_fetch,
        })
    }

    pub fn client_options(&self) -> OmsClientOptions {
        OmsClientOptions {
            base_url: self.oms_url.clone(),
            api_version: self.api_version.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
