use crate::config::toml_config::YardConfig;
use crate::config::EndpointProfiles;
use crate::domain::model::{CheckInRequest, OperatorContext};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "yard")]
#[command(about = "Vehicle yard check-in tracking with simulated SMS notifications")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(long, default_value = "yard.toml")]
    pub config: String,

    /// Host name used to pick the development or production profile
    #[arg(long, env = "YARD_HOST", default_value = "localhost")]
    pub host: String,

    /// Operator performing the actions
    #[arg(long, env = "YARD_OPERATOR_ID")]
    pub operator: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check a vehicle in and send the welcome SMS
    CheckIn(CheckInArgs),
    /// Call a parked vehicle forward
    Notify { vehicle_id: String },
    /// Release a vehicle and report its time on site
    Release { vehicle_id: String },
    /// List vehicles that are still on site
    Vehicles,
    /// Show the SMS timeline of one vehicle
    History { vehicle_id: String },
    /// Count today's simulated SMS by type
    Stats,
    /// Show the 20 most recent log entries
    Activity {
        /// Write the feed as CSV to stdout
        #[arg(long)]
        csv: bool,
    },
    /// Expire prebookings whose arrival time has passed
    Sweep,
}

#[derive(Debug, Clone, Args)]
pub struct CheckInArgs {
    #[arg(long)]
    pub registration: String,

    #[arg(long)]
    pub po: String,

    #[arg(long, default_value = "")]
    pub pager: String,

    #[arg(long, default_value = "")]
    pub notes: String,

    #[arg(long, default_value = "30")]
    pub quoted: i64,

    #[arg(long, help = "Classify the vehicle as an export load")]
    pub export: bool,
}

impl From<CheckInArgs> for CheckInRequest {
    fn from(args: CheckInArgs) -> Self {
        Self {
            registration: args.registration,
            po_ref: args.po,
            pager_number: args.pager,
            notes: args.notes,
            quoted_minutes: args.quoted,
            is_export: args.export,
        }
    }
}

impl CliConfig {
    pub fn operator_context(&self) -> OperatorContext {
        OperatorContext::new(self.operator.clone())
    }

    /// 設定檔存在時優先使用，否則讀取 YARD_* 環境變數
    pub fn load_profiles(&self) -> Result<EndpointProfiles> {
        let config = if Path::new(&self.config).exists() {
            tracing::debug!("Loading configuration from: {}", self.config);
            YardConfig::from_file(&self.config)?
        } else {
            tracing::debug!("{} not found, using YARD_* environment variables", self.config);
            YardConfig::from_env()?
        };

        config.validate()?;
        Ok(config.into_profiles())
    }
}
