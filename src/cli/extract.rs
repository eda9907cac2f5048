//! Extract command implementation

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::cli::{dates, CliError};
use crate::client::auth::{munchkin_base_url, Session};
use crate::export::ExportExecutor;
use crate::output::TableWriter;
use crate::{Endpoint, ExportRequest};

/// Marketo Bulk Extractor CLI
#[derive(Parser, Debug)]
#[command(name = "marketo-bulk-extractor")]
#[command(about = "Extract Leads or Activities from the Marketo bulk export API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one bulk export and write the table + manifest
    Extract(ExtractArgs),
}

fn parse_endpoint(s: &str) -> Result<Endpoint, String> {
    Endpoint::from_str(s)
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Munchkin id of the tenant instance (e.g. 123-ABC-456)
    #[arg(long)]
    pub munchkin_id: String,

    /// OAuth client id
    #[arg(long)]
    pub client_id: String,

    /// OAuth client secret (prefer the environment variable)
    #[arg(long, env = "MARKETO_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Endpoint to export: Activities or Leads
    #[arg(long, value_parser = parse_endpoint)]
    pub endpoint: Endpoint,

    /// Created filter: how many days back to go (wins over --created-month)
    #[arg(long)]
    pub created_days_back: Option<u32>,

    /// Created filter: a specific month, e.g. "jan 2024"
    #[arg(long)]
    pub created_month: Option<String>,

    /// Updated filter: how many days back to go (wins over --updated-month)
    #[arg(long)]
    pub updated_days_back: Option<u32>,

    /// Updated filter: a specific month, e.g. "jan 2024"
    #[arg(long)]
    pub updated_month: Option<String>,

    /// Comma-separated field selection (required for Leads)
    #[arg(long)]
    pub fields: Option<String>,

    /// Comma-separated activity type ids (Activities only, empty means all)
    #[arg(long)]
    pub activity_type_ids: Option<String>,

    /// Directory the table and manifest are written into
    #[arg(long, default_value = "data/out/tables")]
    pub tables_dir: PathBuf,

    /// Seconds between status polls
    #[arg(long, default_value = "60")]
    pub poll_interval_secs: u64,

    /// Overall deadline for the poll loop, in seconds
    #[arg(long, default_value = "10800")]
    pub poll_timeout_secs: u64,
}

/// Split a comma-separated value list, trimming entries and dropping blanks.
fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl ExtractArgs {
    /// Build the export request from the parsed arguments.
    ///
    /// Catches the parameter mistakes an operator can make (Leads without
    /// fields, malformed date specs) before any network call is issued.
    pub fn build_request(&self) -> Result<ExportRequest, CliError> {
        let created = dates::resolve(
            "Created",
            self.created_days_back,
            self.created_month.as_deref(),
        )?;
        let updated = dates::resolve(
            "Updated",
            self.updated_days_back,
            self.updated_month.as_deref(),
        )?;

        let fields = split_csv(self.fields.as_deref());
        let activity_type_ids = split_csv(self.activity_type_ids.as_deref());

        let request = match self.endpoint {
            Endpoint::Activities => {
                ExportRequest::activities(created, updated, activity_type_ids)
            }
            Endpoint::Leads => {
                if fields.is_empty() {
                    return Err(CliError::InvalidArgument(
                        "Please specify --fields when endpoint Leads is selected".to_string(),
                    ));
                }
                ExportRequest::leads(created, updated, fields)
            }
        };

        // Same endpoint/filter rules the executor enforces, surfaced here as
        // an argument error before authentication is attempted.
        crate::export::request::validate(&request)?;

        Ok(request)
    }

    /// Execute the extract command end to end.
    pub async fn execute(&self) -> Result<(), CliError> {
        let request = self.build_request()?;

        info!("Endpoint: {}", self.endpoint);
        if !request.fields.is_empty() {
            info!("Desired fields: {:?}", request.fields);
        }
        if !request.activity_type_ids.is_empty() {
            info!("Desired activities: {:?}", request.activity_type_ids);
        }

        let session = Session::establish(
            &munchkin_base_url(&self.munchkin_id),
            &self.client_id,
            &self.client_secret,
        )
        .await?;

        let executor = ExportExecutor::new()
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_poll_timeout(Duration::from_secs(self.poll_timeout_secs));

        let data = executor.execute(&session, &request).await?;

        let writer = TableWriter::new(&self.tables_dir)?;
        writer.write(self.endpoint, &data)?;

        Ok(())
    }
}
