//! CLI error types and conversions

use crate::client::ClientError;
use crate::export::ExportError;
use crate::output::OutputError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Client error (authentication or a raw API call)
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Export orchestration error
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Output writing error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
