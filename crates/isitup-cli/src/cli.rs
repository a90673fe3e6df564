//! Command-line flags and mode selection

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use thiserror::Error;

/// Invalid flag combinations that clap alone cannot express
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("You must specify a positive check to remove")]
    NegativeId(i64),

    #[error("The arguments --host, --port, and --url are mandatory when using --add-check")]
    MissingAddFields,

    #[error("You cannot use --host, --port, or --url without --add-check")]
    AddFieldsWithoutAddCheck,
}

#[derive(Debug, Parser)]
#[command(
    name = "isitup",
    about = "Poll TCP ports for up/down states on a regular basis",
    version
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(false)
        .args(["check", "list", "add_check", "remove_check"])
))]
pub struct Cli {
    /// Run the availability check
    #[arg(long)]
    pub check: bool,

    /// Display information while running
    #[arg(long)]
    pub verbose: bool,

    /// List the checks in the database
    #[arg(long)]
    pub list: bool,

    /// Remove the specified check from the database
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub remove_check: Option<i64>,

    /// Add a check to the database
    #[arg(long)]
    pub add_check: bool,

    /// The hostname of the entry to add
    #[arg(long, conflicts_with_all = ["check", "list", "remove_check"])]
    pub host: Option<String>,

    /// The port of the entry to add
    #[arg(long, conflicts_with_all = ["check", "list", "remove_check"])]
    pub port: Option<u16>,

    /// The URL of the entry to add
    #[arg(long, conflicts_with_all = ["check", "list", "remove_check"])]
    pub url: Option<String>,

    /// Configuration file (default: search standard locations)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// The one thing an invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Check,
    List,
    Add {
        host: String,
        port: u16,
        resource: String,
    },
    Remove {
        id: i64,
    },
}

impl Cli {
    /// Resolve the flags into a single mode
    pub fn mode(&self) -> Result<Mode, UsageError> {
        let has_add_fields = self.host.is_some() || self.port.is_some() || self.url.is_some();
        if has_add_fields && !self.add_check {
            return Err(UsageError::AddFieldsWithoutAddCheck);
        }

        if let Some(id) = self.remove_check {
            if id < 0 {
                return Err(UsageError::NegativeId(id));
            }
            return Ok(Mode::Remove { id });
        }

        if self.add_check {
            return match (&self.host, self.port, &self.url) {
                (Some(host), Some(port), Some(url)) if !host.is_empty() && !url.is_empty() => {
                    Ok(Mode::Add {
                        host: host.clone(),
                        port,
                        resource: url.clone(),
                    })
                }
                _ => Err(UsageError::MissingAddFields),
            };
        }

        if self.list {
            return Ok(Mode::List);
        }

        Ok(Mode::Check)
    }
}
