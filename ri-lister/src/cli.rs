use std::path::PathBuf;

use clap::{Parser, crate_description, crate_version, value_parser};
use ri_common::logger::LogLevel;

use crate::lister::LinkKind;
use crate::rows::OverflowPolicy;

#[derive(Debug, Parser)]
#[command(
    long_about = crate_description!(),
    propagate_version = true,
    version = crate_version!(),
)]
pub struct Arguments {
    /// Owner (user or organization) of the repository
    #[arg(long, required_unless_present = "from_git")]
    pub owner: Option<String>,

    /// Name of the repository
    #[arg(long, required_unless_present = "from_git")]
    pub repo: Option<String>,

    /// Branch, tag or commit to list. Defaults to the repository's default branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Directory inside the repository to start from. Defaults to the repository root
    #[arg(long, default_value = "")]
    pub path: String,

    /// GitHub access token, attached to every API request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Prompt for the access token instead of passing it on the command line
    #[arg(long)]
    pub ask_token: bool,

    /// Path of the CSV file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of folder columns in the output
    #[arg(long, value_parser = value_parser!(u8).range(1..))]
    pub folder_columns: Option<u8>,

    /// What to do with folders nested deeper than the folder columns allow
    #[arg(long, value_enum)]
    pub overflow: Option<OverflowPolicy>,

    /// Which URL to put in the url column
    #[arg(long, value_enum, default_value_t = LinkKind::Download)]
    pub link: LinkKind,

    /// Detect owner, repository and branch from the `origin` remote of a local checkout.
    ///
    /// Explicit --owner, --repo and --branch values take precedence over detected ones.
    #[arg(long, num_args = 0..=1, default_missing_value = ".", value_name = "DIR")]
    pub from_git: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides the log level from the configuration file
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Also write log messages to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
