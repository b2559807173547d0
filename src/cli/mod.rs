//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the appdist binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::apple::BuildProcessingState;
use crate::firebase::OrderBy;

/// App Store Connect and Firebase App Distribution command-line interface.
#[derive(Parser, Debug)]
#[command(name = "appdist", about = "App distribution CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log requests to stderr.
    #[arg(long, short, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage "What to Test" notes of TestFlight builds.
    #[command(subcommand, visible_alias = "beta-build-localizations")]
    Localizations(LocalizationCommand),

    /// Inspect builds uploaded to App Store Connect.
    #[command(subcommand)]
    Builds(BuildCommand),

    /// Inspect Firebase App Distribution releases.
    #[command(subcommand)]
    Releases(ReleaseCommand),

    /// Download provisioning profiles and a signing certificate.
    FetchSigningFiles(FetchSigningFilesArgs),
}

#[derive(Subcommand, Debug)]
pub enum LocalizationCommand {
    /// Create the localization of a build.
    Create {
        /// Id of the build.
        build_id: String,

        #[arg(long, default_value = "en-US")]
        locale: String,

        /// "What to Test" text.
        #[arg(long)]
        whats_new: String,
    },

    /// Change the "What to Test" text of a localization.
    Modify {
        build_id: String,

        #[arg(long, default_value = "en-US")]
        locale: String,

        #[arg(long)]
        whats_new: String,
    },

    /// Delete a localization.
    Delete {
        build_id: String,

        #[arg(long, default_value = "en-US")]
        locale: String,
    },

    /// List localizations.
    List {
        /// Only localizations of this build.
        #[arg(long)]
        build_id: Option<String>,

        #[arg(long)]
        locale: Option<String>,

        /// Stop after this many results.
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BuildCommand {
    /// List builds.
    List {
        /// Only builds of this app.
        #[arg(long)]
        app_id: Option<String>,

        /// Build number.
        #[arg(long)]
        version: Option<String>,

        /// Marketing version.
        #[arg(long)]
        pre_release_version: Option<String>,

        #[arg(long, value_enum)]
        processing_state: Option<ProcessingState>,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Get a single build by id.
    Get { build_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// List releases of an app, newest first.
    List {
        #[command(flatten)]
        app: FirebaseAppArgs,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, value_enum, default_value = "newest")]
        order: ReleaseOrder,

        #[arg(long, default_value_t = crate::firebase::DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },

    /// Print the build version of the most recent release.
    LatestBuildVersion {
        #[command(flatten)]
        app: FirebaseAppArgs,
    },
}

/// Identifies a Firebase app.
#[derive(Args, Debug, Clone)]
pub struct FirebaseAppArgs {
    /// Firebase app id, e.g. `1:228333310124:ios:5e439e0d0231a788ac8f09`.
    pub app_id: String,

    /// Project id or number. Derived from the app id when omitted.
    #[arg(long)]
    pub project_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct FetchSigningFilesArgs {
    /// Names of provisioning profile objects in storage.
    #[arg(long, required = true, num_args = 1..)]
    pub profile_names: Vec<String>,

    /// Name of the certificate object in storage.
    #[arg(long)]
    pub certificate_name: String,

    /// Name of the certificate password object in storage.
    #[arg(long)]
    pub certificate_password_name: Option<String>,

    /// Directory for provisioning profiles.
    #[arg(long)]
    pub profiles_dir: Option<PathBuf>,

    /// Directory for certificates.
    #[arg(long)]
    pub certificates_dir: Option<PathBuf>,
}

/// Processing states accepted by `builds list`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessingState {
    Processing,
    Failed,
    Invalid,
    Valid,
}

impl From<ProcessingState> for BuildProcessingState {
    fn from(state: ProcessingState) -> Self {
        match state {
            ProcessingState::Processing => Self::Processing,
            ProcessingState::Failed => Self::Failed,
            ProcessingState::Invalid => Self::Invalid,
            ProcessingState::Valid => Self::Valid,
        }
    }
}

/// Release ordering accepted by `releases list`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseOrder {
    Newest,
    Oldest,
}

impl From<ReleaseOrder> for OrderBy {
    fn from(order: ReleaseOrder) -> Self {
        match order {
            ReleaseOrder::Newest => Self::CreateTimeDesc,
            ReleaseOrder::Oldest => Self::CreateTimeAsc,
        }
    }
}
