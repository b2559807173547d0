//! App distribution CLI binary.
//!
//! A command-line interface over the App Store Connect and Firebase App
//! Distribution clients.

use std::process::ExitCode;

use appdist::apple::{
    BetaBuildLocalization, BetaBuildLocalizationFilter, Build, BuildFilter, BuildOrdering,
};
use appdist::cli::{
    BuildCommand, Cli, Command, FetchSigningFilesArgs, FirebaseAppArgs, LocalizationCommand,
    ReleaseCommand,
};
use appdist::firebase::{AppIdentifier, Release, ReleaseListOptions};
use appdist::provisioning::ProvisioningDirectories;
use appdist::{
    AppStoreConnectClient, FirebaseClient, HttpBlobStorage, ManualProvisioning, PrettyPrint,
    ResourceRef,
};
use clap::Parser;
use serde::Serialize;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> appdist::Result<()> {
    match cli.command {
        Command::Localizations(command) => {
            let client = AppStoreConnectClient::from_env()?;
            handle_localizations(&client, command, cli.json).await
        }
        Command::Builds(command) => {
            let client = AppStoreConnectClient::from_env()?;
            handle_builds(&client, command, cli.json).await
        }
        Command::Releases(command) => {
            let client = FirebaseClient::from_env()?;
            handle_releases(&client, command, cli.json).await
        }
        Command::FetchSigningFiles(args) => handle_fetch_signing_files(args, cli.json).await,
    }
}

async fn handle_localizations(
    client: &AppStoreConnectClient,
    command: LocalizationCommand,
    json: bool,
) -> appdist::Result<()> {
    let localizations = client.beta_build_localizations();
    match command {
        LocalizationCommand::Create {
            build_id,
            locale,
            whats_new,
        } => {
            let created = localizations.create(build_id, &locale, &whats_new).await?;
            output_single(&created, json)?;
        }
        LocalizationCommand::Modify {
            build_id,
            locale,
            whats_new,
        } => {
            let modified = localizations.modify(build_id, &locale, &whats_new).await?;
            output_single(&modified, json)?;
        }
        LocalizationCommand::Delete { build_id, locale } => {
            localizations.delete(build_id.as_str(), &locale).await?;
            if !json {
                println!("Deleted {locale} localization of build {build_id}");
            }
        }
        LocalizationCommand::List {
            build_id,
            locale,
            limit,
        } => {
            let filter = BetaBuildLocalizationFilter {
                build: build_id.map(ResourceRef::from),
                locale,
            };
            let items = localizations
                .list_with_limit(&filter, limit)?
                .collect_all()
                .await?;
            output_list(&items, json, |l| LocalizationRow::from(l))?;
        }
    }
    Ok(())
}

async fn handle_builds(
    client: &AppStoreConnectClient,
    command: BuildCommand,
    json: bool,
) -> appdist::Result<()> {
    let builds = client.builds();
    match command {
        BuildCommand::List {
            app_id,
            version,
            pre_release_version,
            processing_state,
            limit,
        } => {
            let filter = BuildFilter {
                app: app_id.map(ResourceRef::from),
                version,
                pre_release_version,
                processing_state: processing_state.map(Into::into),
                expired: None,
                sort: Some(BuildOrdering::UploadedDateDesc),
            };
            let items = builds.list_with_limit(&filter, limit)?.collect_all().await?;
            output_list(&items, json, |b| BuildRow::from(b))?;
        }
        BuildCommand::Get { build_id } => {
            let build = builds.read(&build_id).await?;
            output_single(&build, json)?;
        }
    }
    Ok(())
}

async fn handle_releases(
    client: &FirebaseClient,
    command: ReleaseCommand,
    json: bool,
) -> appdist::Result<()> {
    let releases = client.releases();
    match command {
        ReleaseCommand::List {
            app,
            limit,
            order,
            page_size,
        } => {
            let options = ReleaseListOptions {
                order_by: order.into(),
                limit,
                page_size,
            };
            let items = releases
                .list(&app_identifier(app)?, &options)?
                .collect_all()
                .await?;
            output_list(&items, json, |r| ReleaseRow::from(r))?;
        }
        ReleaseCommand::LatestBuildVersion { app } => {
            let build_version = releases.latest_build_version(&app_identifier(app)?).await?;
            println!("{build_version}");
        }
    }
    Ok(())
}

async fn handle_fetch_signing_files(args: FetchSigningFilesArgs, json: bool) -> appdist::Result<()> {
    let defaults = ProvisioningDirectories::default();
    let directories = ProvisioningDirectories::new(
        args.profiles_dir.unwrap_or(defaults.profiles),
        args.certificates_dir.unwrap_or(defaults.certificates),
    );
    let provisioning = ManualProvisioning::new(HttpBlobStorage::from_env()?, directories);

    let files = provisioning
        .fetch_signing_files(
            &args.profile_names,
            &args.certificate_name,
            args.certificate_password_name.as_deref(),
        )
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        for profile in &files.profiles {
            println!("Provisioning profile: {}", profile.display());
        }
        println!("Certificate: {}", files.certificate.display());
    }
    Ok(())
}

fn app_identifier(args: FirebaseAppArgs) -> appdist::Result<AppIdentifier> {
    match args.project_id {
        Some(project_id) => Ok(AppIdentifier::new(project_id, args.app_id)),
        None => AppIdentifier::from_app_id(&args.app_id),
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> appdist::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> appdist::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct LocalizationRow {
    id: String,
    locale: String,
    #[tabled(rename = "what's new")]
    whats_new: String,
}

impl From<&BetaBuildLocalization> for LocalizationRow {
    fn from(l: &BetaBuildLocalization) -> Self {
        Self {
            id: l.id.clone(),
            locale: l.attributes.locale.clone().unwrap_or_default(),
            whats_new: l.attributes.whats_new.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct BuildRow {
    id: String,
    version: String,
    uploaded: String,
    state: String,
    expired: String,
}

impl From<&Build> for BuildRow {
    fn from(b: &Build) -> Self {
        let attributes = &b.attributes;
        Self {
            id: b.id.clone(),
            version: attributes.version.clone().unwrap_or_default(),
            uploaded: attributes
                .uploaded_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            state: attributes
                .processing_state
                .map(|s| format!("{s:?}").to_uppercase())
                .unwrap_or_default(),
            expired: attributes
                .expired
                .map(|e| e.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ReleaseRow {
    release: String,
    #[tabled(rename = "display version")]
    display_version: String,
    #[tabled(rename = "build version")]
    build_version: u64,
    created: String,
}

impl From<&Release> for ReleaseRow {
    fn from(r: &Release) -> Self {
        Self {
            release: r.release_id().to_string(),
            display_version: r.display_version.clone(),
            build_version: r.build_version,
            created: r.create_time.to_rfc3339(),
        }
    }
}
