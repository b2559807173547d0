//! CLI argument parsing tests.

use appdist::apple::BuildProcessingState;
use appdist::cli::{
    BuildCommand, Cli, Command, LocalizationCommand, ProcessingState, ReleaseCommand,
    ReleaseOrder,
};
use appdist::firebase::{OrderBy, DEFAULT_PAGE_SIZE};
use clap::Parser;

#[test]
fn test_cli_parses_localization_create() {
    let cli = Cli::parse_from([
        "appdist",
        "localizations",
        "create",
        "123",
        "--whats-new",
        "Fixed bugs",
    ]);

    assert!(!cli.json);
    match cli.command {
        Command::Localizations(LocalizationCommand::Create {
            build_id,
            locale,
            whats_new,
        }) => {
            assert_eq!(build_id, "123");
            assert_eq!(locale, "en-US");
            assert_eq!(whats_new, "Fixed bugs");
        }
        other => panic!("Expected localizations create, got {other:?}"),
    }
}

#[test]
fn test_cli_parses_localization_delete_with_alias() {
    let cli = Cli::parse_from([
        "appdist",
        "beta-build-localizations",
        "delete",
        "123",
        "--locale",
        "de-DE",
    ]);

    match cli.command {
        Command::Localizations(LocalizationCommand::Delete { build_id, locale }) => {
            assert_eq!(build_id, "123");
            assert_eq!(locale, "de-DE");
        }
        other => panic!("Expected localizations delete, got {other:?}"),
    }
}

#[test]
fn test_cli_modify_requires_whats_new() {
    let result = Cli::try_parse_from(["appdist", "localizations", "modify", "123"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_builds_list_filters() {
    let cli = Cli::parse_from([
        "appdist",
        "builds",
        "list",
        "--app-id",
        "6440000000",
        "--processing-state",
        "valid",
        "--limit",
        "5",
        "--json",
    ]);

    assert!(cli.json);
    match cli.command {
        Command::Builds(BuildCommand::List {
            app_id,
            processing_state,
            limit,
            version,
            ..
        }) => {
            assert_eq!(app_id.as_deref(), Some("6440000000"));
            assert_eq!(processing_state, Some(ProcessingState::Valid));
            assert_eq!(
                processing_state.map(BuildProcessingState::from),
                Some(BuildProcessingState::Valid)
            );
            assert_eq!(limit, Some(5));
            assert!(version.is_none());
        }
        other => panic!("Expected builds list, got {other:?}"),
    }
}

#[test]
fn test_cli_parses_releases_list_defaults() {
    let cli = Cli::parse_from([
        "appdist",
        "releases",
        "list",
        "1:228333310124:ios:5e439e0d0231a788ac8f09",
    ]);

    match cli.command {
        Command::Releases(ReleaseCommand::List {
            app,
            limit,
            order,
            page_size,
        }) => {
            assert_eq!(app.app_id, "1:228333310124:ios:5e439e0d0231a788ac8f09");
            assert!(app.project_id.is_none());
            assert!(limit.is_none());
            assert_eq!(order, ReleaseOrder::Newest);
            assert_eq!(OrderBy::from(order), OrderBy::CreateTimeDesc);
            assert_eq!(page_size, DEFAULT_PAGE_SIZE);
        }
        other => panic!("Expected releases list, got {other:?}"),
    }
}

#[test]
fn test_cli_parses_latest_build_version_with_project() {
    let cli = Cli::parse_from([
        "appdist",
        "releases",
        "latest-build-version",
        "1:228333310124:ios:5e439e0d0231a788ac8f09",
        "--project-id",
        "my-project",
    ]);

    match cli.command {
        Command::Releases(ReleaseCommand::LatestBuildVersion { app }) => {
            assert_eq!(app.project_id.as_deref(), Some("my-project"));
        }
        other => panic!("Expected latest-build-version, got {other:?}"),
    }
}

#[test]
fn test_cli_parses_fetch_signing_files() {
    let cli = Cli::parse_from([
        "appdist",
        "fetch-signing-files",
        "--profile-names",
        "dev.mobileprovision",
        "adhoc.mobileprovision",
        "--certificate-name",
        "dist.p12",
        "--certificate-password-name",
        "dist.password",
    ]);

    match cli.command {
        Command::FetchSigningFiles(args) => {
            assert_eq!(
                args.profile_names,
                vec!["dev.mobileprovision", "adhoc.mobileprovision"]
            );
            assert_eq!(args.certificate_name, "dist.p12");
            assert_eq!(args.certificate_password_name.as_deref(), Some("dist.password"));
            assert!(args.profiles_dir.is_none());
        }
        other => panic!("Expected fetch-signing-files, got {other:?}"),
    }
}

#[test]
fn test_cli_fetch_signing_files_requires_profiles() {
    let result = Cli::try_parse_from([
        "appdist",
        "fetch-signing-files",
        "--certificate-name",
        "dist.p12",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_json_flag_is_global() {
    let cli = Cli::parse_from(["appdist", "--json", "builds", "get", "123"]);
    assert!(cli.json);
    assert!(matches!(
        cli.command,
        Command::Builds(BuildCommand::Get { ref build_id }) if build_id == "123"
    ));
}
