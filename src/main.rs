use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use component_updates::{
    ArtifactPlanner, DeploymentVerifier, ReleaseNoteComposer,
    config::Config,
    forge::{
        github::GithubClient,
        https::HttpsClient,
        traits::{GithubApi, get_issue},
    },
    guess_component_update_details,
    package::{
        is_msys_package, needs_both_tracks, needs_separate_arm64_build,
        pretty_name, strip_cross_track_prefix,
    },
};
use log::*;
use std::sync::Arc;

mod cli;

/// Initialize terminal logger with debug or info level filtering.
fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("component_updates")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = Config::load(cli_args.config.as_deref())?;

    match &cli_args.command {
        cli::Command::Guess { title, body } => {
            let details = guess_component_update_details(title, body)?;
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        cli::Command::Classify { package } => {
            let classification = serde_json::json!({
                "package": package,
                "pretty_name": pretty_name(strip_cross_track_prefix(package)),
                "msys": is_msys_package(package),
                "both_tracks": needs_both_tracks(package),
                "separate_arm64_build": needs_separate_arm64_build(package),
            });
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        cli::Command::ReleaseNote { owner, repo, issue } => {
            let api: Arc<dyn GithubApi> = Arc::new(GithubClient::new(
                config.github.clone(),
                cli_args.token(),
            )?);
            let issue = get_issue(api.as_ref(), owner, repo, *issue).await?;
            let composer = ReleaseNoteComposer::new(api, &config.github)?;
            let note = composer.compose(&issue).await?;
            println!("{}", serde_json::to_string_pretty(&note)?);
        }
        cli::Command::Plan { package, version } => {
            let planner = ArtifactPlanner::from(&config.artifacts);
            for url in
                planner.plan_urls(package, version, planner.architectures())
            {
                println!("{url}");
            }
        }
        cli::Command::Missing { package, version } => {
            let verifier = DeploymentVerifier::new(
                ArtifactPlanner::from(&config.artifacts),
                HttpsClient::new(&config.github.user_agent)?,
            );
            let missing = verifier.find_missing(package, version).await?;
            if !missing.is_empty() {
                for url in missing.iter() {
                    println!("{url}");
                }
                return Err(eyre!(
                    "{} package(s) of {package} {version} not deployed",
                    missing.len()
                ));
            }
            info!("{package} {version} is fully deployed");
        }
        cli::Command::FetchHtml { url } => {
            let client = HttpsClient::new(&config.github.user_agent)?;
            println!("{}", client.fetch_html(url).await?);
        }
    }

    Ok(())
}
