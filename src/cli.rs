//! CLI argument parsing.
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::{env, path::PathBuf};

const GITHUB_TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Configuration file. Defaults to ./component-updates.toml if present.
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Component-update operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Guess package name and version from an issue title and body.
    Guess {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Show how a package is built and named.
    Classify { package: String },

    /// Derive the release note for an issue or pull request.
    ReleaseNote {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        repo: String,
        #[arg(long)]
        issue: u64,
    },

    /// List the package URLs a deployment must produce.
    Plan { package: String, version: String },

    /// List the package URLs that are not deployed yet.
    Missing { package: String, version: String },

    /// Print an upstream changelog page.
    FetchHtml { url: String },
}

impl Args {
    /// Token from the command line, falling back to the environment.
    pub fn token(&self) -> Option<SecretString> {
        let mut token = self.github_token.clone();

        if token.is_empty()
            && let Ok(env_var_token) = env::var(GITHUB_TOKEN_ENV_VAR)
        {
            token = env_var_token;
        }

        if token.is_empty() {
            None
        } else {
            Some(SecretString::from(token))
        }
    }
}
