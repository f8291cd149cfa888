use std::{path::PathBuf, process::exit};

use crate::client::*;
use crate::config::*;
use clap::{Parser, Subcommand};

/// Implementation of the `aic` CLI
#[derive(Parser)]
#[command(name = "Application Insights Client (AIC) CLI")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The operation to perform. Exits with code 1 when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Specifies the Application Insights API key sent with every request.
    ///
    /// Automatically loaded from the `APPINSIGHTS_API_KEY` env var if not
    /// given; falls back to the secrets file otherwise.
    #[arg(long, env = "APPINSIGHTS_API_KEY")]
    pub api_key: Option<String>,

    /// Specifies the id of the Application Insights app to query.
    ///
    /// Automatically loaded from the `APPINSIGHTS_APP_ID` env var if not
    /// given; falls back to the secrets file otherwise.
    #[arg(long, env = "APPINSIGHTS_APP_ID")]
    pub app_id: Option<String>,

    /// Specifies the path of the JSON secrets file holding `api-key` and
    /// `app-id`.
    ///
    /// Defaults to `secrets.json` next to the executable if not specified.
    /// The file is only read when a credential is not already supplied via
    /// option or env var.
    #[arg(short, long)]
    pub secrets: Option<PathBuf>,

    /// Overrides the default Application Insights API base URL with the
    /// specified URL.
    #[arg(long)]
    pub api_url: Option<String>,
}

/// The operations exposed by the `aic` CLI, one per remote endpoint.
#[derive(Subcommand)]
pub enum Command {
    /// Runs a free-form analytics query against the app and prints the raw
    /// response.
    Query {
        /// The query expression to execute.
        query_string: String,
    },

    /// Lists events from the app and prints the raw response.
    Events {
        /// The path of the event, e.g. `traces`.
        event_path: String,

        /// The query string used to filter events.
        query_string: String,
    },

    /// Fetches a metric from the app and prints the raw response.
    Metrics {
        /// The path of the metric, e.g. `requests/duration`.
        metric_path: String,

        /// The query string used to filter metrics.
        query_string: String,
    },
}

impl Cli {
    /// Runs the CLI with the specified options
    pub async fn run(&self) {
        let Some(command) = &self.command else {
            eprintln!("No subcommand given. Run with `--help` for usage.");
            exit(1)
        };

        let secrets = match self.resolve_secrets() {
            Ok(secrets) => secrets,
            Err(err) => {
                match err {
                    LoadSecretsError::Io(err) => {
                        let msg = err.to_string();
                        eprintln!(
                            "An error occurred reading the secrets file: \"{msg}\". Provide \
                            credentials via `--api-key`/`--app-id` or point `--secrets` at a \
                            readable file."
                        )
                    }
                    LoadSecretsError::Parse(err) => {
                        let msg = err.to_string();
                        eprintln!(
                            "The secrets file is not a valid JSON object with `api-key` and \
                            `app-id` fields: \"{msg}\"."
                        )
                    }
                }
                exit(1)
            }
        };

        let mut client = match Client::new(secrets) {
            Ok(client) => client,
            Err(err) => {
                match err {
                    CreateClientError::MissingApiKey => {
                        eprintln!(
                            "No API key configured. Set `--api-key`, the `APPINSIGHTS_API_KEY` \
                            env var, or an `api-key` field in the secrets file."
                        )
                    }
                    CreateClientError::MissingAppId => {
                        eprintln!(
                            "No app id configured. Set `--app-id`, the `APPINSIGHTS_APP_ID` \
                            env var, or an `app-id` field in the secrets file."
                        )
                    }
                }
                exit(1)
            }
        };
        if let Some(override_api_url) = &self.api_url {
            client.api_url = override_api_url.clone();
        }

        let result = match command {
            Command::Query { query_string } => client.query(query_string).await,
            Command::Events {
                event_path,
                query_string,
            } => client.events(event_path, query_string).await,
            Command::Metrics {
                metric_path,
                query_string,
            } => client.metrics(metric_path, query_string).await,
        };

        match result {
            Ok(body) => println!("{body}"),
            Err(err) => {
                let endpoint = client.api_url;
                let msg = err.to_string();
                eprintln!(
                    "An error occurred communicating with the Application Insights API at \
                    `{endpoint}`: \"{msg}\"."
                );
                exit(1)
            }
        }
    }

    /// Resolves the credentials to use, preferring options/env vars and
    /// falling back to the secrets file only for fields still missing.
    fn resolve_secrets(&self) -> Result<Secrets, LoadSecretsError> {
        let given = Secrets {
            api_key: self.api_key.clone(),
            app_id: self.app_id.clone(),
        };
        if given.api_key.is_some() && given.app_id.is_some() {
            return Ok(given);
        }
        let path = self.secrets.clone().unwrap_or_else(|| {
            let mut path =
                std::env::current_exe().expect("Failed to locate the current executable");
            path.set_file_name(SECRETS_FILE_NAME);
            path
        });
        Ok(given.or(Secrets::load(&path)?))
    }
}
