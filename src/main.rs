//! Tanuki CLI entrypoint for GitLab user and merge request lookups.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use tanuki::config::OperationMode;
use tanuki::output::{merge_request_summary, user_summary, write_summary_to};
use tanuki::{ClientError, MergeRequestClient, ReqwestGitLabApi, TanukiConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

async fn run() -> Result<(), ClientError> {
    let config = load_config()?;
    let policy = config.validation_policy();

    match config.operation_mode() {
        OperationMode::CurrentUser => {
            let credentials = config.current_user_credentials()?;
            let client = MergeRequestClient::new(ReqwestGitLabApi::new(&credentials)?)
                .with_policy(policy);
            let profile = client.current_user().run().await?;
            write_summary(&user_summary(&profile))
        }
        OperationMode::MergeRequest => {
            let target = config.merge_request_target()?;
            let credentials = config.resolve_credentials(target.url_host.as_ref())?;
            let client = MergeRequestClient::new(ReqwestGitLabApi::new(&credentials)?)
                .with_policy(policy);
            let (metadata, changes) = futures::try_join!(
                client.merge_request(&target.locator).run(),
                client.merge_request_changes(&target.locator).run()
            )?;
            write_summary(&merge_request_summary(&metadata, &changes))
        }
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ClientError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<TanukiConfig, ClientError> {
    TanukiConfig::load().map_err(|error| ClientError::Configuration {
        message: error.to_string(),
    })
}

fn write_summary(summary: &str) -> Result<(), ClientError> {
    write_summary_to(&mut io::stdout().lock(), summary)
}
