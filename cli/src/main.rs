//! `portal` - command-line front end for the portal backend.

mod cli;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use portal_core::{
    accounts, AccountError, ApiClient, ApiError, ConfigLoader, HttpMethod, LoginForm, RegistrationForm,
    RequestBody, RequestConfig,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cli::{parse_headers, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ApiError>() {
            Some(ApiError::Http { status, .. }) => eprintln!("error ({status}): {e}"),
            _ => eprintln!("error: {e:#}"),
        }
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    config.validate()?;
    tracing::debug!(base_url = %config.base_url, "client configured");

    let api = ApiClient::from_config(&config)?;

    let data = match cli.command {
        Commands::Get(args) => {
            send(&api, HttpMethod::Get, &args.endpoint, &args.headers, RequestBody::None).await?
        }
        Commands::Delete(args) => {
            send(&api, HttpMethod::Delete, &args.endpoint, &args.headers, RequestBody::None).await?
        }
        Commands::Post(args) => send(&api, HttpMethod::Post, &args.endpoint, &args.headers, args.body()?).await?,
        Commands::Put(args) => send(&api, HttpMethod::Put, &args.endpoint, &args.headers, args.body()?).await?,
        Commands::Patch(args) => send(&api, HttpMethod::Patch, &args.endpoint, &args.headers, args.body()?).await?,
        Commands::Login { username, password } => {
            accounts::login(&api, &LoginForm::new(username, password))
                .await
                .map_err(unwrap_account)?
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                name,
                email,
                password,
                confirm_password,
            };
            let created = accounts::register(&api, &form).await.map_err(unwrap_account)?;
            serde_json::to_value(created)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

async fn send(
    api: &ApiClient,
    method: HttpMethod,
    endpoint: &str,
    headers: &[String],
    body: RequestBody,
) -> Result<Value> {
    let config = RequestConfig::new(method).headers(parse_headers(headers)?).body(body);
    Ok(api.request(endpoint, config).await?)
}

/// Keep `ApiError` reachable by `downcast_ref` in `main`.
fn unwrap_account(err: AccountError) -> anyhow::Error {
    match err {
        AccountError::Api(api) => api.into(),
        AccountError::Form(form) => form.into(),
    }
}
