//! Command-line definitions.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use portal_core::{MultipartForm, RequestBody};

#[derive(Debug, Parser)]
#[command(name = "portal", version, about = "Talk to the portal backend")]
pub struct Cli {
    /// Backend base URL. Overrides BACKEND_URL and portal.toml.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds. Unset means no deadline.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Configuration file (defaults to ./portal.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// GET an endpoint
    Get(NoBodyArgs),
    /// POST to an endpoint
    Post(BodyArgs),
    /// PUT to an endpoint
    Put(BodyArgs),
    /// PATCH an endpoint
    Patch(BodyArgs),
    /// DELETE an endpoint
    Delete(NoBodyArgs),
    /// Log in with a username (or email) and password
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
}

#[derive(Debug, Args)]
pub struct NoBodyArgs {
    pub endpoint: String,

    /// Extra header as `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BodyArgs {
    pub endpoint: String,

    /// Extra header as `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// JSON body.
    #[arg(long, conflicts_with_all = ["form", "file"])]
    pub json: Option<String>,

    /// Multipart text field as `name=value`. Repeatable.
    #[arg(long)]
    pub form: Vec<String>,

    /// Multipart file field as `name=path` or `name=path;type=mime`. Repeatable.
    #[arg(long)]
    pub file: Vec<String>,
}

impl BodyArgs {
    /// JSON when `--json` is given, multipart when any form or file field
    /// is, an empty JSON object otherwise.
    pub fn body(&self) -> Result<RequestBody> {
        if let Some(json) = &self.json {
            let value = serde_json::from_str(json).context("--json is not valid JSON")?;
            return Ok(RequestBody::Json(value));
        }
        if self.form.is_empty() && self.file.is_empty() {
            return Ok(RequestBody::Json(serde_json::json!({})));
        }

        let mut form = MultipartForm::new();
        for field in &self.form {
            let (name, value) = split_pair(field, '=')?;
            form = form.text(name, value);
        }
        for field in &self.file {
            let (name, path, content_type) = parse_file_field(field)?;
            let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
            let file_name = std::path::Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string());
            form = form.file(name, file_name, content_type, bytes);
        }
        Ok(RequestBody::Multipart(form))
    }
}

/// Parse `Name: value` header arguments.
pub fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|h| split_pair(h, ':').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect()
}

/// Split `name=path[;type=mime]`.
fn parse_file_field(raw: &str) -> Result<(&str, &str, Option<&str>)> {
    let (name, rest) = split_pair(raw, '=')?;
    let Some((path, params)) = rest.split_once(';') else {
        return Ok((name, rest, None));
    };
    let Some(mime) = params.trim().strip_prefix("type=") else {
        bail!("unknown file option `{params}` in `{raw}`, expected `type=<mime>`");
    };
    let mime = mime.trim();
    if mime.is_empty() {
        bail!("empty content type in `{raw}`");
    }
    Ok((name, path.trim(), Some(mime)))
}

fn split_pair(raw: &str, sep: char) -> Result<(&str, &str)> {
    let Some((name, value)) = raw.split_once(sep) else {
        bail!("expected `name{sep}value`, got `{raw}`");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("empty name in `{raw}`");
    }
    Ok((name, value.trim()))
}
