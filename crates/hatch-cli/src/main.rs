//! hatch CLI
//!
//! UpdateClient を手元で動かすための薄いフロントエンド。
//! 設定は JSON ファイル（`--config`）を読み、個別の値はフラグか
//! `HATCH_*` 環境変数で上書きできます。

use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hatch_core::app::{UpdateClient, UpdateClientBuilder, UpdateOutcome, install_global};
use hatch_core::{UpdateConfig, compare_versions};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "hatch", version, about = "Check, download and install app updates")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, env = "HATCH_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "HATCH_MANIFEST_URL")]
    manifest_url: Option<String>,

    /// Artifact URL with a `{version}` placeholder
    #[arg(long, global = true, env = "HATCH_DOWNLOAD_URL_TEMPLATE")]
    download_url_template: Option<String>,

    #[arg(long, global = true, env = "HATCH_ARTIFACT_DIR")]
    artifact_dir: Option<PathBuf>,

    /// Version treated as installed
    #[arg(long, global = true, env = "HATCH_CURRENT_VERSION")]
    current_version: Option<String>,

    #[arg(long, global = true, env = "HATCH_CONTENT_AUTHORITY")]
    content_authority: Option<String>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the remote version
    Check,
    /// Delete all but the newest artifacts
    Clean,
    /// Download an artifact (the latest remote version by default)
    Download {
        #[arg(long)]
        url: Option<String>,
    },
    /// Hand a downloaded artifact to the installer
    Install { file_uri: String },
    /// Check, download and install if a newer version exists
    Update,
    /// Compare two version strings
    Compare { a: String, b: String },
}

impl Cli {
    fn load_config(&self) -> Result<UpdateConfig> {
        let mut config = match &self.config {
            Some(path) => UpdateConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => UpdateConfig::default(),
        };
        if let Some(url) = &self.manifest_url {
            config.manifest_url = url.clone();
        }
        if let Some(template) = &self.download_url_template {
            config.download_url_template = template.clone();
        }
        if let Some(dir) = &self.artifact_dir {
            config.artifact_dir = dir.clone();
        }
        if let Some(version) = &self.current_version {
            config.current_version = version.clone();
        }
        if let Some(authority) = &self.content_authority {
            config.content_authority = Some(authority.clone());
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos:>3}%")?);
    Ok(bar)
}

async fn download_with_bar(client: &UpdateClient, url: &str) -> Result<String> {
    let bar = progress_bar()?;
    let on_progress = |percent: u64| bar.set_position(percent);
    let result = client.download_artifact(url, Some(&on_progress)).await;
    bar.finish_and_clear();
    Ok(result?)
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Compare { a, b } = &cli.command {
        let symbol = match compare_versions(a, b) {
            Ordering::Less => "<",
            Ordering::Equal => "=",
            Ordering::Greater => ">",
        };
        println!("{a} {symbol} {b}");
        return Ok(());
    }

    let config = cli.load_config()?;
    let client = UpdateClientBuilder::new(config).with_system_ports()?.build()?;
    let client = install_global(client)?;

    match cli.command {
        Command::Check => {
            let info = client.check_version().await?;
            let report = serde_json::json!({
                "version": info.version,
                "download_url": info.download_url,
                "current_version": client.current_version(),
                "update_available": client.is_update_available(&info.version),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Clean => {
            let deleted = client.clean_old_artifacts().await;
            println!("deleted {deleted} artifact(s)");
        }
        Command::Download { url } => {
            let url = match url {
                Some(url) => url,
                None => client.check_version().await?.download_url,
            };
            let uri = download_with_bar(client, &url).await?;
            println!("{uri}");
        }
        Command::Install { file_uri } => {
            client.install_artifact(&file_uri).await?;
            println!("installer launched for {file_uri}");
        }
        Command::Update => {
            let bar = progress_bar()?;
            let on_progress = |percent: u64| bar.set_position(percent);
            let outcome = client.update(Some(&on_progress)).await;
            bar.finish_and_clear();
            match outcome? {
                UpdateOutcome::UpToDate { current } => println!("already up to date ({current})"),
                UpdateOutcome::Installed { version, file_uri } => {
                    println!("installer launched for {version} ({file_uri})");
                }
            }
        }
        Command::Compare { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(?cli, "hatch starting");
    run(cli).await
}
