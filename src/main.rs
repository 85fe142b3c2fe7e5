use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use qrdrop::common::config::{apply_overrides, load_config};
use qrdrop::common::config_commands::{run_config_path, run_config_show};
use qrdrop::common::ConfigOverrides;
use qrdrop::send::{prepare_share_items, ShareError};
use qrdrop::server::{start_receive_server, start_share_server};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "qrdrop")]
#[command(version)]
#[command(about = "One-shot LAN file upload and share server with a QR code link")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the config file, or the defaults if none exists
    Show,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (0 picks a free port)
    #[arg(long)]
    port: Option<u16>,

    /// Minutes until the link expires
    #[arg(long)]
    ttl_minutes: Option<u64>,

    /// Directory where uploads are saved
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Exit after the first successful upload or download
    #[arg(long)]
    exit_on_upload: bool,

    /// Share these files or directories instead of receiving uploads
    #[arg(long, num_args = 1.., value_name = "PATH")]
    share: Vec<PathBuf>,
}

impl ServeArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            ttl_minutes: self.ttl_minutes,
            upload_dir: self.upload_dir.clone(),
            exit_on_transfer: self.exit_on_upload.then_some(true),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qrdrop=info"));

    // stderr keeps the link and QR block on stdout clean
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => run_config_path(),
            ConfigAction::Show => run_config_show(),
        },
        None => serve(cli.serve).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if matches!(err.downcast_ref::<ShareError>(), Some(ShareError::MissingPath(_))) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = apply_overrides(load_config()?, &args.overrides())?;

    if args.share.is_empty() {
        let port = start_receive_server(&config).await?;
        tracing::debug!(port, "receive session finished");
        return Ok(());
    }

    let paths = args.share;
    let bundle = tokio::task::spawn_blocking(move || prepare_share_items(&paths))
        .await
        .context("Share preparation task failed")??;

    let display_name = bundle.display_name();
    let port = start_share_server(bundle.items().to_vec(), display_name, &config).await?;
    tracing::debug!(port, "share session finished");

    // Generated archives live until here
    drop(bundle);
    Ok(())
}
