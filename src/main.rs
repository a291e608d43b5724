use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use settle::common::config::Settings;
use settle::common::log;
use settle::reconcile::Orchestrator;
use settle::sys::launcher::OpenLauncher;
use settle::sys::wm::WmError;
use settle::sys::yabai::Yabai;
use tracing::error;

/// One-shot window placement reconciler: provisions virtual desktops,
/// registers routing rules, and moves each configured application's
/// windows onto its desktop.
#[derive(Parser, Debug)]
#[command(name = "settle", version, about)]
struct Cli {
    /// Path to the TOML configuration (default: the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log daemon commands instead of issuing them
    #[arg(long)]
    dry_run: bool,

    /// Control binary of the window-management daemon
    #[arg(long)]
    wm_binary: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    log::init(&cli.log_level);

    let path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let binary = cli
        .wm_binary
        .or_else(|| settings.wm_binary.clone())
        .unwrap_or_else(|| "yabai".to_string());
    let wm = Arc::new(Yabai::new(binary, cli.dry_run));
    let launcher = Arc::new(OpenLauncher::new(cli.dry_run));
    let orchestrator = Orchestrator::new(wm, launcher, settings);

    match orchestrator.run().await {
        // Per-window soft failures never change the exit status; the run
        // summary has already been logged.
        Ok(_) => ExitCode::SUCCESS,
        Err(err @ WmError::DaemonUnreachable(_)) => {
            error!(
                "{err}; check that the window manager daemon is running \
                 and has the permissions it needs"
            );
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
