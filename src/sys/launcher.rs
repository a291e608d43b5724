//! Process liveness checks and fire-and-forget application launches.
//!
//! There is no readiness contract: the OS gives no signal for "the app's
//! windows exist now", so callers poll the window list instead of waiting
//! on the launcher.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::common::config::Placement;

pub trait Launcher: Send + Sync {
    fn is_running(&self, name: &str) -> bool;
    fn launch(&self, name: &str);
}

/// Launcher over the same CLI substrate as the daemon client: `pgrep` for
/// liveness, `open -a` for launches.
pub struct OpenLauncher {
    dry_run: bool,
}

impl OpenLauncher {
    pub fn new(dry_run: bool) -> OpenLauncher {
        OpenLauncher { dry_run }
    }

    fn pgrep(&self, args: &[&str]) -> bool {
        match Command::new("pgrep")
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) => status.success(),
            Err(e) => {
                warn!("pgrep failed: {e}");
                false
            }
        }
    }
}

impl Launcher for OpenLauncher {
    fn is_running(&self, name: &str) -> bool {
        // Exact process name first, then a path-substring probe for apps
        // whose process name differs from their display name.
        self.pgrep(&["-x", name]) || self.pgrep(&["-f", name])
    }

    fn launch(&self, name: &str) {
        if self.dry_run {
            debug!("dry-run: open -a {name}");
            return;
        }
        match Command::new("open")
            .args(["-a", name])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            // Fire and forget. The child is `open`, not the app; reaping it
            // tells us nothing about the app's readiness.
            Ok(_) => debug!("requested launch of {name}"),
            Err(e) => warn!("failed to request launch of {name}: {e}"),
        }
    }
}

/// Launch the placement's application unless a matching process is already
/// alive. Returns whether a launch was requested, for the pass report.
pub fn launch_if_needed(launcher: &dyn Launcher, placement: &Placement) -> bool {
    let Some(name) = placement.launch_name() else {
        debug!(
            pattern = %placement.pattern,
            "regex placement without a launch override, skipping launch"
        );
        return false;
    };
    if launcher.is_running(name) {
        debug!("{name} already running");
        return false;
    }
    launcher.launch(name);
    true
}
