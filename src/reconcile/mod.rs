//! One-shot reconciliation run: provision desktops, register routing
//! rules, reconcile each application's windows concurrently, then finalize
//! layout and focus.
//!
//! Ordering is the only contract: provisioning and rule registration fully
//! precede the placement passes (desktops and rules must exist first), and
//! finalization starts only after every pass has joined. Passes for
//! different applications commute, so they run together on the blocking
//! pool; the daemon serializes its own command queue.

pub mod finalize;
pub mod placement;
pub mod provision;
pub mod rules;

use std::sync::Arc;

use tokio::task;
use tracing::{info, warn};

use crate::common::config::Settings;
use crate::reconcile::finalize::LayoutFinalizer;
use crate::reconcile::placement::{PassReport, PlacementPass};
use crate::reconcile::provision::DesktopProvisioner;
use crate::reconcile::rules::RuleRegistrar;
use crate::sys::launcher::Launcher;
use crate::sys::wm::{WindowManager, WmError, WmResult};

#[derive(Debug)]
pub struct RunSummary {
    pub desktops_created: u32,
    pub rules_registered: usize,
    pub reports: Vec<PassReport>,
}

impl RunSummary {
    pub fn windows_moved(&self) -> usize {
        self.reports.iter().map(|r| r.moves_issued).sum()
    }

    pub fn timed_out_patterns(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.timed_out)
            .map(|r| r.pattern.as_str())
            .collect()
    }
}

pub struct Orchestrator {
    wm: Arc<dyn WindowManager>,
    launcher: Arc<dyn Launcher>,
    settings: Settings,
}

impl Orchestrator {
    pub fn new(
        wm: Arc<dyn WindowManager>,
        launcher: Arc<dyn Launcher>,
        settings: Settings,
    ) -> Orchestrator {
        Orchestrator { wm, launcher, settings }
    }

    /// The startup probe is the only fatal path. Everything after it is
    /// best effort: individual failures are logged by the component that
    /// hit them and the run continues to completion.
    pub async fn run(&self) -> WmResult<RunSummary> {
        {
            let wm = self.wm.clone();
            task::spawn_blocking(move || wm.ping())
                .await
                .map_err(|e| WmError::DaemonUnreachable(format!("startup probe panicked: {e}")))??;
        }

        let timing = self.settings.timing;
        let desktops = self.settings.desktops;
        let layout = self.settings.layout;

        let desktops_created = {
            let provisioner = DesktopProvisioner::new(self.wm.clone(), timing);
            task::spawn_blocking(move || {
                let created = provisioner.ensure_desktops(desktops);
                provisioner.set_layout_all(desktops, layout);
                created
            })
            .await
            .unwrap_or_else(|e| {
                warn!("provisioning task panicked: {e}");
                0
            })
        };

        let rules_registered = {
            let registrar = RuleRegistrar::new(self.wm.clone());
            let placements = self.settings.placements.clone();
            task::spawn_blocking(move || registrar.register_all(&placements))
                .await
                .unwrap_or_else(|e| {
                    warn!("rule registration task panicked: {e}");
                    0
                })
        };

        let mut handles = Vec::with_capacity(self.settings.placements.len());
        for placement in &self.settings.placements {
            let pass = PlacementPass::new(
                self.wm.clone(),
                self.launcher.clone(),
                timing,
                placement.clone(),
            );
            handles.push(task::spawn_blocking(move || pass.run()));
        }
        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!("placement pass panicked: {e}"),
            }
        }

        {
            let finalizer = LayoutFinalizer::new(
                self.wm.clone(),
                desktops,
                layout,
                self.settings.home,
                self.settings.highlight.clone(),
            );
            if let Err(e) = task::spawn_blocking(move || finalizer.run()).await {
                warn!("finalization task panicked: {e}");
            }
        }

        let summary = RunSummary { desktops_created, rules_registered, reports };
        // Printed regardless of how many individual steps failed softly.
        info!(
            "layout applied across {desktops} desktops: {} created, {} rules registered, {} windows moved",
            summary.desktops_created,
            summary.rules_registered,
            summary.windows_moved(),
        );
        for report in &summary.reports {
            info!(
                pattern = %report.pattern,
                target = %report.target,
                windows = report.windows_seen,
                moved = report.moves_issued,
                hops = report.escalation_hops,
                timed_out = report.timed_out,
                "placement settled"
            );
        }
        Ok(summary)
    }
}
