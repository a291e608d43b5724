//! The reconciliation pass: bring one application's actual window placement
//! into agreement with its configured desktop, under a daemon whose reads
//! lag its writes.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::common::config::{Placement, Timing};
use crate::sys::launcher::{Launcher, launch_if_needed};
use crate::sys::wm::{SpaceIndex, Window, WindowId, WindowManager};

/// What one pass observed and did. Logged by the orchestrator so timeouts
/// are recorded rather than silently dropped.
#[derive(Clone, Debug)]
pub struct PassReport {
    pub pattern: String,
    pub target: SpaceIndex,
    pub launched: bool,
    pub windows_seen: usize,
    pub moves_issued: usize,
    pub escalation_hops: u32,
    pub timed_out: bool,
}

pub struct PlacementPass {
    wm: Arc<dyn WindowManager>,
    launcher: Arc<dyn Launcher>,
    timing: Timing,
    placement: Placement,
}

impl PlacementPass {
    pub fn new(
        wm: Arc<dyn WindowManager>,
        launcher: Arc<dyn Launcher>,
        timing: Timing,
        placement: Placement,
    ) -> PlacementPass {
        PlacementPass { wm, launcher, timing, placement }
    }

    pub fn run(&self) -> PassReport {
        let target = self.placement.desktop;
        let launched = launch_if_needed(self.launcher.as_ref(), &self.placement);

        let (windows, timed_out) = self.discover();
        if timed_out {
            // Non-fatal: the registered rule catches the windows whenever
            // they appear.
            info!(
                pattern = %self.placement.pattern,
                timeout = ?self.timing.discovery_timeout,
                "no windows appeared within the discovery timeout"
            );
        }

        let mut moves_issued = 0;
        for window in &windows {
            if window.space == Some(target) {
                debug!("window {} already on desktop {target}", window.id);
                continue;
            }
            debug!(
                "moving window {} ({}) from {:?} to desktop {target}",
                window.id, window.app, window.space
            );
            if let Err(e) = self.wm.move_window(window.id, target) {
                warn!("move of window {} failed: {e}", window.id);
            }
            moves_issued += 1;
        }

        let escalation_hops = match (self.placement.stubborn, windows.first()) {
            (true, Some(window)) => self.escalate(window.id),
            _ => 0,
        };

        PassReport {
            pattern: self.placement.pattern.to_string(),
            target,
            launched,
            windows_seen: windows.len(),
            moves_issued,
            escalation_hops,
            timed_out,
        }
    }

    /// Poll the window list until the pattern matches something or the
    /// timeout elapses. Failed queries count as empty results.
    fn discover(&self) -> (Vec<Window>, bool) {
        let deadline = Instant::now() + self.timing.discovery_timeout;
        loop {
            let windows = match self.wm.list_windows() {
                Ok(windows) => windows,
                Err(e) => {
                    warn!("window query failed during discovery: {e}");
                    Vec::new()
                }
            };
            let matched: Vec<Window> = windows
                .into_iter()
                .filter(|w| self.placement.pattern.matches(&w.app))
                .collect();
            if !matched.is_empty() {
                return (matched, false);
            }
            if Instant::now() >= deadline {
                return (Vec::new(), true);
            }
            thread::sleep(self.timing.poll_interval);
        }
    }

    /// Brute-force fallback for a window the direct move did not take on:
    /// hop it one desktop at a time, re-reading its desktop before each
    /// hop, until it lands on the target or the ceiling is hit. Giving up
    /// is silent; the routing rule remains as the durable correction.
    fn escalate(&self, id: WindowId) -> u32 {
        let target = self.placement.desktop;
        let mut hops = 0;
        while hops < self.timing.escalation_ceiling {
            match self.wm.window_space(id) {
                Ok(Some(current)) if current == target => break,
                Ok(Some(current)) => {
                    debug!("window {id} on desktop {current}, hopping toward {target}")
                }
                Ok(None) => {
                    debug!("window {id} vanished during escalation");
                    break;
                }
                Err(e) => {
                    warn!("desktop read for window {id} failed, abandoning escalation: {e}");
                    break;
                }
            }
            if let Err(e) = self.wm.move_window_adjacent(id) {
                warn!("adjacent hop for window {id} failed: {e}");
                break;
            }
            hops += 1;
            thread::sleep(self.timing.escalation_delay);
        }
        if hops == self.timing.escalation_ceiling {
            info!("window {id} still off desktop {target} after {hops} hops, giving up");
        }
        hops
    }
}
