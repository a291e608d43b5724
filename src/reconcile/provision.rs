//! Desktop provisioning: make sure the required number of desktops exists
//! and each carries the configured tiling layout.

use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::common::config::Timing;
use crate::sys::wm::{Layout, SpaceIndex, WindowManager};

pub struct DesktopProvisioner {
    wm: Arc<dyn WindowManager>,
    timing: Timing,
}

impl DesktopProvisioner {
    pub fn new(wm: Arc<dyn WindowManager>, timing: Timing) -> DesktopProvisioner {
        DesktopProvisioner { wm, timing }
    }

    /// Create desktops until `target` exist. Counts optimistically after
    /// each creation instead of re-querying, pausing between creations so
    /// the daemon catches up. A degraded space query counts as zero
    /// desktops; over-creating is recoverable, under-creating strands
    /// placements. Returns the number of creations issued.
    pub fn ensure_desktops(&self, target: u32) -> u32 {
        let current = match self.wm.list_spaces() {
            Ok(spaces) => spaces.len() as u32,
            Err(e) => {
                warn!("space query failed, assuming zero desktops: {e}");
                0
            }
        };
        if current >= target {
            debug!("{current} desktops present, {target} required, nothing to create");
            return 0;
        }
        for _ in current..target {
            if let Err(e) = self.wm.create_space() {
                warn!("desktop creation failed: {e}");
            }
            thread::sleep(self.timing.settle_delay);
        }
        target - current
    }

    /// Best effort: layout is cosmetic, a per-desktop failure never stops
    /// the sweep.
    pub fn set_layout_all(&self, desktops: u32, layout: Layout) {
        for index in (1..=desktops).filter_map(SpaceIndex::new) {
            if let Err(e) = self.wm.set_layout(index, layout) {
                debug!("layout for desktop {index} not applied: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::fake::FakeWm;

    fn provisioner(wm: &Arc<FakeWm>) -> DesktopProvisioner {
        DesktopProvisioner::new(wm.clone(), Timing::instant())
    }

    #[test]
    fn creates_missing_desktops() {
        let wm = Arc::new(FakeWm::with_spaces(2));
        let created = provisioner(&wm).ensure_desktops(6);
        assert_eq!(created, 4);
        assert_eq!(wm.space_count(), 6);
    }

    #[test]
    fn no_creation_when_enough_desktops_exist() {
        let wm = Arc::new(FakeWm::with_spaces(6));
        let created = provisioner(&wm).ensure_desktops(4);
        assert_eq!(created, 0);
        assert!(!wm.journal().iter().any(|e| e == "create-space"));
    }

    #[test]
    fn degraded_space_query_counts_as_zero_desktops() {
        let wm = Arc::new(FakeWm::with_spaces(3));
        wm.degrade_space_queries(1);
        let created = provisioner(&wm).ensure_desktops(6);
        // All six creations are issued, not six minus the invisible three.
        assert_eq!(created, 6);
        let creations = wm.journal().iter().filter(|e| *e == "create-space").count();
        assert_eq!(creations, 6);
    }

    #[test]
    fn layout_sweep_covers_every_desktop_in_order() {
        let wm = Arc::new(FakeWm::with_spaces(3));
        provisioner(&wm).set_layout_all(3, Layout::Bsp);
        let layouts: Vec<String> = wm
            .journal()
            .into_iter()
            .filter(|e| e.starts_with("set-layout"))
            .collect();
        assert_eq!(layouts, vec!["set-layout 1 bsp", "set-layout 2 bsp", "set-layout 3 bsp"]);
    }
}
