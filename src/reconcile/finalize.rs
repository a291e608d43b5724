//! Final sweep after all placements settle: repair layout drift caused by
//! the moves, surface the highlight window, and leave the home desktop
//! focused. Everything here is cosmetic and best-effort.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::matcher::AppPattern;
use crate::sys::wm::{Layout, SpaceIndex, WindowManager};

pub struct LayoutFinalizer {
    wm: Arc<dyn WindowManager>,
    desktops: u32,
    layout: Layout,
    home: SpaceIndex,
    highlight: Option<AppPattern>,
}

impl LayoutFinalizer {
    pub fn new(
        wm: Arc<dyn WindowManager>,
        desktops: u32,
        layout: Layout,
        home: SpaceIndex,
        highlight: Option<AppPattern>,
    ) -> LayoutFinalizer {
        LayoutFinalizer { wm, desktops, layout, home, highlight }
    }

    pub fn run(&self) {
        for index in (1..=self.desktops).filter_map(SpaceIndex::new) {
            if let Err(e) = self.wm.set_layout(index, self.layout) {
                debug!("final layout for desktop {index} not applied: {e}");
            }
            if let Err(e) = self.wm.balance(index) {
                debug!("balance for desktop {index} not applied: {e}");
            }
        }

        if let Some(pattern) = &self.highlight {
            self.focus_highlight(pattern);
        }

        // Last, so this is the desktop the user lands on.
        if let Err(e) = self.wm.focus_space(self.home) {
            warn!("could not focus home desktop {}: {e}", self.home);
        }
    }

    fn focus_highlight(&self, pattern: &AppPattern) {
        let windows = match self.wm.list_windows() {
            Ok(windows) => windows,
            Err(e) => {
                warn!("window query failed before highlight focus: {e}");
                return;
            }
        };
        match windows.iter().find(|w| pattern.matches(&w.app)) {
            Some(window) => {
                if let Err(e) = self.wm.focus_window(window.id) {
                    warn!("could not focus highlight window {}: {e}", window.id);
                }
            }
            None => debug!("no window matches highlight pattern {pattern}"),
        }
    }
}
