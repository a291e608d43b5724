//! Deterministic in-memory daemon double for tests: scripted query
//! degradation, per-window move resistance (stubborn windows), and a
//! journal of every call in order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::common::config::Placement;
use crate::common::matcher::AppPattern;
use crate::sys::launcher::Launcher;
use crate::sys::wm::{
    Layout, RoutingRule, Space, SpaceIndex, Window, WindowId, WindowManager, WmError, WmResult,
};

#[derive(Default)]
struct FakeState {
    unreachable: bool,
    spaces: u32,
    windows: Vec<Window>,
    rules: BTreeMap<String, RoutingRule>,
    /// Direct moves ignored per window before they start taking effect.
    move_resistance: BTreeMap<WindowId, u32>,
    /// Upcoming `list_spaces` calls that return an empty result.
    degraded_space_queries: u32,
    journal: Vec<String>,
}

#[derive(Default)]
pub struct FakeWm {
    state: Mutex<FakeState>,
}

impl FakeWm {
    pub fn with_spaces(spaces: u32) -> FakeWm {
        let wm = FakeWm::default();
        wm.state.lock().unwrap().spaces = spaces;
        wm
    }

    pub fn add_window(&self, id: u32, app: &str, space: u32) {
        self.state.lock().unwrap().windows.push(Window {
            id: WindowId(id),
            app: app.to_string(),
            space: SpaceIndex::new(space),
        });
    }

    pub fn resist_moves(&self, id: WindowId, count: u32) {
        self.state.lock().unwrap().move_resistance.insert(id, count);
    }

    pub fn degrade_space_queries(&self, count: u32) {
        self.state.lock().unwrap().degraded_space_queries = count;
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    pub fn journal(&self) -> Vec<String> {
        self.state.lock().unwrap().journal.clone()
    }

    pub fn space_count(&self) -> u32 {
        self.state.lock().unwrap().spaces
    }

    pub fn window_space_of(&self, id: u32) -> Option<u32> {
        let state = self.state.lock().unwrap();
        let window = state.windows.iter().find(|w| w.id == WindowId(id))?;
        window.space.map(SpaceIndex::get)
    }

    pub fn rules(&self) -> Vec<RoutingRule> {
        self.state.lock().unwrap().rules.values().cloned().collect()
    }

    fn record(&self, entry: impl Into<String>) {
        self.state.lock().unwrap().journal.push(entry.into());
    }
}

impl WindowManager for FakeWm {
    fn ping(&self) -> WmResult<()> {
        self.record("ping");
        if self.state.lock().unwrap().unreachable {
            return Err(WmError::DaemonUnreachable("connection refused".to_string()));
        }
        Ok(())
    }

    fn list_windows(&self) -> WmResult<Vec<Window>> {
        self.record("query-windows");
        Ok(self.state.lock().unwrap().windows.clone())
    }

    fn list_spaces(&self) -> WmResult<Vec<Space>> {
        self.record("query-spaces");
        let mut state = self.state.lock().unwrap();
        if state.degraded_space_queries > 0 {
            state.degraded_space_queries -= 1;
            return Ok(Vec::new());
        }
        Ok((1..=state.spaces)
            .filter_map(SpaceIndex::new)
            .map(|index| Space { index })
            .collect())
    }

    fn window_space(&self, id: WindowId) -> WmResult<Option<SpaceIndex>> {
        self.record(format!("query-window {id}"));
        let state = self.state.lock().unwrap();
        Ok(state.windows.iter().find(|w| w.id == id).and_then(|w| w.space))
    }

    fn create_space(&self) -> WmResult<()> {
        self.record("create-space");
        self.state.lock().unwrap().spaces += 1;
        Ok(())
    }

    fn set_layout(&self, space: SpaceIndex, layout: Layout) -> WmResult<()> {
        self.record(format!("set-layout {space} {}", layout.as_str()));
        Ok(())
    }

    fn move_window(&self, id: WindowId, space: SpaceIndex) -> WmResult<()> {
        self.record(format!("move {id} {space}"));
        let mut state = self.state.lock().unwrap();
        if let Some(resistance) = state.move_resistance.get_mut(&id)
            && *resistance > 0
        {
            *resistance -= 1;
            return Ok(());
        }
        if let Some(window) = state.windows.iter_mut().find(|w| w.id == id) {
            window.space = Some(space);
        }
        Ok(())
    }

    fn move_window_adjacent(&self, id: WindowId) -> WmResult<()> {
        self.record(format!("move-adjacent {id}"));
        let mut state = self.state.lock().unwrap();
        if let Some(window) = state.windows.iter_mut().find(|w| w.id == id) {
            let next = window.space.map_or(1, |s| s.get() + 1);
            window.space = SpaceIndex::new(next);
        }
        Ok(())
    }

    fn add_rule(&self, rule: &RoutingRule) -> WmResult<()> {
        self.record(format!("add-rule {}", rule.label));
        self.state.lock().unwrap().rules.insert(rule.label.clone(), rule.clone());
        Ok(())
    }

    fn remove_rule(&self, label: &str) -> WmResult<()> {
        self.record(format!("remove-rule {label}"));
        self.state.lock().unwrap().rules.remove(label);
        Ok(())
    }

    fn focus_space(&self, space: SpaceIndex) -> WmResult<()> {
        self.record(format!("focus-space {space}"));
        Ok(())
    }

    fn focus_window(&self, id: WindowId) -> WmResult<()> {
        self.record(format!("focus-window {id}"));
        Ok(())
    }

    fn balance(&self, space: SpaceIndex) -> WmResult<()> {
        self.record(format!("balance {space}"));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    running: Mutex<Vec<String>>,
    launched: Mutex<Vec<String>>,
}

impl FakeLauncher {
    pub fn mark_running(&self, name: &str) {
        self.running.lock().unwrap().push(name.to_string());
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for FakeLauncher {
    fn is_running(&self, name: &str) -> bool {
        self.running.lock().unwrap().iter().any(|n| n == name)
    }

    fn launch(&self, name: &str) {
        self.launched.lock().unwrap().push(name.to_string());
    }
}

/// Placement literal for tests.
pub fn placement(app: &str, desktop: u32, stubborn: bool) -> Placement {
    Placement {
        pattern: AppPattern::parse(app).unwrap(),
        desktop: SpaceIndex::new(desktop).unwrap(),
        launch: None,
        stubborn,
    }
}
