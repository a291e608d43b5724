//! Typed seam over the window-management daemon.
//!
//! The daemon is a black box driven through its control tool: writes are
//! fire-and-forget (a daemon-level no-op is success) and reads reflect
//! eventually-consistent state, so callers poll rather than trust a single
//! snapshot.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// 1-based index of a virtual desktop. The daemon keeps these dense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpaceIndex(u32);

impl SpaceIndex {
    pub fn new(index: u32) -> Option<SpaceIndex> {
        (index >= 1).then_some(SpaceIndex(index))
    }

    pub fn get(self) -> u32 { self.0 }
}

impl fmt::Display for SpaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Daemon-assigned window identifier. Valid only while the window exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    pub id: WindowId,
    pub app: String,
    pub space: Option<SpaceIndex>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Space {
    pub index: SpaceIndex,
}

/// Tiling layout applied per desktop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Bsp,
    Stack,
    Float,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Bsp => "bsp",
            Layout::Stack => "stack",
            Layout::Float => "float",
        }
    }
}

/// A persistent daemon-side routing rule. Label identity is the unit of
/// idempotent replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingRule {
    pub label: String,
    pub app_pattern: String,
    pub space: SpaceIndex,
    pub managed: bool,
}

#[derive(Debug, Error)]
pub enum WmError {
    #[error("window manager daemon is unreachable: {0}")]
    DaemonUnreachable(String),
    #[error("query `{verb}` failed: {reason}")]
    QueryFailed { verb: &'static str, reason: String },
    #[error("command `{verb}` was not accepted: {reason}")]
    CommandFailed { verb: &'static str, reason: String },
}

pub type WmResult<T> = Result<T, WmError>;

/// Operations the reconciler needs from the daemon. One production
/// implementation shells out to the control binary; tests substitute an
/// in-memory double with scripted races.
pub trait WindowManager: Send + Sync {
    /// Cheap liveness probe, used exactly once at startup. This is the only
    /// call whose failure aborts a run.
    fn ping(&self) -> WmResult<()>;

    fn list_windows(&self) -> WmResult<Vec<Window>>;
    fn list_spaces(&self) -> WmResult<Vec<Space>>;
    /// Fresh read of one window's desktop, for re-checks after a move.
    fn window_space(&self, id: WindowId) -> WmResult<Option<SpaceIndex>>;

    fn create_space(&self) -> WmResult<()>;
    fn set_layout(&self, space: SpaceIndex, layout: Layout) -> WmResult<()>;
    fn move_window(&self, id: WindowId, space: SpaceIndex) -> WmResult<()>;
    /// One hop toward the next desktop, for the escalation path.
    fn move_window_adjacent(&self, id: WindowId) -> WmResult<()>;
    fn add_rule(&self, rule: &RoutingRule) -> WmResult<()>;
    fn remove_rule(&self, label: &str) -> WmResult<()>;
    fn focus_space(&self, space: SpaceIndex) -> WmResult<()>;
    fn focus_window(&self, id: WindowId) -> WmResult<()>;
    fn balance(&self, space: SpaceIndex) -> WmResult<()>;
}

// Raw query shapes. The daemon emits more fields than these; unknown fields
// are ignored and malformed entries dropped, because a query can race a
// state transition and return half-built records.

#[derive(Debug, Default, Deserialize)]
struct RawWindow {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    app: String,
    #[serde(default)]
    space: u32,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpace {
    #[serde(default)]
    index: u32,
}

pub(crate) fn decode_windows(json: &str) -> Option<Vec<Window>> {
    let raw: Vec<RawWindow> = serde_json::from_str(json).ok()?;
    Some(
        raw.into_iter()
            .filter(|w| w.id != 0 && !w.app.is_empty())
            .map(|w| Window {
                id: WindowId(w.id),
                app: w.app,
                space: SpaceIndex::new(w.space),
            })
            .collect(),
    )
}

pub(crate) fn decode_spaces(json: &str) -> Option<Vec<Space>> {
    let raw: Vec<RawSpace> = serde_json::from_str(json).ok()?;
    Some(
        raw.into_iter()
            .filter_map(|s| SpaceIndex::new(s.index))
            .map(|index| Space { index })
            .collect(),
    )
}

pub(crate) fn decode_window_space(json: &str) -> Option<SpaceIndex> {
    let raw: RawWindow = serde_json::from_str(json).ok()?;
    SpaceIndex::new(raw.space)
}
