//! Production [`WindowManager`] backed by the daemon's control binary,
//! yabai-style: `<bin> -m query --windows`, `<bin> -m window <id> --space <n>`
//! and friends. Argument vectors are built by pure functions so the wire
//! surface is testable without spawning anything.

use std::process::Command;

use tracing::{debug, info, warn};

use crate::sys::wm::{
    Layout, RoutingRule, Space, SpaceIndex, Window, WindowId, WindowManager, WmError, WmResult,
    decode_spaces, decode_window_space, decode_windows,
};

pub struct Yabai {
    binary: String,
    dry_run: bool,
}

impl Yabai {
    pub fn new(binary: impl Into<String>, dry_run: bool) -> Yabai {
        Yabai { binary: binary.into(), dry_run }
    }

    /// Run a read. Spawn failure is an error; a non-zero exit degrades to
    /// "no output" because the daemon may be mid-state-transition.
    fn query(&self, verb: &'static str, args: Vec<String>) -> WmResult<Option<String>> {
        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| WmError::QueryFailed { verb, reason: e.to_string() })?;
        if !output.status.success() {
            warn!(
                verb,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "query returned an error, treating result as empty"
            );
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    /// Run a write. Spawn failure is an error; a daemon-level refusal (for
    /// example "window already on that space") is a no-op, not a failure.
    fn command(&self, verb: &'static str, args: Vec<String>) -> WmResult<()> {
        if self.dry_run {
            info!("dry-run: {} {}", self.binary, args.join(" "));
            return Ok(());
        }
        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| WmError::CommandFailed { verb, reason: e.to_string() })?;
        if !output.status.success() {
            debug!(
                verb,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "command reported failure, treating as no-op"
            );
        }
        Ok(())
    }
}

impl WindowManager for Yabai {
    fn ping(&self) -> WmResult<()> {
        let output = Command::new(&self.binary)
            .args(query_spaces_args())
            .output()
            .map_err(|e| WmError::DaemonUnreachable(e.to_string()))?;
        if !output.status.success() {
            return Err(WmError::DaemonUnreachable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    fn list_windows(&self) -> WmResult<Vec<Window>> {
        let Some(json) = self.query("list-windows", query_windows_args())? else {
            return Ok(Vec::new());
        };
        Ok(decode_windows(&json).unwrap_or_else(|| {
            warn!("unparseable window list, treating as empty");
            Vec::new()
        }))
    }

    fn list_spaces(&self) -> WmResult<Vec<Space>> {
        let Some(json) = self.query("list-spaces", query_spaces_args())? else {
            return Ok(Vec::new());
        };
        Ok(decode_spaces(&json).unwrap_or_else(|| {
            warn!("unparseable space list, treating as empty");
            Vec::new()
        }))
    }

    fn window_space(&self, id: WindowId) -> WmResult<Option<SpaceIndex>> {
        let Some(json) = self.query("window-space", query_window_args(id))? else {
            return Ok(None);
        };
        Ok(decode_window_space(&json))
    }

    fn create_space(&self) -> WmResult<()> {
        self.command("create-space", create_space_args())
    }

    fn set_layout(&self, space: SpaceIndex, layout: Layout) -> WmResult<()> {
        self.command("set-layout", set_layout_args(space, layout))
    }

    fn move_window(&self, id: WindowId, space: SpaceIndex) -> WmResult<()> {
        self.command("move-window", move_window_args(id, space))
    }

    fn move_window_adjacent(&self, id: WindowId) -> WmResult<()> {
        self.command("move-window-adjacent", move_window_adjacent_args(id))
    }

    fn add_rule(&self, rule: &RoutingRule) -> WmResult<()> {
        self.command("add-rule", add_rule_args(rule))
    }

    fn remove_rule(&self, label: &str) -> WmResult<()> {
        self.command("remove-rule", remove_rule_args(label))
    }

    fn focus_space(&self, space: SpaceIndex) -> WmResult<()> {
        self.command("focus-space", focus_space_args(space))
    }

    fn focus_window(&self, id: WindowId) -> WmResult<()> {
        self.command("focus-window", focus_window_args(id))
    }

    fn balance(&self, space: SpaceIndex) -> WmResult<()> {
        self.command("balance", balance_args(space))
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn query_windows_args() -> Vec<String> {
    args(&["-m", "query", "--windows"])
}

fn query_spaces_args() -> Vec<String> {
    args(&["-m", "query", "--spaces"])
}

fn query_window_args(id: WindowId) -> Vec<String> {
    args(&["-m", "query", "--windows", "--window", &id.to_string()])
}

fn create_space_args() -> Vec<String> {
    args(&["-m", "space", "--create"])
}

fn set_layout_args(space: SpaceIndex, layout: Layout) -> Vec<String> {
    args(&["-m", "space", &space.to_string(), "--layout", layout.as_str()])
}

fn move_window_args(id: WindowId, space: SpaceIndex) -> Vec<String> {
    args(&["-m", "window", &id.to_string(), "--space", &space.to_string()])
}

fn move_window_adjacent_args(id: WindowId) -> Vec<String> {
    args(&["-m", "window", &id.to_string(), "--space", "next"])
}

fn add_rule_args(rule: &RoutingRule) -> Vec<String> {
    args(&[
        "-m",
        "rule",
        "--add",
        &format!("label={}", rule.label),
        &format!("app={}", rule.app_pattern),
        &format!("space={}", rule.space),
        if rule.managed { "manage=on" } else { "manage=off" },
    ])
}

fn remove_rule_args(label: &str) -> Vec<String> {
    args(&["-m", "rule", "--remove", label])
}

fn focus_space_args(space: SpaceIndex) -> Vec<String> {
    args(&["-m", "space", "--focus", &space.to_string()])
}

fn focus_window_args(id: WindowId) -> Vec<String> {
    args(&["-m", "window", "--focus", &id.to_string()])
}

fn balance_args(space: SpaceIndex) -> Vec<String> {
    args(&["-m", "space", &space.to_string(), "--balance"])
}
