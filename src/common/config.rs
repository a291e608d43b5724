//! Static run configuration: the app→desktop placement table plus the
//! timing knobs the reconciler polls and retries with. Everything here is
//! immutable for a run; no state is written back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::common::matcher::AppPattern;
use crate::sys::wm::{Layout, SpaceIndex};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    /// Total desktop count. Defaults to the highest configured target.
    desktops: Option<u32>,
    #[serde(default = "default_home")]
    home_desktop: u32,
    /// Pattern of the app whose window is brought forward at the end.
    highlight: Option<String>,
    #[serde(default)]
    layout: Layout,
    /// Control binary of the window-management daemon.
    wm_binary: Option<String>,
    #[serde(default)]
    timing: TimingFile,
    #[serde(default, rename = "placement")]
    placements: Vec<PlacementFile>,
}

fn default_home() -> u32 { 1 }

#[derive(Debug, Deserialize)]
struct PlacementFile {
    app: String,
    desktop: u32,
    /// Launch target when the app's display name is not its process name,
    /// or when `app` is a regex.
    launch: Option<String>,
    /// Opt into the adjacent-hop escalation when the direct move does not
    /// take effect.
    #[serde(default)]
    stubborn: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TimingFile {
    poll_interval_ms: u64,
    discovery_timeout_ms: u64,
    settle_delay_ms: u64,
    escalation_ceiling: u32,
    escalation_delay_ms: u64,
}

impl Default for TimingFile {
    fn default() -> Self {
        TimingFile {
            poll_interval_ms: 250,
            discovery_timeout_ms: 5000,
            settle_delay_ms: 300,
            escalation_ceiling: 10,
            escalation_delay_ms: 200,
        }
    }
}

/// Validated timing parameters, as durations.
#[derive(Clone, Copy, Debug)]
pub struct Timing {
    pub poll_interval: Duration,
    pub discovery_timeout: Duration,
    /// Pause after each desktop creation so the daemon catches up.
    pub settle_delay: Duration,
    pub escalation_ceiling: u32,
    pub escalation_delay: Duration,
}

#[cfg(test)]
impl Timing {
    /// Zero delays and a small ceiling, so tests never sleep.
    pub fn instant() -> Timing {
        Timing {
            poll_interval: Duration::ZERO,
            discovery_timeout: Duration::ZERO,
            settle_delay: Duration::ZERO,
            escalation_ceiling: 10,
            escalation_delay: Duration::ZERO,
        }
    }
}

impl From<TimingFile> for Timing {
    fn from(t: TimingFile) -> Timing {
        Timing {
            poll_interval: Duration::from_millis(t.poll_interval_ms),
            discovery_timeout: Duration::from_millis(t.discovery_timeout_ms),
            settle_delay: Duration::from_millis(t.settle_delay_ms),
            escalation_ceiling: t.escalation_ceiling,
            escalation_delay: Duration::from_millis(t.escalation_delay_ms),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Placement {
    pub pattern: AppPattern,
    pub desktop: SpaceIndex,
    pub launch: Option<String>,
    pub stubborn: bool,
}

impl Placement {
    pub fn launch_name(&self) -> Option<&str> {
        self.launch.as_deref().or_else(|| self.pattern.launch_name())
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub desktops: u32,
    pub home: SpaceIndex,
    pub highlight: Option<AppPattern>,
    pub layout: Layout,
    pub wm_binary: Option<String>,
    pub timing: Timing,
    pub placements: Vec<Placement>,
}

impl Settings {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("settle")
            .join("settle.toml")
    }

    pub fn load(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Settings::parse(&text).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Settings> {
        let file: ConfigFile = toml::from_str(text).context("parsing TOML")?;
        if file.placements.is_empty() {
            bail!("config defines no [[placement]] entries");
        }

        let mut placements = Vec::with_capacity(file.placements.len());
        let mut slugs = Vec::new();
        for p in &file.placements {
            let pattern = AppPattern::parse(&p.app)
                .with_context(|| format!("placement app pattern {:?}", p.app))?;
            let Some(desktop) = SpaceIndex::new(p.desktop) else {
                bail!("placement {:?} targets desktop {}, must be >= 1", p.app, p.desktop);
            };
            let slug = pattern.slug();
            if slug.is_empty() {
                bail!("placement app pattern {:?} yields an empty rule label", p.app);
            }
            if slugs.contains(&slug) {
                bail!("placement app pattern {:?} duplicates rule label {:?}", p.app, slug);
            }
            slugs.push(slug);
            placements.push(Placement {
                pattern,
                desktop,
                launch: p.launch.clone(),
                stubborn: p.stubborn,
            });
        }

        let max_target = placements.iter().map(|p| p.desktop.get()).max().unwrap_or(1);
        let desktops = file.desktops.unwrap_or(max_target);
        if desktops < max_target {
            bail!("desktops = {desktops} is below the highest placement target {max_target}");
        }
        let Some(home) = SpaceIndex::new(file.home_desktop) else {
            bail!("home_desktop must be >= 1");
        };
        if home.get() > desktops {
            bail!("home_desktop = {home} exceeds desktop count {desktops}");
        }
        let highlight = match &file.highlight {
            Some(raw) => Some(
                AppPattern::parse(raw).with_context(|| format!("highlight pattern {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Settings {
            desktops,
            home,
            highlight,
            layout: file.layout,
            wm_binary: file.wm_binary,
            timing: file.timing.into(),
            placements,
        })
    }
}
