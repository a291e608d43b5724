//! Routing-rule registration: the persistent daemon-side policy that
//! routes future windows of a matching application to its desktop, so the
//! system self-heals after this run exits.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::common::config::Placement;
use crate::common::matcher::AppPattern;
use crate::sys::wm::{RoutingRule, WindowManager};

/// Stable rule label for a pattern. Label identity is the unit of
/// idempotent replace in the daemon's rule table.
pub fn rule_label(pattern: &AppPattern) -> String {
    format!("settle.{}", pattern.slug())
}

pub fn routing_rule(placement: &Placement) -> RoutingRule {
    RoutingRule {
        label: rule_label(&placement.pattern),
        app_pattern: placement.pattern.daemon_pattern(),
        space: placement.desktop,
        managed: true,
    }
}

pub struct RuleRegistrar {
    wm: Arc<dyn WindowManager>,
}

impl RuleRegistrar {
    pub fn new(wm: Arc<dyn WindowManager>) -> RuleRegistrar {
        RuleRegistrar { wm }
    }

    /// Remove-then-add under the pattern's label. Removal of a missing
    /// label is the expected case on first run and is not an error.
    pub fn upsert_rule(&self, placement: &Placement) {
        let rule = routing_rule(placement);
        if let Err(e) = self.wm.remove_rule(&rule.label) {
            debug!("removing rule {} before replace: {e}", rule.label);
        }
        match self.wm.add_rule(&rule) {
            Ok(()) => debug!("rule {} routes {} to desktop {}", rule.label, rule.app_pattern, rule.space),
            Err(e) => warn!("rule {} not registered: {e}", rule.label),
        }
    }

    /// Order-independent across placements. Returns how many upserts were
    /// attempted, for the run summary.
    pub fn register_all(&self, placements: &[Placement]) -> usize {
        for placement in placements {
            self.upsert_rule(placement);
        }
        placements.len()
    }
}
