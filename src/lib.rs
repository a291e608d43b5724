//! One-shot window-placement reconciler. Drives an external tiling
//! window-manager daemon through its control CLI: ensures desktops exist,
//! registers persistent routing rules, launches missing applications, and
//! moves windows onto their configured desktops, tolerating the daemon's
//! eventually-consistent state with bounded polling and retries.

pub mod common;
pub mod reconcile;
pub mod sys;
