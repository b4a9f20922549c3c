//! Execution engine for gcpboot
//!
//! The engine orchestrates:
//! 1. Planning - Build the ordered resource list from config
//! 2. Diffing - Compute current vs desired state
//! 3. Executing - Apply changes in order, halting on structural failures

pub mod differ;
pub mod executor;
pub mod planner;

pub use differ::display_diff;
pub use executor::{TerminalProgress, print_summary};
pub use planner::build_plan;
