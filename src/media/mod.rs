// Media tool invocation planning
//
// - Mode: the closed set of subtitle embedding strategies
// - Commands: argument plan builder
// - Planner: mode + paths -> argument plan

pub mod commands;
pub mod mode;
pub mod planner;

pub use commands::*;
pub use mode::*;
pub use planner::*;
