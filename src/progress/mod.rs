// Live progress extraction from the media tool's diagnostic stream
//
// - Parser: marker patterns, line -> optional sample
// - Monitor: per-job state and observer delivery
// - Bar: terminal rendering

pub mod bar;
pub mod monitor;
pub mod parser;

pub use bar::*;
pub use monitor::*;
pub use parser::{ProgressSample, format_eta, round2};
