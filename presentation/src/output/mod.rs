//! Console output: live conversation and analysis reports

pub mod console;
pub mod report;
