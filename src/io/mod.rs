//! Input/output: logging setup, result files and the run report.

mod output;
mod report;

pub use output::{setup_output, write_results, write_xyz};
pub use report::report_summary;
