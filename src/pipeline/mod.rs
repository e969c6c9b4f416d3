//! Pipeline entry points for monitor operations.
//!
//! - `run_monitor`: poll and publish until shutdown
//! - `run_cycle`: a single poll + publish
//! - `run_report`: poll and fire the report event
//! - `run_validate`: check the configuration

pub mod diagnostics;
pub mod export;
pub mod poll;
pub mod report;
pub mod run;
pub mod throttle;
pub mod validate;

pub use export::{ExportDocument, ExportFormat};
pub use poll::{Monitor, PollOutcome};
pub use report::{build_report, run_report};
pub use run::{run_cycle, run_monitor};
pub use throttle::Throttle;
pub use validate::run_validate;
