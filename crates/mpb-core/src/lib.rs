//! Orchestration core for the motion-planning benchmark binary.
//!
//! The benchmark binary itself is a black box: it takes a JSON config file,
//! plans with the planners enabled in that config and appends its results to a
//! JSON log file. Everything in this crate exists around that contract:
//! building config documents ([`settings`]), supervising the binary per
//! planner with progress tailing and timeout kills ([`engine`]), merging the
//! per-planner result fragments it leaves behind ([`results`]) and fanning
//! whole benchmark sets out over a bounded pool ([`engine::pool`]).

pub mod engine;
pub mod errors;
pub mod fs;
pub mod report;
pub mod results;
pub mod settings;

pub use engine::benchmark::{Benchmark, BinaryLocation, ExitOutcome, RunOptions, RunOutcome};
pub use engine::pool::{Pool, PoolOptions, PoolSummary};
pub use errors::MpbError;
pub use results::ResultsDoc;
pub use settings::Settings;
