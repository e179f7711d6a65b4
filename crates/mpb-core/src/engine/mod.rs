pub mod benchmark;
pub mod child;
pub mod memory;
pub mod pool;

pub use benchmark::{Benchmark, BinaryLocation, ExitOutcome, RunOptions, RunOutcome};
pub use child::{KillMode, STATS_MARKER};
pub use memory::MemoryLimit;
pub use pool::{Pool, PoolOptions, PoolSummary};
