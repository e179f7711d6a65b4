//! Exit codes of the `mpb` binary. Part of the CLI contract: scripts key off
//! these to tell benchmark failures from setup mistakes.

pub const SUCCESS: i32 = 0;
/// At least one benchmark invocation failed, timed out or could not spawn.
pub const BENCHMARK_FAILED: i32 = 1;
/// Bad config/setup input or an internal error before any benchmark ran.
pub const CONFIG_ERROR: i32 = 2;
