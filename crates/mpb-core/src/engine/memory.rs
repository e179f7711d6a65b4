//! Memory-aware throttling for parallel benchmark runs.
//!
//! Some planners are memory-hungry (and at least one leaks); running a dozen
//! binaries at once can take the machine down. Each child gets an
//! address-space rlimit sized as a fraction of the memory available when the
//! pool starts, so a runaway planner dies with an allocation failure instead
//! of triggering the OOM killer on its siblings.

use sysinfo::System;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLimit {
    pub bytes: u64,
}

impl MemoryLimit {
    /// Fraction of available memory granted to each parallel benchmark:
    /// `min(0.9, 5 / cpu_count)`.
    pub fn default_fraction() -> f64 {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (5.0 / cpus as f64).min(0.9)
    }

    pub fn fraction_of_available(fraction: f64) -> Self {
        Self {
            bytes: (available_memory_bytes() as f64 * fraction) as u64,
        }
    }

    pub fn gigabytes(self) -> f64 {
        self.bytes as f64 / 1e9
    }
}

/// Memory currently available for new processes, in bytes.
pub fn available_memory_bytes() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.available_memory()
}

/// Install the rlimit in the child between fork and exec.
#[cfg(unix)]
pub(crate) fn limit_address_space(cmd: &mut tokio::process::Command, limit: MemoryLimit) {
    let bytes = limit.bytes;
    // Safety: setrlimit is async-signal-safe and the closure touches nothing
    // else; required by the pre_exec contract.
    #[allow(unsafe_code)]
    unsafe {
        cmd.pre_exec(move || {
            let lim = libc::rlimit {
                rlim_cur: bytes as libc::rlim_t,
                rlim_max: bytes as libc::rlim_t,
            };
            if libc::setrlimit(libc::RLIMIT_AS, &lim) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub(crate) fn limit_address_space(_cmd: &mut tokio::process::Command, _limit: MemoryLimit) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fraction_is_bounded() {
        let f = MemoryLimit::default_fraction();
        assert!(f > 0.0);
        assert!(f <= 0.9);
    }

    #[test]
    fn available_memory_is_nonzero() {
        assert!(available_memory_bytes() > 0);
    }

    #[test]
    fn fraction_scales_available_memory() {
        let half = MemoryLimit::fraction_of_available(0.5);
        assert!(half.bytes > 0);
        assert!(half.bytes <= available_memory_bytes());
    }
}
