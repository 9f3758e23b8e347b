//! Where each worker runs: CPU affinity and host name.
//!
//! Purely diagnostic; nothing here affects results.

use std::fmt;
use std::sync::OnceLock;

static HOSTNAME: OnceLock<String> = OnceLock::new();

/// Host name, cached after the first lookup.
pub fn hostname() -> &'static str {
    HOSTNAME.get_or_init(|| sys_info::hostname().unwrap_or_else(|_| "unknown".into()))
}

/// CPUs the calling thread may run on, formatted like `taskset` (`0-3,6`).
#[cfg(target_os = "linux")]
pub fn affinity() -> String {
    use nix::sched::{sched_getaffinity, CpuSet};
    use nix::unistd::Pid;

    match sched_getaffinity(Pid::from_raw(0)) {
        Ok(set) => {
            let cpus: Vec<usize> = (0..CpuSet::count())
                .filter(|&cpu| set.is_set(cpu).unwrap_or(false))
                .collect();
            format_cpu_list(&cpus)
        }
        Err(_) => "?".into(),
    }
}

/// CPUs the calling thread may run on (not available on this platform).
#[cfg(not(target_os = "linux"))]
pub fn affinity() -> String {
    "?".into()
}

/// Formats ascending CPU ids as ranges: runs of three or more collapse to
/// `a-b`, shorter runs are listed.
pub fn format_cpu_list(cpus: &[usize]) -> String {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < cpus.len() {
        let start = cpus[i];
        let mut run = 0;
        while i + run + 1 < cpus.len() && cpus[i + run + 1] == start + run + 1 {
            run += 1;
        }
        match run {
            0 => parts.push(start.to_string()),
            1 => {
                parts.push(start.to_string());
                parts.push((start + 1).to_string());
            }
            _ => parts.push(format!("{}-{}", start, start + run)),
        }
        i += run + 1;
    }
    parts.join(",")
}

/// One worker's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub rank: usize,
    pub procs: usize,
    pub thread: usize,
    pub threads: usize,
    pub cores: String,
    pub host: String,
}

impl Placement {
    /// Location of the calling thread.
    pub fn current(rank: usize, procs: usize, thread: usize, threads: usize) -> Self {
        Self {
            rank,
            procs,
            thread,
            threads,
            cores: affinity(),
            host: hostname().to_owned(),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.procs > 1, self.threads > 1) {
            (true, true) => write!(
                f,
                "Rank {} / thread {} on core {} of node <{}>",
                self.rank, self.thread, self.cores, self.host
            ),
            (true, false) => write!(f, "Rank {} on core {} of node <{}>", self.rank, self.cores, self.host),
            (false, true) => write!(f, "Thread {} on core {}", self.thread, self.cores),
            (false, false) => write!(f, "Program on core {}", self.cores),
        }
    }
}
