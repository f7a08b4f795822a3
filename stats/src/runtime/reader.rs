use std::time::Duration;

use tracing::debug;

/// A point-in-time reading of process runtime statistics.
///
/// Every field a platform cannot provide is left as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Number of live threads in the process.
    pub threads: Option<u64>,
    /// Resident set size, in bytes.
    pub resident_bytes: Option<u64>,
    /// Virtual memory size, in bytes.
    pub virtual_bytes: Option<u64>,
    /// Size of the data segment, which holds the heap, in bytes.
    pub heap_bytes: Option<u64>,
    /// Cumulative time spent paused for garbage collection since the process started.
    pub gc_pause_total: Duration,
}

/// A source of [`RuntimeStats`] readings.
pub trait RuntimeStatsReader: Send + Sync {
    /// Takes a reading.
    fn read(&self) -> RuntimeStats;
}

/// Reads runtime statistics for the current process from the operating system.
///
/// On Linux, readings come from `/proc/self/status`. Elsewhere, every reading is empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessStatsReader;

#[cfg(target_os = "linux")]
const PROC_STATUS_PATH: &str = "/proc/self/status";

impl RuntimeStatsReader for ProcessStatsReader {
    #[cfg(target_os = "linux")]
    fn read(&self) -> RuntimeStats {
        match std::fs::read_to_string(PROC_STATUS_PATH) {
            Ok(contents) => parse_status(&contents),
            Err(e) => {
                debug!(error = %e, "Could not read process status from {PROC_STATUS_PATH}.");
                RuntimeStats::default()
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn read(&self) -> RuntimeStats {
        debug!("Process runtime statistics are not available on this platform.");
        RuntimeStats::default()
    }
}

/// Parses the contents of a `/proc/<pid>/status` file.
///
/// Memory sizes are reported by the kernel in kibibytes and converted to bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn parse_status(contents: &str) -> RuntimeStats {
    let mut stats = RuntimeStats::default();

    for line in contents.lines() {
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };

        match field {
            "Threads" => stats.threads = parse_count(value),
            "VmRSS" => stats.resident_bytes = parse_kib(value),
            "VmSize" => stats.virtual_bytes = parse_kib(value),
            "VmData" => stats.heap_bytes = parse_kib(value),
            _ => {}
        }
    }

    if stats.threads.is_none() {
        debug!("Could not find a thread count in process status.");
    }

    stats
}

fn parse_count(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_kib(value: &str) -> Option<u64> {
    let kib = value.trim().strip_suffix("kB")?.trim_end().parse::<u64>().ok()?;
    kib.checked_mul(1024)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{parse_status, RuntimeStats};

    const STATUS: &str = "Name:\tstats\n\
        State:\tS (sleeping)\n\
        VmPeak:\t   20480 kB\n\
        VmSize:\t   16384 kB\n\
        VmRSS:\t    2048 kB\n\
        VmData:\t    1024 kB\n\
        Threads:\t4\n";

    #[test]
    fn parses_known_fields() {
        let stats = parse_status(STATUS);
        assert_eq!(
            stats,
            RuntimeStats {
                threads: Some(4),
                resident_bytes: Some(2048 * 1024),
                virtual_bytes: Some(16384 * 1024),
                heap_bytes: Some(1024 * 1024),
                gc_pause_total: Duration::ZERO,
            }
        );
    }

    #[test]
    fn skips_missing_and_malformed_fields() {
        let stats = parse_status("Threads:\tmany\nVmRSS:\t12 MB\nbogus line\n");
        assert_eq!(stats, RuntimeStats::default());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn reads_current_process() {
        use super::{ProcessStatsReader, RuntimeStatsReader};

        let stats = ProcessStatsReader.read();
        assert!(stats.threads.unwrap_or_default() >= 1);
        assert!(stats.resident_bytes.is_some());
    }
}
