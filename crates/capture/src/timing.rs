//! Command timing: sequential runs, mean and nearest-rank p95.

use std::path::Path;
use std::time::Duration;

use optwatch_core::snapshot::{p95_nearest_rank, round4};
use optwatch_core::text::truncate_chars;
use optwatch_core::{TimingRecord, TimingSpec};

use crate::runner::{run_command, TIMEOUT_EXIT_CODE};

const ERROR_EXCERPT_CAP: usize = 400;

/// Time one command over `max(1, runs)` sequential runs. A failed or
/// timed-out run still contributes a sample (a timeout contributes the
/// full timeout as its elapsed time); failures surface as the last run's
/// exit code and stderr excerpt, never as an abort.
pub fn time_command(spec: &TimingSpec, cwd: &Path) -> TimingRecord {
    let runs = spec.runs.max(1);
    let timeout = Duration::from_secs(spec.timeout_seconds);

    let mut samples: Vec<f64> = Vec::with_capacity(runs as usize);
    let mut last_exit_code = 0;
    let mut last_error_excerpt = String::new();

    for _ in 0..runs {
        let out = run_command(&spec.command, cwd, timeout);
        if out.timed_out {
            last_exit_code = TIMEOUT_EXIT_CODE;
            last_error_excerpt = "timeout".to_string();
            samples.push(spec.timeout_seconds as f64);
        } else {
            last_exit_code = out.exit_code;
            last_error_excerpt = truncate_chars(out.stderr.trim(), ERROR_EXCERPT_CAP);
            samples.push(out.elapsed.as_secs_f64());
        }
    }

    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let p95 = p95_nearest_rank(&samples);

    TimingRecord {
        name: spec.name.clone(),
        command: spec.command.clone(),
        runs,
        timeout_seconds: spec.timeout_seconds,
        last_exit_code,
        last_error_excerpt,
        mean_seconds: round4(mean),
        p95_seconds: round4(p95),
        all_run_seconds: samples.into_iter().map(round4).collect(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spec(name: &str, command: &str, runs: u32, timeout_seconds: u64) -> TimingSpec {
        TimingSpec {
            name: name.to_string(),
            command: command.to_string(),
            runs,
            timeout_seconds,
        }
    }

    #[test]
    fn single_run_p95_equals_the_sample() {
        let record = time_command(&spec("t", "true", 1, 30), &std::env::temp_dir());
        assert_eq!(record.runs, 1);
        assert_eq!(record.all_run_seconds.len(), 1);
        assert_eq!(record.p95_seconds, record.all_run_seconds[0]);
        assert_eq!(record.last_exit_code, 0);
    }

    #[test]
    fn failing_run_surfaces_exit_code_and_excerpt() {
        let record = time_command(
            &spec("t", "echo broken >&2; exit 7", 2, 30),
            &std::env::temp_dir(),
        );
        assert_eq!(record.last_exit_code, 7);
        assert_eq!(record.last_error_excerpt, "broken");
        assert_eq!(record.all_run_seconds.len(), 2);
    }

    #[test]
    fn timed_out_run_contributes_the_timeout_as_sample() {
        let record = time_command(&spec("t", "sleep 30", 1, 1), &std::env::temp_dir());
        assert_eq!(record.last_exit_code, TIMEOUT_EXIT_CODE);
        assert_eq!(record.last_error_excerpt, "timeout");
        assert_eq!(record.all_run_seconds, vec![1.0]);
    }

    #[test]
    fn zero_runs_is_clamped_to_one() {
        let record = time_command(&spec("t", "true", 0, 30), &std::env::temp_dir());
        assert_eq!(record.runs, 1);
        assert_eq!(record.all_run_seconds.len(), 1);
    }

    #[test]
    fn samples_are_sorted() {
        let record = time_command(
            &spec("t", "sleep 0.01", 3, 30),
            &std::env::temp_dir(),
        );
        let mut sorted = record.all_run_seconds.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(record.all_run_seconds, sorted);
    }
}
