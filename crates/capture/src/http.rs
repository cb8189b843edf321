//! HTTP health probes.

use std::io::Read;
use std::time::Duration;

use optwatch_core::text::truncate_chars;
use optwatch_core::{HttpProbeResult, HttpProbeSpec};

/// Bounded body read: the first bytes are enough for a substring check.
const BODY_CAP: u64 = 3000;

const ERROR_CAP: usize = 300;

/// Probe a URL. Success is "body contains the expected substring" when one
/// is configured, otherwise a status in [200, 400). Transport errors are
/// captured into `error` with `ok=false`; this function never fails.
pub fn probe(spec: &HttpProbeSpec) -> HttpProbeResult {
    let mut result = HttpProbeResult {
        url: spec.url.clone(),
        timeout_seconds: spec.timeout_seconds,
        ok: false,
        status_code: None,
        error: String::new(),
    };

    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(spec.timeout_seconds.max(1))))
        // A 500 is a probe observation, not a transport failure.
        .http_status_as_error(false)
        .build()
        .new_agent();

    match agent.get(&spec.url).call() {
        Ok(mut response) => {
            let status = response.status().as_u16();
            result.status_code = Some(status);

            let mut body = Vec::new();
            let _ = response
                .body_mut()
                .as_reader()
                .take(BODY_CAP)
                .read_to_end(&mut body);
            let body = String::from_utf8_lossy(&body);

            result.ok = probe_ok(&spec.expect_contains, status, &body);
        }
        Err(e) => {
            result.error = truncate_chars(&e.to_string(), ERROR_CAP);
        }
    }

    result
}

/// Success rule for one probe response. The expectation is trimmed before
/// use: a whitespace-only expectation means "no expectation" and falls
/// back to the status check.
fn probe_ok(expect_contains: &str, status: u16, body: &str) -> bool {
    let expected = expect_contains.trim();
    if expected.is_empty() {
        (200..400).contains(&status)
    } else {
        body.contains(expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_data_not_error() {
        let result = probe(&HttpProbeSpec {
            // Port 9 (discard) is not listening in any sane test env.
            url: "http://127.0.0.1:9/health".to_string(),
            expect_contains: String::new(),
            timeout_seconds: 2,
        });
        assert!(!result.ok);
        assert_eq!(result.status_code, None);
        assert!(!result.error.is_empty());
        assert!(result.error.chars().count() <= 300);
    }

    #[test]
    fn whitespace_only_expectation_falls_back_to_the_status_check() {
        assert!(probe_ok("  ", 200, "anything"));
        assert!(probe_ok("  ", 301, ""));
        assert!(!probe_ok("  ", 500, "anything"));
        assert!(!probe_ok("", 404, "anything"));
    }

    #[test]
    fn expectation_is_trimmed_before_matching() {
        assert!(probe_ok("  ok  ", 500, "status: ok"));
        assert!(!probe_ok("  ok  ", 200, "status: down"));
    }

    #[test]
    fn malformed_url_is_data_not_error() {
        let result = probe(&HttpProbeSpec {
            url: "not a url".to_string(),
            expect_contains: String::new(),
            timeout_seconds: 2,
        });
        assert!(!result.ok);
        assert!(!result.error.is_empty());
    }
}
