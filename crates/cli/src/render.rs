//! Text rendering for gate results. JSON output goes through serde on the
//! engine's own types.

use optwatch_core::gate::GateReport;
use optwatch_engine::ApplyOutcome;

pub fn gate_text(change_id: &str, report: &GateReport) -> String {
    let verdict = if report.ok { "OK" } else { "BLOCKED" };
    let mut lines = vec![format!("verify {}: {}", change_id, verdict)];
    push_items(&mut lines, "failures", &report.failures);
    push_items(&mut lines, "warnings", &report.warnings);
    lines.join("\n")
}

pub fn apply_text(outcome: &ApplyOutcome) -> String {
    let verdict = if outcome.applied {
        "VERIFIED"
    } else if outcome.ok {
        "OK"
    } else {
        "BLOCKED"
    };
    let mut lines = vec![format!("verify {}: {}", outcome.change_id, verdict)];
    if outcome.applied {
        lines.push(format!("  change record: {}", outcome.change_path));
    }
    push_items(&mut lines, "failures", &outcome.failures);
    push_items(&mut lines, "warnings", &outcome.warnings);
    lines.join("\n")
}

fn push_items(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("{}:", heading));
    for item in items {
        lines.push(format!("  - {}", item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_report_lists_failures() {
        let report = GateReport::failure("insufficient monitor ticks: have 1 need 3");
        let text = gate_text("chg-x", &report);
        assert!(text.contains("chg-x: BLOCKED"));
        assert!(text.contains("  - insufficient monitor ticks"));
    }

    #[test]
    fn clean_report_is_one_line() {
        let report = GateReport {
            ok: true,
            failures: Vec::new(),
            warnings: Vec::new(),
        };
        assert_eq!(gate_text("chg-x", &report), "verify chg-x: OK");
    }
}
