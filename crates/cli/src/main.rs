mod config;
mod render;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use optwatch_capture::capture;
use optwatch_core::diff::compare;
use optwatch_core::{ChangeDraft, Policy};
use optwatch_engine::{apply_verified, start_monitor, tick_monitor, verify_change, TickOutcome};
use optwatch_store::layout::DEFAULT_STATE_DIR;
use optwatch_store::{attest, changes, fsio, logbook, monitor, snapshots, ReviewAttestation, StateDir};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Which side of a change record a snapshot attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AttachAs {
    Before,
    After,
}

/// Evidence-based verification of optimization changes.
#[derive(Parser)]
#[command(name = "optwatch", version, about = "Evidence-based verification of optimization changes")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// State directory, relative to the project root unless absolute
    #[arg(long = "dir", global = true, default_value = DEFAULT_STATE_DIR)]
    state_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the state directory, default config, and logbook
    Init,

    /// Capture a snapshot of sizes, timings, and probes
    Snapshot {
        /// Label recorded in the snapshot and its filename
        #[arg(long, default_value = "snapshot")]
        label: String,
        /// Change record to attach the snapshot to
        #[arg(long)]
        change_id: Option<String>,
        /// Side of the change record to attach as (requires --change-id)
        #[arg(long, value_enum)]
        attach_as: Option<AttachAs>,
    },

    /// Diff two snapshot files
    Compare {
        /// Path to the before snapshot JSON
        before: PathBuf,
        /// Path to the after snapshot JSON
        after: PathBuf,
        /// Write the markdown report to this path
        #[arg(long)]
        out: Option<PathBuf>,
        /// Write the structured delta JSON to this path
        #[arg(long)]
        json_out: Option<PathBuf>,
    },

    /// Manage change records
    Change {
        #[command(subcommand)]
        command: ChangeCommands,
    },

    /// Manage the daily monitor
    Monitor {
        #[command(subcommand)]
        command: MonitorCommands,
    },

    /// Record review evidence
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
}

#[derive(Subcommand)]
enum ChangeCommands {
    /// Create a change record and its logbook entry
    Start {
        /// Short title; also feeds the change id slug
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        hypothesis: String,
        #[arg(long, default_value = "")]
        risk: String,
        #[arg(long, default_value = "")]
        rollback: String,
        #[arg(long, default_value = "")]
        validation_today: String,
        #[arg(long, default_value = "")]
        validation_future: String,
    },

    /// List change records
    List,

    /// Evaluate the verification gate for a change
    Verify {
        #[arg(long)]
        change_id: String,
        /// Mark the change verified when the gate passes
        #[arg(long)]
        apply: bool,
        /// Summary recorded on the change when applying
        #[arg(long, default_value = "")]
        summary: String,
        /// Override the policy's minimum monitor ticks
        #[arg(long)]
        min_monitor_days: Option<u32>,
        /// Treat a dirty working tree as a failure
        #[arg(long)]
        require_clean_git: bool,
        /// Exit 0 when the only failures are missing monitor ticks
        #[arg(long)]
        ok_on_pending: bool,
    },
}

#[derive(Subcommand)]
enum MonitorCommands {
    /// Start monitoring a change (replaces any previous monitor)
    Start {
        #[arg(long)]
        change_id: String,
        /// Baseline snapshot path (defaults to the latest snapshot)
        #[arg(long)]
        baseline: Option<PathBuf>,
        /// Number of daily ticks to run
        #[arg(long, default_value = "3")]
        days: u32,
    },

    /// Run today's tick (idempotent per UTC date)
    Tick {
        /// Tick even when today's tick already ran
        #[arg(long)]
        force: bool,
    },

    /// Show the monitor state
    Status,
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Record a review attestation for a change
    Attest {
        #[arg(long)]
        change_id: String,
        #[arg(long, default_value = "")]
        reviewer: String,
        #[arg(long, default_value = "")]
        model: String,
        /// Reasoning mode the review ran under
        #[arg(long, default_value = "")]
        mode: String,
        #[arg(long, default_value = "")]
        tool: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let project_root = match cli.project_root.clone() {
        Some(root) => root,
        None => match std::env::current_dir() {
            Ok(root) => root,
            Err(e) => {
                eprintln!("error: cannot determine current directory: {}", e);
                process::exit(2);
            }
        },
    };
    let dirs = StateDir::new(project_root, &cli.state_dir);

    match cli.command {
        Commands::Init => cmd_init(&dirs, cli.output, cli.quiet),
        Commands::Snapshot {
            label,
            change_id,
            attach_as,
        } => cmd_snapshot(
            &dirs,
            &label,
            change_id.as_deref(),
            attach_as,
            cli.output,
            cli.quiet,
        ),
        Commands::Compare {
            before,
            after,
            out,
            json_out,
        } => cmd_compare(
            &before,
            &after,
            out.as_deref(),
            json_out.as_deref(),
            cli.output,
            cli.quiet,
        ),
        Commands::Change { command } => match command {
            ChangeCommands::Start {
                title,
                hypothesis,
                risk,
                rollback,
                validation_today,
                validation_future,
            } => cmd_change_start(
                &dirs,
                ChangeDraft {
                    title,
                    hypothesis,
                    risk,
                    rollback_plan: rollback,
                    validation_plan_today: validation_today,
                    validation_plan_future: validation_future,
                },
                cli.output,
                cli.quiet,
            ),
            ChangeCommands::List => cmd_change_list(&dirs, cli.output, cli.quiet),
            ChangeCommands::Verify {
                change_id,
                apply,
                summary,
                min_monitor_days,
                require_clean_git,
                ok_on_pending,
            } => cmd_change_verify(
                &dirs,
                &change_id,
                apply,
                &summary,
                min_monitor_days,
                require_clean_git,
                ok_on_pending,
                cli.output,
                cli.quiet,
            ),
        },
        Commands::Monitor { command } => match command {
            MonitorCommands::Start {
                change_id,
                baseline,
                days,
            } => cmd_monitor_start(
                &dirs,
                &change_id,
                baseline.as_deref(),
                days,
                cli.output,
                cli.quiet,
            ),
            MonitorCommands::Tick { force } => cmd_monitor_tick(&dirs, force, cli.output, cli.quiet),
            MonitorCommands::Status => cmd_monitor_status(&dirs, cli.output, cli.quiet),
        },
        Commands::Review { command } => match command {
            ReviewCommands::Attest {
                change_id,
                reviewer,
                model,
                mode,
                tool,
                notes,
            } => cmd_review_attest(
                &dirs,
                &change_id,
                &reviewer,
                &model,
                &mode,
                &tool,
                &notes,
                cli.output,
                cli.quiet,
            ),
        },
    }
}

fn cmd_init(dirs: &StateDir, output: OutputFormat, quiet: bool) {
    for dir in [
        dirs.root().to_path_buf(),
        dirs.snapshots_dir(),
        dirs.changes_dir(),
        dirs.reports_dir(),
        dirs.attestations_dir(),
    ] {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            let msg = format!("error creating '{}': {}", dir.display(), e);
            report_error(&msg, output, quiet);
            process::exit(2);
        }
    }

    let config_path = dirs.config_json();
    if !config_path.exists() {
        let mut doc = serde_json::to_value(Policy::default()).unwrap_or_default();
        if let serde_json::Value::Object(ref mut map) = doc {
            map.insert("version".to_string(), serde_json::json!(1));
        }
        if let Err(e) = fsio::write_json_atomic(&config_path, &doc) {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
    if let Err(e) = logbook::ensure_logbook(dirs) {
        report_error(&e.to_string(), output, quiet);
        process::exit(2);
    }

    if !quiet {
        match output {
            OutputFormat::Text => println!("initialized {}", dirs.root().display()),
            OutputFormat::Json => print_json(&serde_json::json!({
                "state_dir": dirs.root().display().to_string(),
                "config": config_path.display().to_string(),
                "logbook": dirs.logbook_file().display().to_string(),
            })),
        }
    }
}

fn cmd_snapshot(
    dirs: &StateDir,
    label: &str,
    change_id: Option<&str>,
    attach_as: Option<AttachAs>,
    output: OutputFormat,
    quiet: bool,
) {
    if change_id.is_some() != attach_as.is_some() {
        report_error(
            "--change-id and --attach-as must be given together",
            output,
            quiet,
        );
        process::exit(2);
    }

    let policy = load_policy_or_exit(dirs, output, quiet);
    let snapshot = capture(&policy, label, dirs.project_root());
    let path = match snapshots::save_snapshot(dirs, &snapshot) {
        Ok(path) => path,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    };

    if let (Some(id), Some(side)) = (change_id, attach_as) {
        let stored = path.display().to_string();
        let commit = snapshot.vcs.commit_id.clone();
        let result = changes::update_change(dirs, id, |ch| match side {
            AttachAs::Before => ch.snapshot_before = stored,
            AttachAs::After => {
                ch.snapshot_after = stored;
                ch.commit_id = commit;
            }
        });
        if let Err(e) = result {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }

    if !quiet {
        match output {
            OutputFormat::Text => println!("{}", path.display()),
            OutputFormat::Json => print_json(&serde_json::json!({
                "snapshot_path": path.display().to_string(),
                "label": snapshot.label,
            })),
        }
    }
}

fn cmd_compare(
    before_path: &Path,
    after_path: &Path,
    out: Option<&Path>,
    json_out: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let before = match snapshots::load_snapshot(before_path) {
        Ok(snap) => snap,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    };
    let after = match snapshots::load_snapshot(after_path) {
        Ok(snap) => snap,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    };

    let delta = compare(&before, &after);
    let markdown = delta.to_markdown();

    if let Some(path) = out {
        if let Err(e) = fsio::write_text_atomic(path, &markdown) {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
    if let Some(path) = json_out {
        if let Err(e) = fsio::write_json_atomic(path, &delta) {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }

    if !quiet {
        match output {
            OutputFormat::Text => println!("{}", markdown),
            OutputFormat::Json => print_json(&delta),
        }
    }
}

fn cmd_change_start(dirs: &StateDir, draft: ChangeDraft, output: OutputFormat, quiet: bool) {
    if draft.title.trim().is_empty() {
        report_error("--title must not be empty", output, quiet);
        process::exit(2);
    }
    match changes::create_change(dirs, draft) {
        Ok((record, path)) => {
            if !quiet {
                match output {
                    OutputFormat::Text => {
                        println!("{}", record.change_id);
                        println!("  {}", path.display());
                    }
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "change_id": record.change_id,
                        "title": record.title,
                        "status": record.status,
                        "path": path.display().to_string(),
                    })),
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
}

#[derive(Serialize)]
struct ChangeRow {
    change_id: String,
    title: String,
    status: optwatch_core::ChangeStatus,
    started_at: String,
}

fn cmd_change_list(dirs: &StateDir, output: OutputFormat, quiet: bool) {
    let records = match changes::list_changes(dirs) {
        Ok(records) => records,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    };
    let rows: Vec<ChangeRow> = records
        .into_iter()
        .map(|r| ChangeRow {
            change_id: r.change_id,
            title: r.title,
            status: r.status,
            started_at: r.started_at,
        })
        .collect();

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("no change records");
            }
            for row in rows {
                println!(
                    "{}  {}  {}",
                    row.change_id,
                    format!("{:?}", row.status).to_lowercase(),
                    row.title
                );
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_change_verify(
    dirs: &StateDir,
    change_id: &str,
    apply: bool,
    summary: &str,
    min_monitor_days: Option<u32>,
    require_clean_git: bool,
    ok_on_pending: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let mut policy = load_policy_or_exit(dirs, output, quiet);
    if let Some(days) = min_monitor_days {
        policy.verification.min_monitor_days = days;
    }
    if require_clean_git {
        policy.verification.require_clean_git = true;
    }

    if apply {
        match apply_verified(dirs, change_id, &policy, summary) {
            Ok(outcome) => {
                if !quiet {
                    match output {
                        OutputFormat::Json => print_json(&outcome),
                        OutputFormat::Text => println!("{}", render::apply_text(&outcome)),
                    }
                }
                let pending = !outcome.ok
                    && outcome
                        .failures
                        .iter()
                        .all(|f| f.starts_with("insufficient monitor ticks"));
                if !outcome.ok && !(ok_on_pending && pending) {
                    process::exit(2);
                }
            }
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(2);
            }
        }
    } else {
        match verify_change(dirs, change_id, &policy) {
            Ok(report) => {
                if !quiet {
                    match output {
                        OutputFormat::Json => print_json(&report),
                        OutputFormat::Text => println!("{}", render::gate_text(change_id, &report)),
                    }
                }
                if !report.ok && !(ok_on_pending && report.pending_only()) {
                    process::exit(2);
                }
            }
            Err(e) => {
                report_error(&e.to_string(), output, quiet);
                process::exit(2);
            }
        }
    }
}

fn cmd_monitor_start(
    dirs: &StateDir,
    change_id: &str,
    baseline: Option<&Path>,
    days: u32,
    output: OutputFormat,
    quiet: bool,
) {
    let baseline = baseline.map(|p| p.display().to_string());
    match start_monitor(dirs, change_id, baseline.as_deref(), days) {
        Ok(state) => {
            if !quiet {
                match output {
                    OutputFormat::Json => print_json(&state),
                    OutputFormat::Text => println!(
                        "monitoring {} for {} day(s), baseline {}",
                        state.change_id, state.total_days, state.baseline_snapshot_path
                    ),
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
}

fn cmd_monitor_tick(dirs: &StateDir, force: bool, output: OutputFormat, quiet: bool) {
    let policy = load_policy_or_exit(dirs, output, quiet);
    match tick_monitor(dirs, &policy, force) {
        Ok(outcome) => {
            if !quiet {
                match output {
                    OutputFormat::Json => print_json(&outcome),
                    OutputFormat::Text => match &outcome {
                        TickOutcome::Skipped { reason, .. } => println!("skipped: {}", reason),
                        TickOutcome::Completed {
                            day_index,
                            report_path,
                            runs_completed,
                            total_days,
                            ..
                        } => println!(
                            "day {} complete ({}/{} ticks): {}",
                            day_index, runs_completed, total_days, report_path
                        ),
                    },
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
}

fn cmd_monitor_status(dirs: &StateDir, output: OutputFormat, quiet: bool) {
    match monitor::load_monitor(dirs) {
        Ok(None) => {
            if !quiet {
                match output {
                    OutputFormat::Json => print_json(&serde_json::json!({"active": false})),
                    OutputFormat::Text => println!("no active monitor"),
                }
            }
        }
        Ok(Some(state)) => {
            if !quiet {
                match output {
                    OutputFormat::Json => print_json(&state),
                    OutputFormat::Text => {
                        let last = if state.last_run_utc_date.is_empty() {
                            "never"
                        } else {
                            &state.last_run_utc_date
                        };
                        println!(
                            "monitoring {}: {}/{} ticks, last run {}",
                            state.change_id, state.runs_completed, state.total_days, last
                        );
                    }
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_review_attest(
    dirs: &StateDir,
    change_id: &str,
    reviewer: &str,
    model: &str,
    mode: &str,
    tool: &str,
    notes: &str,
    output: OutputFormat,
    quiet: bool,
) {
    if change_id.trim().is_empty() {
        report_error("--change-id must not be empty", output, quiet);
        process::exit(2);
    }
    let policy = load_policy_or_exit(dirs, output, quiet);
    let attestation = ReviewAttestation::new(change_id, reviewer, model, mode, tool, notes);

    if policy.review.enforce_recommended_modes {
        let tool_key = attestation.tool.to_lowercase();
        if let Some(allowed) = policy.review.allowed_modes.get(&tool_key) {
            let mode_key = attestation.reasoning_mode.to_lowercase();
            let permitted = allowed.iter().any(|m| m.trim().to_lowercase() == mode_key);
            if !allowed.is_empty() && !permitted {
                eprintln!(
                    "warning: mode '{}' is not an allowed mode for tool '{}' (allowed: {})",
                    attestation.reasoning_mode,
                    attestation.tool,
                    allowed.join(", ")
                );
            }
        }
    }

    match attest::write_attestation(dirs, &attestation) {
        Ok(path) => {
            if !quiet {
                match output {
                    OutputFormat::Text => println!("{}", path.display()),
                    OutputFormat::Json => print_json(&serde_json::json!({
                        "attestation_path": path.display().to_string(),
                        "change_id": attestation.change_id,
                    })),
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(2);
        }
    }
}

fn load_policy_or_exit(dirs: &StateDir, output: OutputFormat, quiet: bool) -> Policy {
    match config::load_policy(dirs) {
        Ok(policy) => policy,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(2);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}

fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
