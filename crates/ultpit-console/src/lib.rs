//! Colorful console output for pit optimization runs.
//!
//! Provides a custom `tracing` layer that formats pipeline events with
//! colors, or a plain log file when a run is started with `--log`.
//!
//! ## Log Levels
//!
//! - **INFO**: Pipeline stages and per-realization results
//! - **DEBUG**: Engine internals (tree visits, merges, cuts, network sizes)
//! - **TRACE**: Individual tree merges

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_DIRECTIVE: &str = "ultpit=info,ultpit_core=info,ultpit_solver=info,ultpit_cli=info";

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Colored event lines on stderr, after a banner.
    #[default]
    Console,
    /// Plain `fmt` lines appended to a file.
    File(PathBuf),
}

/// Initializes logging for `target`.
///
/// Safe to call multiple times - only the first call has effect. `RUST_LOG`
/// overrides the default filter.
///
/// # Errors
///
/// Returns an error if the log file can't be opened.
pub fn init(target: LogTarget) -> io::Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    EPOCH.get_or_init(Instant::now);

    match target {
        LogTarget::Console => {
            print_banner();
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(ConsoleLayer)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init();
        }
    }
    INIT.get_or_init(|| ());
    Ok(())
}

fn elapsed_secs() -> f64 {
    EPOCH.get().map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

fn print_banner() {
    let banner = r#"
       _ _         _ _
 _   _| | |_ _ __ (_) |_
| | | | | __| '_ \| | __|
| |_| | | |_| |_) | | |_
 \__,_|_|\__| .__/|_|\__|
            |_|
"#;
    let version_line = format!("        v{VERSION} - Ultimate Pit Optimizer\n");

    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", banner.bright_cyan());
    let _ = writeln!(stderr, "{}", version_line.bright_white().bold());
    let _ = stderr.flush();
}

/// A tracing layer that formats pipeline events with colors.
pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("ultpit") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stderr(), "{output}");
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    label: Option<String>,
    problem: Option<String>,
    grid: Option<String>,
    engine: Option<String>,
    program: Option<String>,
    error: Option<String>,
    path: Option<String>,
    realizations: Option<u64>,
    realization: Option<u64>,
    blocks: Option<u64>,
    values: Option<u64>,
    relevant: Option<u64>,
    naive_arcs: Option<u64>,
    trimmed_arcs: Option<u64>,
    keys: Option<u64>,
    with_arcs: Option<u64>,
    definitions: Option<u64>,
    arcs: Option<u64>,
    original: Option<u64>,
    compacted: Option<u64>,
    duration_ms: Option<u64>,
    visits: Option<u64>,
    merges: Option<u64>,
    cuts: Option<u64>,
    nodes: Option<u64>,
    flow: Option<u64>,
    status: Option<i64>,
    value: Option<f64>,
    reduction_pct: Option<f64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{value:?}").trim_matches('"').to_string();
        self.record_text(field.name(), s);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        let slot = match field.name() {
            "realizations" => &mut self.realizations,
            "realization" => &mut self.realization,
            "blocks" | "vertices" => &mut self.blocks,
            "values" => &mut self.values,
            "relevant" => &mut self.relevant,
            "naive_arcs" => &mut self.naive_arcs,
            "trimmed_arcs" => &mut self.trimmed_arcs,
            "keys" => &mut self.keys,
            "with_arcs" => &mut self.with_arcs,
            "definitions" => &mut self.definitions,
            "arcs" => &mut self.arcs,
            "original" => &mut self.original,
            "compacted" => &mut self.compacted,
            "duration_ms" => &mut self.duration_ms,
            "visits" => &mut self.visits,
            "merges" => &mut self.merges,
            "cuts" => &mut self.cuts,
            "nodes" => &mut self.nodes,
            "flow" => &mut self.flow,
            _ => return,
        };
        *slot = Some(value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == "status" {
            self.status = Some(value);
        } else if let Ok(v) = u64::try_from(value) {
            self.record_u64(field, v);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match field.name() {
            "value" => self.value = Some(value),
            "reduction_pct" => self.reduction_pct = Some(value),
            _ => {}
        }
    }
}

impl EventVisitor {
    fn record_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "event" => &mut self.event,
            "label" => &mut self.label,
            "problem" => &mut self.problem,
            "grid" => &mut self.grid,
            "engine" => &mut self.engine,
            "program" => &mut self.program,
            "error" => &mut self.error,
            "path" => &mut self.path,
            _ => return,
        };
        *slot = Some(value);
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    match v.event.as_deref().unwrap_or("") {
        "values_read" => format_values_read(v),
        "pipeline_start" => format_pipeline_start(v),
        "mask_built" | "mask_closed" => format_mask(v),
        "template_built" => format_template(v),
        "precedence_summary" => format_precedence(v),
        "compaction_start" => format_compaction(v),
        "realization_end" => format_realization_end(v),
        "realization_failed" => format_realization_failed(v),
        "pipeline_end" => format_pipeline_end(v),
        "run_failed" => format_run_failed(v),
        "tree_solved" | "max_flow_solved" | "dimacs_end" if level != Level::INFO => {
            format_engine_detail(v)
        }
        _ => String::new(),
    }
}

fn count(n: Option<u64>) -> String {
    n.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs()).bright_black().to_string()
}

fn format_values_read(v: &EventVisitor) -> String {
    format!(
        "{} {} Read {} values from {}",
        format_elapsed(),
        "◆".bright_blue(),
        count(v.values).bright_yellow(),
        v.path.as_deref().unwrap_or("?").white(),
    )
}

fn format_pipeline_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Optimizing {} │ grid {} │ {} blocks │ {} realizations",
        format_elapsed(),
        "▶".bright_green().bold(),
        v.problem.as_deref().unwrap_or("problem").white().bold(),
        v.grid.as_deref().unwrap_or("?").bright_magenta(),
        count(v.blocks).bright_yellow(),
        count(v.realizations).bright_yellow(),
    )
}

fn format_mask(v: &EventVisitor) -> String {
    format!(
        "{} {} Mask │ {} relevant blocks",
        format_elapsed(),
        "◆".bright_blue(),
        count(v.relevant).bright_yellow(),
    )
}

fn format_template(v: &EventVisitor) -> String {
    format!(
        "{} {} Template │ {} arcs after trimming {}",
        format_elapsed(),
        "◆".bright_blue(),
        count(v.trimmed_arcs).bright_yellow(),
        count(v.naive_arcs).bright_black(),
    )
}

fn format_precedence(v: &EventVisitor) -> String {
    format!(
        "{} {} Precedence ({}) │ {} of {} blocks keyed │ {} definitions │ {} arcs",
        format_elapsed(),
        "◆".bright_blue(),
        v.label.as_deref().unwrap_or("?"),
        count(v.with_arcs).bright_yellow(),
        count(v.keys),
        count(v.definitions).bright_yellow(),
        count(v.arcs).bright_yellow(),
    )
}

fn format_compaction(v: &EventVisitor) -> String {
    format!(
        "{} {} Compacting │ {} → {} blocks │ {:.1}% removed",
        format_elapsed(),
        "◆".bright_blue(),
        count(v.original),
        count(v.compacted).bright_yellow(),
        v.reduction_pct.unwrap_or(0.0),
    )
}

fn format_realization_end(v: &EventVisitor) -> String {
    let value = v.value.unwrap_or(0.0);
    let value_str = format!("{value:.2}");
    let value_str = if value > 0.0 {
        value_str.bright_green().to_string()
    } else {
        value_str.white().to_string()
    };
    format!(
        "{} {} Realization {:>4} │ {} │ {} blocks │ value {} │ {}",
        format_elapsed(),
        "✓".bright_green(),
        v.realization.unwrap_or(0),
        v.engine.as_deref().unwrap_or("?").white(),
        count(v.blocks).bright_yellow(),
        value_str,
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
    )
}

fn format_realization_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} Realization {:>4} failed │ status {} │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        v.realization.unwrap_or(0),
        v.status.unwrap_or(-1),
        v.error.as_deref().unwrap_or("").bright_red(),
    )
}

fn format_run_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} Failed │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        v.error.as_deref().unwrap_or("").bright_red(),
    )
}

fn format_pipeline_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Done │ {} realizations │ {} relevant blocks",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v.realizations),
        count(v.relevant),
    )
}

fn format_engine_detail(v: &EventVisitor) -> String {
    let detail = match v.event.as_deref() {
        Some("tree_solved") => format!(
            "tree │ {} visits │ {} merges │ {} cuts",
            count(v.visits),
            count(v.merges),
            count(v.cuts)
        ),
        Some("max_flow_solved") => format!(
            "max flow │ {} nodes │ {} arcs │ flow {}",
            count(v.nodes),
            count(v.arcs),
            count(v.flow)
        ),
        _ => format!(
            "dimacs │ {}",
            format_duration_ms(v.duration_ms.unwrap_or(0))
        ),
    };
    format!("{} {} {}", format_elapsed(), "·".bright_black(), detail.bright_black())
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{mins}m {secs}s")
    }
}

#[cfg(test)]
mod tests;
