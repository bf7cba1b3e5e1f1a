//! External max-flow program speaking DIMACS.
//!
//! The problem is written to the program's stdin; its stdout is scanned for
//! `n <id>` lines naming one side of the minimum cut. Other lines (comments,
//! solution values, flows) are ignored.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use ultpit_config::{CutSide, DEFAULT_PRECISION, DEFAULT_TIMEOUT_SECONDS};
use ultpit_core::Precedence;

use super::network::FlowNetwork;
use crate::engine::Engine;
use crate::error::EngineError;

/// Interval between exit checks once the program has closed its output.
const EXIT_POLL: Duration = Duration::from_millis(10);

/// Engine that delegates the minimum cut to an external program.
#[derive(Debug, Clone)]
pub struct DimacsEngine {
    program: PathBuf,
    args: Vec<String>,
    precision: f64,
    timeout: Duration,
    reported_side: CutSide,
    problem_name: String,
}

impl DimacsEngine {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            precision: DEFAULT_PRECISION,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            reported_side: CutSide::Source,
            problem_name: "ultpit".to_string(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Non-positive values keep the default precision.
    pub fn with_precision(mut self, precision: f64) -> Self {
        if precision > 0.0 {
            self.precision = precision;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_reported_side(mut self, side: CutSide) -> Self {
        self.reported_side = side;
        self
    }

    /// Name written into the problem's comment line.
    pub fn with_problem_name(mut self, name: &str) -> Self {
        self.problem_name = name.to_string();
        self
    }

    fn run(&self, input: Vec<u8>) -> Result<String, EngineError> {
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            kill(&mut child);
            return Err(EngineError::Internal(
                "child pipes were not captured".to_string(),
            ));
        };

        // A program that exits early closes its stdin; the write error is moot.
        let writer = thread::spawn(move || {
            let _ = stdin.write_all(&input);
        });
        let errors = thread::spawn(move || {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text);
            text
        });
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut bytes = Vec::new();
            let result = stdout.read_to_end(&mut bytes).map(|_| bytes);
            let _ = tx.send(result);
        });

        let bytes = match rx.recv_timeout(self.timeout.saturating_sub(started.elapsed())) {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(err)) => {
                kill(&mut child);
                return Err(EngineError::Io(err));
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                kill(&mut child);
                return Err(EngineError::Timeout(self.timeout));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                kill(&mut child);
                return Err(EngineError::Internal(
                    "solver output reader stopped".to_string(),
                ));
            }
        };

        // Closing stdout doesn't end the program; the deadline still holds.
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    let left = self.timeout.saturating_sub(started.elapsed());
                    if left.is_zero() {
                        kill(&mut child);
                        return Err(EngineError::Timeout(self.timeout));
                    }
                    thread::sleep(left.min(EXIT_POLL));
                }
                Err(err) => {
                    kill(&mut child);
                    return Err(EngineError::Io(err));
                }
            }
        };
        let _ = writer.join();
        let stderr = errors.join().unwrap_or_default();
        if !status.success() {
            return Err(EngineError::ProcessFailed(format!(
                "{} exited with {status}: {}",
                self.program.display(),
                stderr.trim()
            )));
        }

        String::from_utf8(bytes).map_err(|e| {
            EngineError::MalformedOutput(format!("output is not UTF-8: {e}"))
        })
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Reads the cut from program output.
///
/// Returns the blocks listed in `n <id>` lines, ignoring the source and sink.
pub(super) fn parse_cut(output: &str, network: &FlowNetwork) -> Result<Vec<bool>, EngineError> {
    let mut listed = vec![false; network.block_count()];
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [tag, id] = fields.as_slice() else {
            continue;
        };
        if *tag != "n" {
            continue;
        }
        let id: usize = id
            .parse()
            .map_err(|_| EngineError::MalformedOutput(format!("bad node id in line `{line}`")))?;
        if id == network.source() + 1 || id == network.sink() + 1 {
            continue;
        }
        let block = network.block_of_dimacs_node(id).ok_or_else(|| {
            EngineError::MalformedOutput(format!(
                "node {id} outside problem of {} nodes",
                network.node_count()
            ))
        })?;
        listed[block] = true;
    }
    Ok(listed)
}

impl Engine for DimacsEngine {
    fn engine_name(&self) -> &'static str {
        "dimacs"
    }

    fn solve(
        &mut self,
        values: &[f64],
        precedence: &Precedence,
    ) -> Result<Vec<bool>, EngineError> {
        let network = FlowNetwork::build(values, precedence, self.precision)?;
        let mut input = Vec::new();
        network.write_dimacs(&mut input, &self.problem_name)?;

        info!(
            event = "dimacs_start",
            program = %self.program.display(),
            nodes = network.node_count(),
            arcs = network.arcs().len(),
        );
        let started = Instant::now();
        let output = self.run(input)?;

        let listed = parse_cut(&output, &network)?;
        let selection = match self.reported_side {
            CutSide::Source => listed,
            CutSide::Sink => listed.into_iter().map(|sink_side| !sink_side).collect(),
        };
        debug!(
            event = "dimacs_end",
            duration_ms = started.elapsed().as_millis() as u64,
            selected = selection.iter().filter(|&&s| s).count(),
        );
        Ok(selection)
    }
}
