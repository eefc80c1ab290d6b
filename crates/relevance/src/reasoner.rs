//! Solver abstraction
//!
//! The search only needs "run this program, give me up to N answers as
//! text". `ScaspProcess` does that by shelling out to an s(CASP) binary;
//! tests substitute scripted implementations.

use async_trait::async_trait;
use scasplens_common::config::ReasonerConfig;
use scasplens_common::errors::{Result, ScaspError};
use scasplens_common::metrics::SolverMetrics;
use scasplens_response::{parse_response, Response};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Trait for solver invocation
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Run `program` and return the solver's raw output.
    ///
    /// `max_answers` bounds the number of answers; 0 asks for all of them.
    async fn run(&self, program: &str, max_answers: usize) -> Result<String>;

    /// Get the solver name
    fn name(&self) -> &str;
}

/// Run `program` and parse the output.
///
/// Escaped values are decoded by the parser, field by field.
pub async fn query<R: Reasoner + ?Sized>(
    reasoner: &R,
    program: &str,
    max_answers: usize,
) -> Result<Response> {
    let output = reasoner.run(program, max_answers).await?;
    parse_response(&output, max_answers)
}

/// s(CASP) executable run once per query
pub struct ScaspProcess {
    location: String,
    flags: Vec<String>,
    timeout: Duration,
}

impl ScaspProcess {
    pub fn new(location: impl Into<String>, flags: Vec<String>, timeout: Duration) -> Self {
        Self {
            location: location.into(),
            flags,
            timeout,
        }
    }

    pub fn from_config(config: &ReasonerConfig) -> Self {
        Self::new(
            config.location.clone(),
            config.flags.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn invocation_error(&self, args: &[String], message: impl Into<String>) -> ScaspError {
        ScaspError::ProcessInvocation {
            command: self.location.clone(),
            args: args.to_vec(),
            message: message.into(),
        }
    }

    async fn execute(&self, args: &[String]) -> Result<String> {
        let child = Command::new(&self.location)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.invocation_error(args, e.to_string()))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ScaspError::ProcessTimeout {
                command: self.location.clone(),
                args: args.to_vec(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| self.invocation_error(args, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.invocation_error(
                args,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Reasoner for ScaspProcess {
    async fn run(&self, program: &str, max_answers: usize) -> Result<String> {
        let source = tempfile::Builder::new()
            .prefix("scasplens-")
            .suffix(".pl")
            .tempfile()?;
        tokio::fs::write(source.path(), program).await?;

        let mut args = self.flags.clone();
        args.push(format!("-s{}", max_answers));
        args.push(source.path().to_string_lossy().into_owned());

        tracing::debug!(
            command = %self.location,
            args = ?args,
            program_bytes = program.len(),
            "Invoking solver"
        );

        let metrics = SolverMetrics::start(&self.location);
        match self.execute(&args).await {
            Ok(stdout) => {
                metrics.finish("success");
                Ok(stdout)
            }
            Err(e) => {
                let outcome = if matches!(e, ScaspError::ProcessTimeout { .. }) {
                    "timeout"
                } else {
                    "error"
                };
                metrics.finish(outcome);
                tracing::error!(command = %self.location, error = %e, "Solver invocation failed");
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        &self.location
    }
}
