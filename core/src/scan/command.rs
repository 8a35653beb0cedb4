//! Runs an external page-analysis engine as a child process.
//!
//! The engine gets the URL through a `{url}` placeholder in its arguments and
//! must print an axe-style results document on stdout. The child is killed
//! when the analysis future is dropped, so gateway timeouts and orchestrator
//! cancellation stop the browser as well. Output larger than the configured
//! limit fails the analysis instead of being buffered.

use crate::error::{CoreError, CoreResult};
use crate::scan::axe::parse_axe_output;
use crate::scan::gateway::PageAnalyzer;
use crate::scan::model::ScanResult;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

pub const URL_PLACEHOLDER: &str = "{url}";

pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 16 * 1024 * 1024;

const STDERR_EXCERPT_CHARS: usize = 400;
const STDERR_KEEP_BYTES: u64 = 8 * 1024;

#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
    max_output_bytes: usize,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    /// Upper bound on the results document read from stdout.
    pub fn with_output_limit(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    fn build_args(&self, url: &str) -> Vec<String> {
        if !self.args.iter().any(|a| a.contains(URL_PLACEHOLDER)) {
            let mut out = self.args.clone();
            out.push(url.to_string());
            return out;
        }
        self.args
            .iter()
            .map(|a| a.replace(URL_PLACEHOLDER, url))
            .collect()
    }
}

#[async_trait]
impl PageAnalyzer for CommandAnalyzer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn analyze(&self, url: &str) -> CoreResult<ScanResult> {
        let args = self.build_args(url);
        debug!("spawning {} {:?}", self.program, args);
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CoreError::AnalysisFailed(format!("failed to start {}: {}", self.program, e))
            })?;

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                return Err(CoreError::AnalysisFailed(format!(
                    "{}: output pipes not captured",
                    self.program
                )))
            }
        };
        // an oversized stdout returns early; dropping `child` kills the engine
        let (stdout, stderr) = tokio::try_join!(
            self.read_results(stdout),
            read_stderr_head(stderr),
        )?;
        let status = child.wait().await.map_err(|e| {
            CoreError::AnalysisFailed(format!("{} did not complete: {}", self.program, e))
        })?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT_CHARS).collect();
            return Err(CoreError::AnalysisFailed(format!(
                "{} exited with {:?}: {}",
                self.program,
                status.code(),
                excerpt
            )));
        }
        parse_axe_output(&stdout)
    }
}

impl CommandAnalyzer {
    async fn read_results<R: AsyncRead + Unpin>(&self, reader: R) -> CoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        reader
            .take(self.max_output_bytes as u64 + 1)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| {
                CoreError::AnalysisFailed(format!("reading {} output: {}", self.program, e))
            })?;
        if buf.len() > self.max_output_bytes {
            return Err(CoreError::AnalysisFailed(format!(
                "{} output exceeded {} bytes",
                self.program, self.max_output_bytes
            )));
        }
        Ok(buf)
    }
}

/// Keeps the first few KiB of stderr and discards the rest so the engine
/// never blocks on a full pipe.
async fn read_stderr_head<R: AsyncRead + Unpin>(mut reader: R) -> CoreResult<Vec<u8>> {
    let mut head = Vec::new();
    (&mut reader)
        .take(STDERR_KEEP_BYTES)
        .read_to_end(&mut head)
        .await
        .map_err(|e| CoreError::AnalysisFailed(format!("reading stderr: {}", e)))?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink())
        .await
        .map_err(|e| CoreError::AnalysisFailed(format!("reading stderr: {}", e)))?;
    Ok(head)
}
