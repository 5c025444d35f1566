//! Common test utilities for pulsewrap integration tests
//!
//! - A scripted in-memory transport for client-level tests
//! - Running blocking client calls from async wiremock tests
//! - CLI invocation helpers

#![allow(dead_code)]

use std::collections::VecDeque;
use std::process::{Command, Output, Stdio};

use pulsewrap::{RawResponse, RequestConfig, Transport, TransportFailure};

/// A URL whose host never resolves
pub const DUMMY_URL: &str = "http://pulsewrap-test.invalid/";

/// Transport that records configs and replays queued outcomes
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub seen: Vec<RequestConfig>,
    outcomes: VecDeque<Result<RawResponse, TransportFailure>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response; the boundary is left for the parser to find
    pub fn respond(mut self, raw: &[u8]) -> Self {
        self.outcomes.push_back(Ok(RawResponse::new(raw, None)));
        self
    }

    pub fn fail(mut self, code: u32, message: &str) -> Self {
        self.outcomes.push_back(Err(TransportFailure::new(code, message)));
        self
    }

    pub fn last(&self) -> &RequestConfig {
        self.seen.last().expect("no request was sent")
    }
}

impl Transport for ScriptedTransport {
    fn execute(&mut self, config: &RequestConfig) -> Result<RawResponse, TransportFailure> {
        self.seen.push(config.clone());
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(&b"HTTP/1.1 200 OK\r\n\r\n"[..], None)))
    }
}

/// Run blocking client code off the async test runtime
pub async fn blocking<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliResponse {
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }
}

/// Run the CLI with the given arguments, never touching the user's config
pub fn pulsewrap(args: &[&str]) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pulsewrap"));
    cmd.arg("--no-config");
    cmd.args(args);
    cmd.env_remove("PULSEWRAP_LOG");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().expect("Failed to execute command");
    parse_output(output)
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}
