//! In-memory [`GitRunner`] that records invocations and replays canned output.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use super::{GitError, GitOutput, StreamOutcome};
use crate::traits::GitRunner;

struct Response {
    args: String,
    output: GitOutput,
}

/// Matches on the space-joined argument list. Unknown commands exit with 1.
#[derive(Default)]
pub(crate) struct MockGit {
    responses: Vec<Response>,
    hang_on: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl MockGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replies to `args` with the given exit code and stdout
    pub(crate) fn respond(mut self, args: &str, code: i32, stdout: &str) -> Self {
        self.responses.push(Response {
            args: args.to_string(),
            output: GitOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        });
        self
    }

    /// Replies to `args` with a failing exit code and stderr
    pub(crate) fn fail(mut self, args: &str, code: i32, stderr: &str) -> Self {
        self.responses.push(Response {
            args: args.to_string(),
            output: GitOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        });
        self
    }

    /// Streamed commands starting with `prefix` block until cancelled
    pub(crate) fn hang_on(mut self, prefix: &str) -> Self {
        self.hang_on.push(prefix.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, args: &[&str]) -> String {
        let joined = args.join(" ");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(joined.clone());
        joined
    }

    fn lookup(&self, joined: &str) -> GitOutput {
        self.responses
            .iter()
            .find(|r| r.args == joined)
            .map(|r| r.output.clone())
            .unwrap_or(GitOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: String::new(),
            })
    }
}

#[async_trait]
impl GitRunner for MockGit {
    async fn output(&self, _repo: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let joined = self.record(args);
        Ok(self.lookup(&joined))
    }

    async fn stream(
        &self,
        _repo: &Path,
        args: &[&str],
        log: &(dyn for<'line> Fn(&'line str) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, GitError> {
        if cancel.is_cancelled() {
            return Ok(StreamOutcome::Cancelled);
        }
        let joined = self.record(args);

        if self.hang_on.iter().any(|prefix| joined.starts_with(prefix)) {
            cancel.cancelled().await;
            return Ok(StreamOutcome::Cancelled);
        }

        let output = self.lookup(&joined);
        let mut captured = String::new();
        for line in output.stdout.lines().chain(output.stderr.lines()) {
            log(line);
            captured.push_str(line);
            captured.push('\n');
        }
        Ok(StreamOutcome::Exited {
            code: output.code,
            captured,
        })
    }
}
