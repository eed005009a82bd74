//! Subprocess boundary to the `git` command-line tool.
//!
//! Git is the source of truth for everything this crate reports, so every
//! query and mutation goes through [`GitCli`]. Two execution modes exist:
//! [`GitRunner::output`] captures a short command to completion, while
//! [`GitRunner::stream`] forwards output line by line and honours a
//! cancellation token.

pub mod branches;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader, Split};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::traits::GitRunner;

/// Upper bound on captured output kept per invocation.
pub const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running git: {0}")]
    Io(#[from] std::io::Error),
}

/// Captured result of a completed git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// How a streamed invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The process exited on its own. `captured` holds stdout and stderr
    /// interleaved in the order lines arrived.
    Exited { code: Option<i32>, captured: String },
    /// The cancellation token fired and the process was killed.
    Cancelled,
}

/// Runs the real `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Uses another executable in place of `git`
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, repo: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(repo)
            .stdin(Stdio::null())
            // Never block on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            // Diagnostics are pattern-matched, keep them in English
            .env("LC_ALL", "C")
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> GitError {
        GitError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl GitRunner for GitCli {
    async fn output(&self, repo: &Path, args: &[&str]) -> Result<GitOutput, GitError> {
        let start = Instant::now();
        let mut child = self
            .command(repo, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let (stdout, stderr) = tokio::try_join!(
            read_bounded(child.stdout.take()),
            read_bounded(child.stderr.take())
        )?;
        let status = child.wait().await?;

        let result = GitOutput {
            code: status.code(),
            stdout: bounded_lossy(&stdout),
            stderr: bounded_lossy(&stderr),
        };
        debug!(
            repo = %repo.display(),
            ?args,
            code = ?result.code,
            elapsed_ms = start.elapsed().as_millis(),
            "git: completed"
        );
        Ok(result)
    }

    async fn stream(
        &self,
        repo: &Path,
        args: &[&str],
        log: &(dyn for<'line> Fn(&'line str) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, GitError> {
        if cancel.is_cancelled() {
            return Ok(StreamOutcome::Cancelled);
        }

        let start = Instant::now();
        debug!(repo = %repo.display(), ?args, "git: streaming");

        let mut child = self
            .command(repo, args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut stdout = child
            .stdout
            .take()
            .map(|pipe| BufReader::new(pipe).split(b'\n'));
        let mut stderr = child
            .stderr
            .take()
            .map(|pipe| BufReader::new(pipe).split(b'\n'));
        let mut captured = String::new();

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                () = cancel.cancelled() => {
                    return Ok(terminate(&mut child, start).await);
                }
                segment = next_segment(&mut stdout), if stdout.is_some() => {
                    forward(segment, &mut stdout, &mut captured, log);
                }
                segment = next_segment(&mut stderr), if stderr.is_some() => {
                    forward(segment, &mut stderr, &mut captured, log);
                }
            }
        }

        let status = tokio::select! {
            () = cancel.cancelled() => {
                return Ok(terminate(&mut child, start).await);
            }
            status = child.wait() => status?,
        };

        debug!(
            repo = %repo.display(),
            ?args,
            code = ?status.code(),
            elapsed_ms = start.elapsed().as_millis(),
            "git: stream finished"
        );
        Ok(StreamOutcome::Exited {
            code: status.code(),
            captured,
        })
    }
}

/// Reads at most [`MAX_OUTPUT_BYTES`] from `pipe`, then discards the rest so
/// the child never blocks on a full pipe.
async fn read_bounded<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(Vec::new());
    };
    let mut buffer = Vec::new();
    (&mut pipe)
        .take(MAX_OUTPUT_BYTES as u64)
        .read_to_end(&mut buffer)
        .await?;
    tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok(buffer)
}

async fn next_segment<R>(reader: &mut Option<Split<R>>) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    match reader {
        Some(split) => split.next_segment().await,
        None => std::future::pending().await,
    }
}

fn forward<R>(
    segment: std::io::Result<Option<Vec<u8>>>,
    reader: &mut Option<Split<R>>,
    captured: &mut String,
    log: &(dyn for<'line> Fn(&'line str) + Send + Sync),
) {
    match segment {
        Ok(Some(bytes)) => {
            let text = String::from_utf8_lossy(&bytes);
            let line = text.trim_end_matches('\r');
            log(line);
            push_bounded(captured, line);
        }
        // EOF or a broken pipe both end this stream
        Ok(None) | Err(_) => *reader = None,
    }
}

async fn terminate(child: &mut Child, start: Instant) -> StreamOutcome {
    // kill() also reaps the process
    if let Err(e) = child.kill().await {
        debug!(error = %e, "git: kill after cancellation failed");
    }
    debug!(
        elapsed_ms = start.elapsed().as_millis(),
        "git: cancelled"
    );
    StreamOutcome::Cancelled
}

fn push_bounded(buffer: &mut String, line: &str) {
    let remaining = MAX_OUTPUT_BYTES.saturating_sub(buffer.len());
    if remaining == 0 {
        return;
    }
    if line.len() < remaining {
        buffer.push_str(line);
        buffer.push('\n');
    } else {
        buffer.push_str(&line[..floor_char_boundary(line, remaining)]);
    }
}

fn bounded_lossy(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.len() <= MAX_OUTPUT_BYTES {
        return text.into_owned();
    }
    text[..floor_char_boundary(&text, MAX_OUTPUT_BYTES)].to_string()
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut end = index.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}
