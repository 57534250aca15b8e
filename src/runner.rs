//! Chain execution against real OS processes.
//!
//! The runner spawns every stage of a [`Chain`], wires pipes and file
//! redirections exactly as declared, then blocks on the terminal stage.
//! Outcomes are reported as a typed [`ChainStatus`] so chain failures are
//! composable and inspectable in tests rather than an ambient exit-code
//! side channel.

use crate::stage::{Chain, StageSpec, StderrSpec, StdinSpec, StdoutSpec};
use std::fs::File;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, ChildStdout, Command};

/// The outcome of running one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    /// The terminal stage exited with status zero.
    Success,
    /// The terminal stage exited with a non-zero status.
    NonZeroExit {
        /// The exit code; `-1` if the process was terminated by a signal.
        code: i32,
    },
    /// A stage could not be started, or the chain was cut short before the
    /// terminal stage could report an exit status.
    LaunchFailure {
        /// The stage that failed.
        stage: String,
        /// The failure description.
        reason: String,
    },
}

impl ChainStatus {
    /// Whether the chain met its success criterion.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Exit code reported when a process was killed by a signal.
const SIGNAL_EXIT_CODE: i32 = -1;

/// Runs a chain to completion.
///
/// Non-terminal stages feed the next stage's stdin through a pipe; only the
/// terminal stage's exit status is awaited and checked, matching shell pipe
/// semantics. With a `timeout`, expiry kills the whole process group
/// (`kill_on_drop`) and the chain reports a launch-class failure.
pub async fn run_chain(chain: &Chain, timeout: Option<Duration>) -> ChainStatus {
    let mut children: Vec<Child> = Vec::with_capacity(chain.stages().len());
    let mut upstream: Option<ChildStdout> = None;

    for spec in chain.stages() {
        let mut cmd = Command::new(spec.program());
        cmd.args(spec.args_slice());
        cmd.kill_on_drop(true);

        match spec.stdin() {
            StdinSpec::Inherit => {
                cmd.stdin(Stdio::inherit());
            }
            StdinSpec::FromFile(path) => match File::open(path) {
                Ok(file) => {
                    cmd.stdin(Stdio::from(file));
                }
                Err(e) => {
                    return launch_failure(
                        spec,
                        format!("could not open stdin file {}: {e}", path.display()),
                    )
                }
            },
            StdinSpec::FromPipe => {
                let Some(pipe) = upstream.take() else {
                    return launch_failure(spec, "no upstream stage to read from".to_string());
                };
                match TryInto::<Stdio>::try_into(pipe) {
                    Ok(stdio) => {
                        cmd.stdin(stdio);
                    }
                    Err(e) => return launch_failure(spec, format!("could not wire pipe: {e}")),
                }
            }
        }

        match spec.stdout() {
            StdoutSpec::Inherit => {
                cmd.stdout(Stdio::inherit());
            }
            StdoutSpec::ToFile(path) => match File::create(path) {
                Ok(file) => {
                    cmd.stdout(Stdio::from(file));
                }
                Err(e) => {
                    return launch_failure(
                        spec,
                        format!("could not create stdout file {}: {e}", path.display()),
                    )
                }
            },
            StdoutSpec::ToPipe => {
                cmd.stdout(Stdio::piped());
            }
        }

        match spec.stderr() {
            StderrSpec::Inherit => {
                cmd.stderr(Stdio::inherit());
            }
            StderrSpec::ToFile(path) => match File::create(path) {
                Ok(file) => {
                    cmd.stderr(Stdio::from(file));
                }
                Err(e) => {
                    return launch_failure(
                        spec,
                        format!("could not create stderr file {}: {e}", path.display()),
                    )
                }
            },
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(stage = spec.name(), error = %e, "stage failed to launch");
                return launch_failure(
                    spec,
                    format!("could not start {}: {e}", spec.program().display()),
                );
            }
        };

        if *spec.stdout() == StdoutSpec::ToPipe {
            upstream = child.stdout.take();
        }
        children.push(child);
    }

    let mut terminal = match children.pop() {
        Some(child) => child,
        // A chain has at least one stage, so at least one child was spawned.
        None => return ChainStatus::Success,
    };

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, terminal.wait()).await {
            Ok(result) => result,
            Err(_) => {
                let _ = terminal.start_kill();
                for child in &mut children {
                    let _ = child.start_kill();
                }
                return ChainStatus::LaunchFailure {
                    stage: chain.terminal_stage().name().to_string(),
                    reason: format!("chain timed out after {limit:?}"),
                };
            }
        },
        None => terminal.wait().await,
    };

    match waited {
        Ok(status) if status.success() => ChainStatus::Success,
        Ok(status) => ChainStatus::NonZeroExit {
            code: status.code().unwrap_or(SIGNAL_EXIT_CODE),
        },
        Err(e) => launch_failure(
            chain.terminal_stage(),
            format!("could not wait on process: {e}"),
        ),
    }
}

fn launch_failure(spec: &StageSpec, reason: String) -> ChainStatus {
    ChainStatus::LaunchFailure {
        stage: spec.name().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{Chain, StageSpec};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_single_stage_success() {
        let chain = Chain::single(StageSpec::new("noop", "true"));
        assert_eq!(run_chain(&chain, None).await, ChainStatus::Success);
    }

    #[tokio::test]
    async fn test_single_stage_nonzero_exit() {
        let chain = Chain::single(StageSpec::new("failing", "false"));
        assert_eq!(
            run_chain(&chain, None).await,
            ChainStatus::NonZeroExit { code: 1 }
        );
    }

    #[tokio::test]
    async fn test_missing_executable_reports_stage_name() {
        let chain = Chain::single(StageSpec::new("ghost", "/no/such/binary"));
        let status = run_chain(&chain, None).await;
        match status {
            ChainStatus::LaunchFailure { stage, .. } => assert_eq!(stage, "ghost"),
            other => panic!("expected launch failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stdout_redirection_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let chain = Chain::single(
            StageSpec::new("emit", "sh")
                .args(["-c", "echo hello"])
                .stdout_to(&out),
        );

        assert_eq!(run_chain(&chain, None).await, ChainStatus::Success);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_piped_chain_feeds_downstream_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("piped.txt");
        let chain = Chain::piped(
            "pipe",
            vec![
                StageSpec::new("producer", "sh")
                    .args(["-c", "printf 'a\\nb\\n'"])
                    .stdout_to_pipe(),
                StageSpec::new("consumer", "cat")
                    .stdin_from_pipe()
                    .stdout_to(&out),
            ],
        );

        assert_eq!(run_chain(&chain, None).await, ChainStatus::Success);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn test_chain_success_is_terminal_stage_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("truncated.txt");
        // The upstream stage fails after writing; the chain still succeeds
        // because only the terminal exit status is checked.
        let chain = Chain::piped(
            "pipe",
            vec![
                StageSpec::new("broken-producer", "sh")
                    .args(["-c", "echo partial; exit 3"])
                    .stdout_to_pipe(),
                StageSpec::new("consumer", "cat")
                    .stdin_from_pipe()
                    .stdout_to(&out),
            ],
        );

        assert_eq!(run_chain(&chain, None).await, ChainStatus::Success);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "partial\n");
    }

    #[tokio::test]
    async fn test_stdin_redirection_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("copied.txt");
        std::fs::write(&input, "payload\n").unwrap();

        let chain = Chain::single(
            StageSpec::new("copy", "cat")
                .stdin_from(&input)
                .stdout_to(&out),
        );

        assert_eq!(run_chain(&chain, None).await, ChainStatus::Success);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "payload\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_chain() {
        let chain = Chain::single(StageSpec::new("sleeper", "sleep").arg("30"));
        let status = run_chain(&chain, Some(Duration::from_millis(50))).await;
        match status {
            ChainStatus::LaunchFailure { stage, reason } => {
                assert_eq!(stage, "sleeper");
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected timeout failure, got {other:?}"),
        }
    }
}
