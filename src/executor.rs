//! Sequential fail-fast execution of a pipeline plan.

use crate::errors::PipelineError;
use crate::plan::PipelinePlan;
use crate::report::Reporter;
use crate::runner::{run_chain, ChainStatus};
use std::time::Duration;

/// Executor state, advanced one chain at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorState {
    /// No chain has started yet.
    Pending,
    /// The chain at this index is running.
    Running(usize),
    /// Every chain completed successfully.
    Succeeded,
    /// The named chain failed; no later chain was launched.
    Failed(String),
}

/// The terminal summary of a run, produced exactly once.
#[derive(Debug)]
pub struct RunResult {
    /// Whether every chain completed successfully.
    pub completed: bool,
    /// The failing chain's name, if any.
    pub failed_chain: Option<String>,
    /// The typed failure, if any; callers decide exit-status mapping.
    pub error: Option<PipelineError>,
    /// How many chains were launched.
    pub chains_run: usize,
    /// Total wall-clock time of the run.
    pub elapsed: Duration,
}

impl RunResult {
    /// Consumes the result, yielding `Ok` on completion or the typed
    /// failure otherwise.
    pub fn into_outcome(mut self) -> Result<Self, PipelineError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Runs the plan's chains strictly in order, stopping at the first failure.
///
/// Chains never overlap: each is fully awaited before the next begins. The
/// only concurrency is inside a piped chain, where the connected stages run
/// as producer and consumer. Progress is reported before each chain with
/// the elapsed time since the reporter's origin.
#[derive(Debug)]
pub struct SequentialExecutor {
    reporter: Reporter,
    timeout: Option<Duration>,
    state: ExecutorState,
}

impl SequentialExecutor {
    /// Creates an executor reporting through `reporter`, with an optional
    /// per-chain timeout.
    #[must_use]
    pub fn new(reporter: Reporter, timeout: Option<Duration>) -> Self {
        Self {
            reporter,
            timeout,
            state: ExecutorState::Pending,
        }
    }

    /// The executor's current state.
    #[must_use]
    pub fn state(&self) -> &ExecutorState {
        &self.state
    }

    /// Executes the plan.
    ///
    /// On the first non-success chain status the executor transitions to
    /// `Failed` and launches nothing further; the typed failure travels in
    /// the returned [`RunResult`]. Partially produced files are left in
    /// place for inspection.
    pub async fn run(&mut self, plan: &PipelinePlan) -> RunResult {
        let mut chains_run = 0;

        for (index, planned) in plan.chains().iter().enumerate() {
            self.state = ExecutorState::Running(index);
            self.reporter.progress(&planned.description);
            tracing::debug!(chain = planned.chain.name(), index, "launching chain");

            chains_run += 1;
            let status = run_chain(&planned.chain, self.timeout).await;
            match status {
                ChainStatus::Success => {}
                ChainStatus::NonZeroExit { code } => {
                    let name = planned.chain.name().to_string();
                    tracing::error!(chain = %name, code, "chain exited non-zero");
                    return self.fail(
                        name.clone(),
                        PipelineError::StageExitNonZero { chain: name, code },
                        chains_run,
                    );
                }
                ChainStatus::LaunchFailure { stage, reason } => {
                    let name = planned.chain.name().to_string();
                    tracing::error!(chain = %name, stage = %stage, "chain could not launch");
                    return self.fail(
                        name,
                        PipelineError::ProcessLaunch { stage, reason },
                        chains_run,
                    );
                }
            }
        }

        self.state = ExecutorState::Succeeded;
        self.reporter.progress("Done.");
        RunResult {
            completed: true,
            failed_chain: None,
            error: None,
            chains_run,
            elapsed: self.reporter.elapsed(),
        }
    }

    fn fail(&mut self, chain: String, error: PipelineError, chains_run: usize) -> RunResult {
        self.state = ExecutorState::Failed(chain.clone());
        RunResult {
            completed: false,
            failed_chain: Some(chain),
            error: Some(error),
            chains_run,
            elapsed: self.reporter.elapsed(),
        }
    }
}
