//! Stage and chain models.
//!
//! A [`StageSpec`] is a pure description of one external-process invocation:
//! the program, its arguments, and the stream bindings. A [`Chain`] is one or
//! more stages connected stdout-to-stdin by pipes and evaluated as a single
//! pass/fail unit on the terminal stage's exit status. Nothing in this module
//! spawns a process.

use std::path::{Path, PathBuf};

/// Where a stage's stdin comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinSpec {
    /// Inherit the parent process's stdin.
    Inherit,
    /// Read from a file.
    FromFile(PathBuf),
    /// Read from the previous stage's stdout.
    FromPipe,
}

/// Where a stage's stdout goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutSpec {
    /// Inherit the parent process's stdout.
    Inherit,
    /// Write (truncating) to a file.
    ToFile(PathBuf),
    /// Feed the next stage's stdin.
    ToPipe,
}

/// Where a stage's stderr goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StderrSpec {
    /// Inherit the parent process's stderr.
    Inherit,
    /// Write (truncating) to a log file.
    ToFile(PathBuf),
}

/// An immutable description of a single external-process invocation.
#[derive(Debug, Clone)]
pub struct StageSpec {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    stdin: StdinSpec,
    stdout: StdoutSpec,
    stderr: StderrSpec,
}

impl StageSpec {
    /// Creates a stage with all streams inherited.
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            stdin: StdinSpec::Inherit,
            stdout: StdoutSpec::Inherit,
            stderr: StderrSpec::Inherit,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Binds stdin to a file.
    #[must_use]
    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = StdinSpec::FromFile(path.into());
        self
    }

    /// Binds stdin to the previous stage's stdout.
    #[must_use]
    pub fn stdin_from_pipe(mut self) -> Self {
        self.stdin = StdinSpec::FromPipe;
        self
    }

    /// Binds stdout to a file.
    #[must_use]
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = StdoutSpec::ToFile(path.into());
        self
    }

    /// Binds stdout to the next stage's stdin.
    #[must_use]
    pub fn stdout_to_pipe(mut self) -> Self {
        self.stdout = StdoutSpec::ToPipe;
        self
    }

    /// Binds stderr to a log file.
    #[must_use]
    pub fn stderr_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr = StderrSpec::ToFile(path.into());
        self
    }

    /// The stage's name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The program to launch.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The program's arguments, in order.
    #[must_use]
    pub fn args_slice(&self) -> &[String] {
        &self.args
    }

    /// The stdin binding.
    #[must_use]
    pub fn stdin(&self) -> &StdinSpec {
        &self.stdin
    }

    /// The stdout binding.
    #[must_use]
    pub fn stdout(&self) -> &StdoutSpec {
        &self.stdout
    }

    /// The stderr binding.
    #[must_use]
    pub fn stderr(&self) -> &StderrSpec {
        &self.stderr
    }
}

/// One or more stages connected by pipes, evaluated as a single unit.
///
/// Invariant: a chain has at least one stage; success is defined by the exit
/// status of the last (terminal) stage only. Intermediate failures inside a
/// chain are not individually observed, matching pipe semantics.
#[derive(Debug, Clone)]
pub struct Chain {
    name: String,
    stages: Vec<StageSpec>,
}

impl Chain {
    /// Creates a single-stage chain named after its stage.
    #[must_use]
    pub fn single(stage: StageSpec) -> Self {
        Self {
            name: stage.name().to_string(),
            stages: vec![stage],
        }
    }

    /// Creates a multi-stage piped chain.
    ///
    /// # Panics
    ///
    /// Panics if `stages` is empty, if a non-terminal stage does not pipe
    /// its stdout, or if a non-initial stage does not read its stdin from
    /// the pipe. Chains are constructed by the static stage builders, so a
    /// violation is a programming error, not a runtime condition.
    #[must_use]
    pub fn piped(name: impl Into<String>, stages: Vec<StageSpec>) -> Self {
        assert!(!stages.is_empty(), "a chain needs at least one stage");
        let last = stages.len() - 1;
        for (i, stage) in stages.iter().enumerate() {
            if i < last {
                assert!(
                    *stage.stdout() == StdoutSpec::ToPipe,
                    "non-terminal stage '{}' must pipe its stdout",
                    stage.name()
                );
            }
            if i > 0 {
                assert!(
                    *stage.stdin() == StdinSpec::FromPipe,
                    "non-initial stage '{}' must read stdin from the pipe",
                    stage.name()
                );
            }
        }
        Self {
            name: name.into(),
            stages,
        }
    }

    /// The chain's name, used in progress reporting and diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// The terminal stage whose exit status defines the chain's outcome.
    #[must_use]
    pub fn terminal_stage(&self) -> &StageSpec {
        // Non-empty by construction.
        &self.stages[self.stages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stage_builder_accumulates_args() {
        let stage = StageSpec::new("index", "samtools")
            .arg("index")
            .args(["-@", "6"])
            .arg("/data/sample.bam");

        assert_eq!(stage.name(), "index");
        assert_eq!(stage.program(), Path::new("samtools"));
        assert_eq!(
            stage.args_slice(),
            &["index", "-@", "6", "/data/sample.bam"]
        );
        assert_eq!(*stage.stdin(), StdinSpec::Inherit);
        assert_eq!(*stage.stdout(), StdoutSpec::Inherit);
        assert_eq!(*stage.stderr(), StderrSpec::Inherit);
    }

    #[test]
    fn test_single_chain_takes_stage_name() {
        let chain = Chain::single(StageSpec::new("index", "samtools"));
        assert_eq!(chain.name(), "index");
        assert_eq!(chain.stages().len(), 1);
        assert_eq!(chain.terminal_stage().name(), "index");
    }

    #[test]
    fn test_piped_chain_terminal_stage_is_last() {
        let chain = Chain::piped(
            "call",
            vec![
                StageSpec::new("pileup", "bcftools").stdout_to_pipe(),
                StageSpec::new("filter", "bcftools").stdin_from_pipe(),
            ],
        );
        assert_eq!(chain.terminal_stage().name(), "filter");
    }

    #[test]
    #[should_panic(expected = "must pipe its stdout")]
    fn test_piped_chain_rejects_unpiped_upstream() {
        let _ = Chain::piped(
            "bad",
            vec![
                StageSpec::new("a", "true"),
                StageSpec::new("b", "true").stdin_from_pipe(),
            ],
        );
    }
}
