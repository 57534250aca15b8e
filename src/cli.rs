//! Command-line surface and top-level run orchestration.
//!
//! Kept in the library so argument handling and the full run sequence are
//! testable without spawning the binary.

use crate::config::ToolConfig;
use crate::context::{RunContext, SampleType};
use crate::errors::PipelineError;
use crate::executor::{RunResult, SequentialExecutor};
use crate::plan::PipelinePlan;
use crate::prepare::prepare_environment;
use crate::report::Reporter;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Run the rABE variant-calling pipeline on one aligned sample.
#[derive(Debug, Parser)]
#[command(name = "rabeflow", version, about)]
pub struct Cli {
    /// Sample type; rna adds the intron read-splitting step.
    #[arg(value_enum)]
    pub sample_type: SampleType,

    /// Aligned, sorted input BAM.
    pub bam_path: PathBuf,

    /// Directory pipeline outputs are written into (created if missing).
    pub output_dir: PathBuf,

    /// JSON file with tool and reference locations.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Kill any chain still running after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log at debug level instead of info.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs the whole pipeline for the parsed arguments.
///
/// Sequence: resolve configuration, validate the environment, build the
/// run context and plan, then execute the chains fail-fast. Errors carry
/// their own exit-status mapping; the caller decides what to do with it.
pub async fn execute(cli: &Cli) -> Result<RunResult, PipelineError> {
    let tools = ToolConfig::resolve(cli.config.as_deref())?;

    prepare_environment(&cli.bam_path, &cli.output_dir)?;

    let ctx = RunContext::new(
        cli.sample_type,
        cli.bam_path.clone(),
        cli.output_dir.clone(),
        tools,
    );
    tracing::info!(
        run_id = %ctx.run_id,
        sample_type = %ctx.sample_type,
        started_at = %ctx.started_at.to_rfc3339(),
        bam = %ctx.bam_path.display(),
        "starting pipeline run"
    );

    let plan = PipelinePlan::for_sample_type(&ctx);
    let reporter = Reporter::from_origin(ctx.start);
    let timeout = cli.timeout_secs.map(Duration::from_secs);

    let mut executor = SequentialExecutor::new(reporter, timeout);
    executor.run(&plan).await.into_outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parses_positional_arguments() {
        let cli = Cli::try_parse_from(["rabeflow", "rna", "/data/s.bam", "/out"]).unwrap();
        assert!(matches!(cli.sample_type, SampleType::Rna));
        assert_eq!(cli.bam_path, PathBuf::from("/data/s.bam"));
        assert_eq!(cli.output_dir, PathBuf::from("/out"));
        assert!(cli.config.is_none());
        assert!(cli.timeout_secs.is_none());
    }

    #[test]
    fn test_too_few_arguments_is_a_usage_error() {
        let err = Cli::try_parse_from(["rabeflow", "dna", "/data/s.bam"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_sample_type_is_rejected() {
        let err = Cli::try_parse_from(["rabeflow", "protein", "/data/s.bam", "/out"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
