//! # Rabeflow
//!
//! A sequential pipeline runner for rABE variant calling: orchestrates a
//! fixed sequence of external genomic-analysis tools (samtools, picard,
//! gatk, bcftools) to turn an aligned-read BAM into a filtered variant VCF.
//!
//! The crate is the execution engine, not the science:
//!
//! - **Stage model**: pure descriptions of external-process invocations
//!   with declared stream bindings
//! - **Chain runner**: pipe-connected process groups, pass/fail on the
//!   terminal stage's exit status
//! - **Sequential executor**: fail-fast, one chain at a time
//! - **Branch selection**: RNA samples get an extra read-splitting chain
//! - **Progress reporting**: elapsed-time-annotated audit trail
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rabeflow::prelude::*;
//!
//! let tools = ToolConfig::resolve(None)?;
//! prepare_environment(&bam, &out_dir)?;
//! let ctx = RunContext::new(SampleType::Rna, bam, out_dir, tools);
//! let plan = PipelinePlan::for_sample_type(&ctx);
//! let mut executor = SequentialExecutor::new(Reporter::from_origin(ctx.start), None);
//! let result = executor.run(&plan).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod executor;
pub mod plan;
pub mod prepare;
pub mod report;
pub mod runner;
pub mod stage;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::ToolConfig;
    pub use crate::context::{RunContext, SampleType};
    pub use crate::errors::{ConfigError, PipelineError};
    pub use crate::executor::{ExecutorState, RunResult, SequentialExecutor};
    pub use crate::plan::{PipelinePlan, PlannedChain};
    pub use crate::prepare::prepare_environment;
    pub use crate::report::Reporter;
    pub use crate::runner::{run_chain, ChainStatus};
    pub use crate::stage::{Chain, StageSpec, StderrSpec, StdinSpec, StdoutSpec};
}
