//! Run-scoped context shared by all stage builders.

use crate::config::ToolConfig;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use uuid::Uuid;

use crate::errors::PipelineError;

/// The kind of sequencing sample being processed.
///
/// A closed enum rather than a string tag so the branch selector consumes it
/// exhaustively and an unrecognized value cannot slip through silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleType {
    /// DNA sequencing sample.
    Dna,
    /// RNA sequencing sample; adds the read-splitting step.
    Rna,
}

impl FromStr for SampleType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dna" => Ok(Self::Dna),
            "rna" => Ok(Self::Rna),
            other => Err(PipelineError::UnsupportedSampleType(other.to_string())),
        }
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dna => write!(f, "dna"),
            Self::Rna => write!(f, "rna"),
        }
    }
}

/// Read-only context for a single pipeline run.
///
/// Created once at run start and handed to the stage builders; owns the
/// timing origin used for elapsed-time reporting and the derived output
/// file locations.
#[derive(Debug)]
pub struct RunContext {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// Wall-clock timestamp at run start.
    pub started_at: DateTime<Utc>,
    /// Monotonic timing origin for elapsed-time reporting.
    pub start: Instant,
    /// The sample type driving branch selection.
    pub sample_type: SampleType,
    /// The input alignment BAM.
    pub bam_path: PathBuf,
    /// The directory all pipeline outputs are written into.
    pub output_dir: PathBuf,
    /// Resolved external tool and reference locations.
    pub tools: ToolConfig,
}

impl RunContext {
    /// Creates a new run context with a fresh run id and timing origin.
    #[must_use]
    pub fn new(
        sample_type: SampleType,
        bam_path: PathBuf,
        output_dir: PathBuf,
        tools: ToolConfig,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            start: Instant::now(),
            sample_type,
            bam_path,
            output_dir,
            tools,
        }
    }

    /// The duplicate-marked alignment produced by the MarkDuplicates chain.
    #[must_use]
    pub fn mark_duplicates_bam(&self) -> PathBuf {
        self.output_dir.join("process.MarkDuplicate.bam")
    }

    /// The duplicate-marking metrics file.
    #[must_use]
    pub fn mark_duplicates_metrics(&self) -> PathBuf {
        self.output_dir.join("MarkDuplicates.metrics.txt")
    }

    /// The duplicate-marking stderr log.
    #[must_use]
    pub fn mark_duplicates_log(&self) -> PathBuf {
        self.output_dir.join("MarkDuplicates.log")
    }

    /// The intron-split alignment produced by the SplitNCigarReads chain.
    #[must_use]
    pub fn split_reads_bam(&self) -> PathBuf {
        self.output_dir.join("process.SplitNCigarReads.bam")
    }

    /// The read-splitting stderr log.
    #[must_use]
    pub fn split_reads_log(&self) -> PathBuf {
        self.output_dir.join("SplitNCigarReads.log")
    }

    /// The final filtered variant calls.
    #[must_use]
    pub fn vcf_path(&self) -> PathBuf {
        self.output_dir.join("mpileup.vcf")
    }

    /// The pileup stage's stderr log.
    #[must_use]
    pub fn bcftools_log(&self) -> PathBuf {
        self.output_dir.join("bcftools.log")
    }

    /// The alignment the variant-calling chain reads from: the split BAM for
    /// RNA samples, the duplicate-marked BAM otherwise.
    #[must_use]
    pub fn analysis_input(&self) -> PathBuf {
        match self.sample_type {
            SampleType::Rna => self.split_reads_bam(),
            SampleType::Dna => self.mark_duplicates_bam(),
        }
    }

    /// Elapsed wall-clock time since the run started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Borrowed view of the input BAM path.
    #[must_use]
    pub fn bam_path(&self) -> &Path {
        &self.bam_path
    }
}
