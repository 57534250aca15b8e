//! Stage builders and branch selection.
//!
//! Each external step is a pure builder `(&RunContext) -> Chain`: a
//! deterministic function of the context that executes nothing, so argument
//! construction is unit-testable without spawning processes.
//! [`PipelinePlan::for_sample_type`] assembles the fixed, ordered chain list
//! for a run.

use crate::context::{RunContext, SampleType};
use crate::stage::{Chain, StageSpec};

/// Annotation fields requested from the pileup stage.
const MPILEUP_ANNOTATIONS: &str = "DP,AD,ADF,ADR,SP,INFO/AD,INFO/ADF,INFO/ADR";

/// Per-position depth cap for the pileup stage.
const MPILEUP_MAX_DEPTH: &str = "10000000";

/// Inclusion expression applied by the filter stage.
const FILTER_EXPRESSION: &str = "INFO/AD[1-]>2 & MAX(FORMAT/DP)>20";

/// Indexes the input BAM with samtools.
///
/// All streams are inherited; samtools writes the index next to the input
/// file. Indexing failures are chain-checked and fatal like any other chain.
#[must_use]
pub fn index_chain(ctx: &RunContext) -> Chain {
    Chain::single(
        StageSpec::new("samtools index", &ctx.tools.samtools)
            .arg("index")
            .arg("-@")
            .arg(ctx.tools.index_threads.to_string())
            .arg(ctx.bam_path().display().to_string()),
    )
}

/// Marks duplicate reads with picard, writing the processed BAM and a
/// metrics file into the output directory. Stderr goes to a log file.
#[must_use]
pub fn mark_duplicates_chain(ctx: &RunContext) -> Chain {
    Chain::single(
        StageSpec::new("MarkDuplicates", &ctx.tools.java)
            .arg("-jar")
            .arg(ctx.tools.picard_jar.display().to_string())
            .arg("MarkDuplicates")
            .arg("-I")
            .arg(ctx.bam_path().display().to_string())
            .arg("-M")
            .arg(ctx.mark_duplicates_metrics().display().to_string())
            .arg("-O")
            .arg(ctx.mark_duplicates_bam().display().to_string())
            .stderr_to(ctx.mark_duplicates_log()),
    )
}

/// Splits reads spanning introns with gatk. RNA samples only; reads the
/// duplicate-marked BAM and writes a new processed BAM.
#[must_use]
pub fn split_reads_chain(ctx: &RunContext) -> Chain {
    Chain::single(
        StageSpec::new("SplitNCigarReads", &ctx.tools.java)
            .arg("-jar")
            .arg(ctx.tools.gatk_jar.display().to_string())
            .arg("SplitNCigarReads")
            .arg("-I")
            .arg(ctx.mark_duplicates_bam().display().to_string())
            .arg("-O")
            .arg(ctx.split_reads_bam().display().to_string())
            .arg("-R")
            .arg(ctx.tools.reference.display().to_string())
            .stderr_to(ctx.split_reads_log()),
    )
}

/// Calls and filters variants as a two-stage pipe.
///
/// `bcftools mpileup` streams an uncompressed VCF into `bcftools filter`;
/// the filter stage writes the final VCF. Success is the filter stage's
/// exit status only; a pileup failure surfaces downstream as a broken or
/// truncated pipe. The filter stage emits nothing log-worthy on stderr, so
/// only the pileup stage's stderr is redirected.
#[must_use]
pub fn call_variants_chain(ctx: &RunContext) -> Chain {
    let pileup = StageSpec::new("bcftools mpileup", &ctx.tools.bcftools)
        .arg("mpileup")
        .arg("-f")
        .arg(ctx.tools.reference.display().to_string())
        .arg("-d")
        .arg(MPILEUP_MAX_DEPTH)
        .arg("-I")
        .arg("-a")
        .arg(MPILEUP_ANNOTATIONS)
        .arg(ctx.analysis_input().display().to_string())
        .args(["-O", "v"])
        .stdout_to_pipe()
        .stderr_to(ctx.bcftools_log());

    let filter = StageSpec::new("bcftools filter", &ctx.tools.bcftools)
        .arg("filter")
        .arg("-i")
        .arg(FILTER_EXPRESSION)
        .args(["-O", "v"])
        .arg("-")
        .stdin_from_pipe()
        .stdout_to(ctx.vcf_path());

    Chain::piped("variant calling", vec![pileup, filter])
}

/// One chain of the plan together with its operator-facing description.
#[derive(Debug, Clone)]
pub struct PlannedChain {
    /// The progress message printed before the chain runs.
    pub description: String,
    /// The chain itself.
    pub chain: Chain,
}

impl PlannedChain {
    fn new(description: impl Into<String>, chain: Chain) -> Self {
        Self {
            description: description.into(),
            chain,
        }
    }
}

/// The ordered chain list for one run.
///
/// Built once from the sample type; the order is fixed and deterministic.
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    chains: Vec<PlannedChain>,
}

impl PipelinePlan {
    /// Selects the chains for the context's sample type.
    ///
    /// DNA runs index, duplicate-marking, and variant calling; RNA inserts
    /// read-splitting before variant calling, which then reads the split
    /// BAM instead of the duplicate-marked one.
    #[must_use]
    pub fn for_sample_type(ctx: &RunContext) -> Self {
        let mut chains = vec![
            PlannedChain::new("Indexing input BAM...", index_chain(ctx)),
            PlannedChain::new("Marking duplicate...", mark_duplicates_chain(ctx)),
        ];

        match ctx.sample_type {
            SampleType::Rna => {
                chains.push(PlannedChain::new(
                    "Splitting reads spanning intron...",
                    split_reads_chain(ctx),
                ));
            }
            SampleType::Dna => {}
        }

        chains.push(PlannedChain::new(
            "Calling variants against reference genome...",
            call_variants_chain(ctx),
        ));

        Self { chains }
    }

    /// Builds a plan from an explicit chain list, for embedders and tests
    /// that assemble their own chains.
    #[must_use]
    pub fn from_chains(chains: Vec<PlannedChain>) -> Self {
        Self { chains }
    }

    /// The chains in execution order.
    #[must_use]
    pub fn chains(&self) -> &[PlannedChain] {
        &self.chains
    }

    /// The number of chains in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the plan is empty; never true for a built plan.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
