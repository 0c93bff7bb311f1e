//! 言い換え複製 — the duplication/variation pipelines. Four shapes over the
//! same primitives:
//!
//! - [`duplicate_listing`]: N combined title+detail calls per record, each
//!   parsed as labeled lines (the earliest version).
//! - [`TwoStepSession`]: independently triggerable title and detail stages.
//! - [`rewrite_combined`]: synonym-substituted title candidates normalized
//!   by the LLM, paired with an unrelated detail rewrite.
//! - [`rewrite_variations`]: one batched title-variation call, then one
//!   detail (or catch-copy) rewrite per returned title.

use rand::Rng;

use crate::llm_client::TextGenerator;
use crate::pipeline::prompts::{self, PromptIntent};
use crate::pipeline::{parse, PipelineOutput};
use crate::synonyms::SynonymDict;
use crate::table::{JobRecord, Table, TableError};
use crate::tokenize::Tokenizer;

pub const SOURCE_TITLE_COLUMN: &str = "元の職種名";
pub const SOURCE_DETAIL_COLUMN: &str = "元の仕事内容";
pub const VARIANT_TITLE_COLUMN: &str = "複製の職種名";
pub const VARIANT_DETAIL_COLUMN: &str = "複製の仕事内容";
pub const SOURCE_CATCHCOPY_COLUMN: &str = "元のキャッチコピー";
pub const VARIANT_CATCHCOPY_COLUMN: &str = "複製のキャッチコピー";

/// What column 1 of the input holds, and how the per-variant detail call is
/// prompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// Column 1 is a job description; the detail call pairs the variant
    /// title with the original description.
    Listing,
    /// Column 1 is a catch copy; the detail call rewrites the copy alone.
    CatchCopy,
}

impl RewriteMode {
    pub fn source_detail_column(self) -> &'static str {
        match self {
            RewriteMode::Listing => SOURCE_DETAIL_COLUMN,
            RewriteMode::CatchCopy => SOURCE_CATCHCOPY_COLUMN,
        }
    }

    pub fn variant_detail_column(self) -> &'static str {
        match self {
            RewriteMode::Listing => VARIANT_DETAIL_COLUMN,
            RewriteMode::CatchCopy => VARIANT_CATCHCOPY_COLUMN,
        }
    }

    fn detail_prompt(self, variant_title: &str, record: &JobRecord) -> String {
        match self {
            RewriteMode::Listing => prompts::rewrite_listing(variant_title, &record.detail),
            RewriteMode::CatchCopy => prompts::rewrite_catchphrase(&record.detail),
        }
    }

    fn detail_intent(self) -> PromptIntent {
        match self {
            RewriteMode::Listing => PromptIntent::RewriteListing,
            RewriteMode::CatchCopy => PromptIntent::RewriteCatchphrase,
        }
    }
}

fn variation_headers(mode: RewriteMode) -> Vec<String> {
    vec![
        SOURCE_TITLE_COLUMN.to_string(),
        mode.source_detail_column().to_string(),
        VARIANT_TITLE_COLUMN.to_string(),
        mode.variant_detail_column().to_string(),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Fixed-count duplication (early combined version)
// ────────────────────────────────────────────────────────────────────────────

/// Repeats one combined DuplicateListing call `count` times per record. The
/// response is parsed as labeled title/detail lines; a malformed or failed
/// call still produces its row, so the output is always `records × count`
/// rows.
pub async fn duplicate_listing(
    llm: &dyn TextGenerator,
    input: &Table,
    count: usize,
) -> Result<PipelineOutput, TableError> {
    let records = input.job_records()?;
    let mut out = PipelineOutput::new(variation_headers(RewriteMode::Listing));

    for record in &records {
        for _ in 0..count {
            let prompt = prompts::duplicate_listing(&record.title, &record.detail);
            let (variant_title, variant_detail) = match llm
                .generate(&prompt, PromptIntent::DuplicateListing.temperature())
                .await
            {
                Ok(raw) => parse::parse_labeled_pair(&raw),
                Err(e) => {
                    let marker = out.note_failure(&e);
                    (marker.clone(), marker)
                }
            };

            out.push_row(vec![
                record.title.clone(),
                record.detail.clone(),
                variant_title,
                variant_detail,
            ]);
        }
    }

    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Two-step session: title stage and detail stage, independently triggerable
// ────────────────────────────────────────────────────────────────────────────

/// Pipeline-run state for the two-step rewrite: the title stage and the
/// detail stage can be run (and reset) independently. The detail stage
/// falls back to the original titles when the title stage has not run.
///
/// Owned by a single invocation — never shared between concurrent runs.
#[derive(Debug)]
pub struct TwoStepSession {
    records: Vec<JobRecord>,
    title_variations: Option<Vec<Vec<String>>>,
    advisories: Vec<String>,
}

impl TwoStepSession {
    pub fn new(records: Vec<JobRecord>) -> Self {
        Self {
            records,
            title_variations: None,
            advisories: Vec::new(),
        }
    }

    pub fn from_table(input: &Table) -> Result<Self, TableError> {
        Ok(Self::new(input.job_records()?))
    }

    pub fn has_title_variations(&self) -> bool {
        self.title_variations.is_some()
    }

    /// Title stage: `count` independent single-variant calls per record —
    /// one call per desired variant, not a single batched call.
    pub async fn run_title_stage(&mut self, llm: &dyn TextGenerator, count: usize) {
        let mut all = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut variants = Vec::with_capacity(count);
            for _ in 0..count {
                let prompt = prompts::title_variations(&record.title, 1);
                let variant = match llm
                    .generate(&prompt, PromptIntent::GenerateTitleVariations.temperature())
                    .await
                {
                    Ok(raw) => parse::clean_variant_title(&raw),
                    Err(e) => {
                        if e.is_quota() {
                            self.advisories.push(super::QUOTA_ADVISORY.to_string());
                        }
                        format!("[ERROR] {e}")
                    }
                };
                variants.push(variant);
            }
            all.push(variants);
        }
        self.title_variations = Some(all);
    }

    pub fn reset_title_stage(&mut self) {
        self.title_variations = None;
    }

    pub fn reset(&mut self) {
        self.title_variations = None;
        self.advisories.clear();
    }

    /// Detail stage: one pair-rewrite call per (title, original detail)
    /// pair. Uses the title-stage output when present, the original titles
    /// otherwise.
    pub async fn run_detail_stage(&self, llm: &dyn TextGenerator) -> PipelineOutput {
        let mut out = PipelineOutput::new(variation_headers(RewriteMode::Listing));
        out.advisories.extend(self.advisories.iter().cloned());

        for (i, record) in self.records.iter().enumerate() {
            let titles: Vec<String> = match &self.title_variations {
                Some(all) => all[i].clone(),
                None => vec![record.title.clone()],
            };

            for pair_title in titles {
                let prompt = prompts::rewrite_listing(&pair_title, &record.detail);
                let variant_detail = match llm
                    .generate(&prompt, PromptIntent::RewriteListing.temperature())
                    .await
                {
                    Ok(raw) => raw.trim().to_string(),
                    Err(e) => out.note_failure(&e),
                };

                out.push_row(vec![
                    record.title.clone(),
                    record.detail.clone(),
                    pair_title,
                    variant_detail,
                ]);
            }
        }

        out
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Substitution-seeded variation
// ────────────────────────────────────────────────────────────────────────────

/// Per record: tokenize the title once, then `count` times substitute
/// synonyms into the tokens, normalize the candidate through the LLM (with
/// the one-shot banned-phrase retry), and independently rewrite the ORIGINAL
/// title+detail pair for the detail column. The two calls per iteration are
/// unrelated in content.
pub async fn rewrite_combined<R: Rng + ?Sized>(
    llm: &dyn TextGenerator,
    tokenizer: &dyn Tokenizer,
    dict: &SynonymDict,
    rng: &mut R,
    input: &Table,
    count: usize,
) -> Result<PipelineOutput, TableError> {
    let records = input.job_records()?;
    let mut out = PipelineOutput::new(variation_headers(RewriteMode::Listing));

    for record in &records {
        let tokens = tokenizer.tokenize(&record.title);

        for _ in 0..count {
            let candidate = dict.substitute(&tokens, rng);

            let variant_title = match llm
                .generate(
                    &prompts::normalize_title(&candidate),
                    PromptIntent::NormalizeTitle.temperature(),
                )
                .await
            {
                Ok(raw) => {
                    let title = parse::clean_variant_title(&raw);
                    if parse::needs_title_fix(&title) {
                        // at most one corrective retry per title
                        match llm
                            .generate(
                                &prompts::retry_invalid_title(&title),
                                PromptIntent::RetryInvalidTitle.temperature(),
                            )
                            .await
                        {
                            Ok(retry) => parse::first_line(&retry).to_string(),
                            Err(e) => out.note_failure(&e),
                        }
                    } else {
                        title
                    }
                }
                Err(e) => out.note_failure(&e),
            };

            let variant_detail = match llm
                .generate(
                    &prompts::rewrite_listing(&record.title, &record.detail),
                    PromptIntent::RewriteListing.temperature(),
                )
                .await
            {
                Ok(raw) => raw.trim().to_string(),
                Err(e) => out.note_failure(&e),
            };

            out.push_row(vec![
                record.title.clone(),
                record.detail.clone(),
                variant_title,
                variant_detail,
            ]);
        }
    }

    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Title-list-then-detail-per-title
// ────────────────────────────────────────────────────────────────────────────

/// Per record: one GenerateTitleVariations call yields up to `count` titles,
/// then one detail rewrite per title actually returned. A shortfall is
/// accepted, never padded — calls per record = 1 + returned titles.
pub async fn rewrite_variations(
    llm: &dyn TextGenerator,
    input: &Table,
    count: usize,
    mode: RewriteMode,
) -> Result<PipelineOutput, TableError> {
    let records = input.job_records()?;
    let mut out = PipelineOutput::new(variation_headers(mode));

    for record in &records {
        let titles = match llm
            .generate(
                &prompts::title_variations(&record.title, count),
                PromptIntent::GenerateTitleVariations.temperature(),
            )
            .await
        {
            Ok(raw) => {
                let titles = parse::split_variation_lines(&raw, count);
                if titles.is_empty() {
                    vec![parse::MALFORMED_FIELD.to_string()]
                } else {
                    titles
                }
            }
            Err(e) => {
                let marker = out.note_failure(&e);
                vec![marker; count]
            }
        };

        for variant_title in titles {
            let variant_detail = match llm
                .generate(
                    &mode.detail_prompt(&variant_title, record),
                    mode.detail_intent().temperature(),
                )
                .await
            {
                Ok(raw) => raw.trim().to_string(),
                Err(e) => out.note_failure(&e),
            };

            out.push_row(vec![
                record.title.clone(),
                record.detail.clone(),
                variant_title,
                variant_detail,
            ]);
        }
    }

    Ok(out)
}
