//! Axum route handlers for the pipeline API.
//!
//! Each handler accepts a multipart CSV upload plus scalar query options,
//! runs one pipeline variant synchronously, and returns the result table as
//! a downloadable CSV attachment. Quota advisories travel in the
//! `x-quota-advisory` response header, out-of-band from cell data.

use std::ops::RangeInclusive;

use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::rewrite::{
    duplicate_listing, rewrite_combined, rewrite_variations, RewriteMode, TwoStepSession,
};
use crate::pipeline::split::job_split;
use crate::pipeline::PipelineOutput;
use crate::state::AppState;
use crate::table::Table;

pub const SPLIT_OUTPUT_FILE: &str = "ai_job_ads_output.csv";
pub const REWRITE_OUTPUT_FILE: &str = "ai_job_rewrite_output.csv";
pub const CATCHCOPY_OUTPUT_FILE: &str = "rewrite_pr_output.csv";

const QUOTA_ADVISORY_HEADER: &str = "x-quota-advisory";

// Count bounds per variant, from each one's original option range.
const DUPLICATE_COUNT_RANGE: RangeInclusive<usize> = 1..=10;
const TWO_STEP_COUNT_RANGE: RangeInclusive<usize> = 1..=10;
const COMBINED_COUNT_RANGE: RangeInclusive<usize> = 1..=5;
const VARIATIONS_COUNT_RANGE: RangeInclusive<usize> = 2..=10;

fn clamp_count(count: usize, range: RangeInclusive<usize>) -> usize {
    count.clamp(*range.start(), *range.end())
}

#[derive(Debug, Deserialize)]
pub struct CountParam {
    #[serde(default = "default_count")]
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TwoStepParams {
    #[serde(default = "default_count")]
    pub count: usize,
    /// When false, the title stage is skipped and the detail stage runs
    /// over the original title+detail pairs.
    #[serde(default = "default_true")]
    pub titles: bool,
}

fn default_count() -> usize {
    3
}

fn default_true() -> bool {
    true
}

/// Pulls the `file` field out of the multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            return Ok(field.bytes().await?);
        }
    }
    Err(AppError::Validation(
        "multipart upload must carry a 'file' field".to_string(),
    ))
}

/// Wraps a pipeline result as a CSV attachment response.
fn csv_attachment(output: PipelineOutput, filename: &str) -> Result<Response, AppError> {
    let bytes = output
        .table
        .to_csv()
        .map_err(|e| anyhow::anyhow!("failed to serialize output table: {e}"))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| anyhow::anyhow!("bad content-disposition: {e}"))?,
    );

    let mut advisories = output.advisories;
    advisories.dedup();
    if !advisories.is_empty() {
        headers.insert(
            HeaderName::from_static(QUOTA_ADVISORY_HEADER),
            HeaderValue::from_str(&advisories.join("; "))
                .map_err(|e| anyhow::anyhow!("bad advisory header: {e}"))?,
        );
    }

    Ok((headers, bytes).into_response())
}

/// POST /api/v1/pipelines/split
///
/// 業務分割: one output row per decomposed task.
pub async fn handle_split(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let bytes = read_upload(multipart).await?;
    let input = Table::from_csv(&bytes)?;
    info!("job_split: {} input rows", input.rows.len());

    let output = job_split(state.llm.as_ref(), state.tokenizer.as_ref(), &input).await?;
    csv_attachment(output, SPLIT_OUTPUT_FILE)
}

/// POST /api/v1/pipelines/duplicate?count=N
///
/// Early combined duplication: exactly N rows per input record.
pub async fn handle_duplicate(
    State(state): State<AppState>,
    Query(params): Query<CountParam>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let count = clamp_count(params.count, DUPLICATE_COUNT_RANGE);
    let bytes = read_upload(multipart).await?;
    let input = Table::from_csv(&bytes)?;
    info!("duplicate_listing: {} input rows, count={count}", input.rows.len());

    let output = duplicate_listing(state.llm.as_ref(), &input, count).await?;
    csv_attachment(output, REWRITE_OUTPUT_FILE)
}

/// POST /api/v1/pipelines/two-step?count=N&titles=true|false
///
/// Two-step rewrite. `titles=false` skips the title stage so the detail
/// stage runs over the original pairs.
pub async fn handle_two_step(
    State(state): State<AppState>,
    Query(params): Query<TwoStepParams>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let count = clamp_count(params.count, TWO_STEP_COUNT_RANGE);
    let bytes = read_upload(multipart).await?;
    let input = Table::from_csv(&bytes)?;
    info!(
        "two_step: {} input rows, count={count}, titles={}",
        input.rows.len(),
        params.titles
    );

    let mut session = TwoStepSession::from_table(&input)?;
    if params.titles {
        session.run_title_stage(state.llm.as_ref(), count).await;
    }
    let output = session.run_detail_stage(state.llm.as_ref()).await;
    csv_attachment(output, REWRITE_OUTPUT_FILE)
}

/// POST /api/v1/pipelines/rewrite-combined?count=N
///
/// Substitution-seeded variation. Count clamped to the original 1..=5 range.
pub async fn handle_rewrite_combined(
    State(state): State<AppState>,
    Query(params): Query<CountParam>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let count = clamp_count(params.count, COMBINED_COUNT_RANGE);
    let bytes = read_upload(multipart).await?;
    let input = Table::from_csv(&bytes)?;
    info!(
        "rewrite_combined: {} input rows, count={count}, dict entries={}",
        input.rows.len(),
        state.synonyms.len()
    );

    let mut rng = SmallRng::from_entropy();
    let output = rewrite_combined(
        state.llm.as_ref(),
        state.tokenizer.as_ref(),
        state.synonyms.as_ref(),
        &mut rng,
        &input,
        count,
    )
    .await?;
    csv_attachment(output, REWRITE_OUTPUT_FILE)
}

/// POST /api/v1/pipelines/rewrite-variations?count=N
///
/// Title-list-then-detail-per-title over job descriptions.
pub async fn handle_rewrite_variations(
    State(state): State<AppState>,
    Query(params): Query<CountParam>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let count = clamp_count(params.count, VARIATIONS_COUNT_RANGE);
    let bytes = read_upload(multipart).await?;
    let input = Table::from_csv(&bytes)?;
    info!(
        "rewrite_variations: {} input rows, count={count}",
        input.rows.len()
    );

    let output =
        rewrite_variations(state.llm.as_ref(), &input, count, RewriteMode::Listing).await?;
    csv_attachment(output, REWRITE_OUTPUT_FILE)
}

/// POST /api/v1/pipelines/rewrite-catchcopy?count=N
///
/// Same shape as rewrite-variations, but column 1 is a catch copy.
pub async fn handle_rewrite_catchcopy(
    State(state): State<AppState>,
    Query(params): Query<CountParam>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let count = clamp_count(params.count, VARIATIONS_COUNT_RANGE);
    let bytes = read_upload(multipart).await?;
    let input = Table::from_csv(&bytes)?;
    info!(
        "rewrite_catchcopy: {} input rows, count={count}",
        input.rows.len()
    );

    let output =
        rewrite_variations(state.llm.as_ref(), &input, count, RewriteMode::CatchCopy).await?;
    csv_attachment(output, CATCHCOPY_OUTPUT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::QUOTA_ADVISORY;

    #[test]
    fn test_csv_attachment_sets_disposition_and_advisory() {
        let mut output = PipelineOutput::new(vec!["a".into(), "b".into()]);
        output.push_row(vec!["1".into(), "2".into()]);
        output.advisories.push(QUOTA_ADVISORY.to_string());
        output.advisories.push(QUOTA_ADVISORY.to_string());

        let response = csv_attachment(output, REWRITE_OUTPUT_FILE).unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"ai_job_rewrite_output.csv\""
        );
        // repeated advisories collapse into one header value
        assert_eq!(
            headers.get(QUOTA_ADVISORY_HEADER).unwrap(),
            QUOTA_ADVISORY
        );
    }

    #[test]
    fn test_count_clamped_to_variant_ranges() {
        assert_eq!(clamp_count(0, DUPLICATE_COUNT_RANGE), 1);
        assert_eq!(clamp_count(11, TWO_STEP_COUNT_RANGE), 10);
        assert_eq!(clamp_count(0, COMBINED_COUNT_RANGE), 1);
        assert_eq!(clamp_count(9, COMBINED_COUNT_RANGE), 5);
        assert_eq!(clamp_count(3, COMBINED_COUNT_RANGE), 3);
        assert_eq!(clamp_count(1, VARIATIONS_COUNT_RANGE), 2);
        assert_eq!(clamp_count(99, VARIATIONS_COUNT_RANGE), 10);
    }

    #[test]
    fn test_csv_attachment_without_advisories_omits_header() {
        let output = PipelineOutput::new(vec!["a".into()]);
        let response = csv_attachment(output, SPLIT_OUTPUT_FILE).unwrap();
        assert!(response.headers().get(QUOTA_ADVISORY_HEADER).is_none());
    }
}
