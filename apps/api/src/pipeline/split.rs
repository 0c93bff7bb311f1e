//! 業務分割 — decomposes each job posting into discrete tasks, explains
//! every task, and rewrites the explanation into ad copy.
//!
//! Flow per record: DecomposeTasks (one call) → re-title each task with the
//! source title's prefix/suffix → ExplainTask (one call per task) →
//! RewriteForAd (one call per task). One output row per task, grouped by
//! source record in input order.

use crate::llm_client::TextGenerator;
use crate::pipeline::prompts::{self, PromptIntent};
use crate::pipeline::{parse, PipelineOutput};
use crate::table::{Table, TableError};
use crate::tokenize::{extract_prefix_suffix, format_task, Tokenizer};

pub const SPLIT_TITLE_COLUMN: &str = "分割後の職種名";
pub const SPLIT_DETAIL_COLUMN: &str = "分割後の仕事詳細";

pub async fn job_split(
    llm: &dyn TextGenerator,
    tokenizer: &dyn Tokenizer,
    input: &Table,
) -> Result<PipelineOutput, TableError> {
    let records = input.job_records()?;

    let mut out = PipelineOutput::new(vec![
        input.headers[0].clone(),
        input.headers[1].clone(),
        SPLIT_TITLE_COLUMN.to_string(),
        SPLIT_DETAIL_COLUMN.to_string(),
    ]);

    for record in &records {
        let prompt = prompts::decompose_tasks(&record.title, &record.detail);
        let raw = match llm
            .generate(&prompt, PromptIntent::DecomposeTasks.temperature())
            .await
        {
            Ok(raw) => raw,
            Err(e) => out.note_failure(&e),
        };

        let mut tasks = parse::split_task_lines(&raw);
        if tasks.is_empty() {
            // A source record always yields at least one output row
            tasks.push(parse::MALFORMED_FIELD.to_string());
        }

        let (prefix, suffix) = extract_prefix_suffix(tokenizer, &record.title);

        for task in tasks {
            let formatted = format_task(&task, &prefix, &suffix);

            let explanation = match llm
                .generate(
                    &prompts::explain_task(&formatted, &record.detail),
                    PromptIntent::ExplainTask.temperature(),
                )
                .await
            {
                Ok(raw) => raw.trim().to_string(),
                Err(e) => out.note_failure(&e),
            };

            let ad_copy = match llm
                .generate(
                    &prompts::rewrite_for_ad(&explanation),
                    PromptIntent::RewriteForAd.temperature(),
                )
                .await
            {
                Ok(raw) => raw.trim().to_string(),
                Err(e) => out.note_failure(&e),
            };

            out.push_row(vec![
                record.title.clone(),
                record.detail.clone(),
                formatted,
                ad_copy,
            ]);
        }
    }

    Ok(out)
}
