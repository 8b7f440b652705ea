// src/envelope/decode.rs

use anyhow::{Context, Result};
use tracing::warn;

use crate::envelope::model::{CrawlResult, ProcInfo};
use crate::exec::ProcessResult;

/// Decode an execute stage's captured stdout into a [`CrawlResult`].
///
/// The captured stdout must hold a single JSON document in the envelope
/// schema; anything else is a decode error surfaced with the raw serde
/// reason.
///
/// On success the embedded `procinfo` is overwritten with the metadata the
/// pipeline itself captured from the execute stage, so persisted records
/// always carry accurate command/exit-status provenance rather than whatever
/// the collector reported about itself.
///
/// A payload whose agency/month/year disagree with the invocation parameters
/// is accepted but logged as a warning; the collector is trusted to know
/// what it actually scraped.
pub fn decode_crawl_result(
    execution: &ProcessResult,
    job: &str,
    month: u32,
    year: i32,
) -> Result<CrawlResult> {
    let mut result: CrawlResult = serde_json::from_slice(&execution.stdout)
        .context("unmarshalling crawling result from stdout")?;

    if result.agency_id != job || result.month != month || result.year != year {
        warn!(
            job = %job,
            month,
            year,
            payload_aid = %result.agency_id,
            payload_month = result.month,
            payload_year = result.year,
            "decoded payload disagrees with invocation parameters"
        );
    }

    result.proc_info = ProcInfo::from_process(execution);
    Ok(result)
}
