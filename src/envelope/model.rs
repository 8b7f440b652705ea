// src/envelope/model.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::exec::ProcessResult;

/// The decoded payload produced by one job's execution stage.
///
/// This is what a collector must print to stdout as a single JSON document.
/// Ownership passes to the persistence gateway once decoded; the pipeline
/// never inspects the collected records beyond parsing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Agency identifier, e.g. `"trt13"`.
    #[serde(rename = "aid")]
    pub agency_id: String,
    pub month: u32,
    pub year: i32,
    pub crawler: Crawler,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    pub timestamp: DateTime<Utc>,
    /// Execution provenance. Whatever the collector itself reported here is
    /// replaced by the pipeline's own captured metadata before storage.
    #[serde(rename = "procinfo", default)]
    pub proc_info: ProcInfo,
}

/// Identity of the crawler that produced a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crawler {
    pub id: String,
    pub version: String,
}

/// One extracted employee/payment record.
///
/// The pipeline treats the monetary details as opaque; they are kept as raw
/// JSON values and validated, if at all, by the persistence backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub reg: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub workplace: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<serde_json::Value>,
}

/// Captured command/exit-status provenance persisted with every result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcInfo {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// Command line as a single string.
    #[serde(default)]
    pub cmd: String,
    /// Directory the command ran in.
    #[serde(default)]
    pub cmddir: String,
    #[serde(default)]
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<String>>,
}

impl ProcInfo {
    /// Build provenance from a captured [`ProcessResult`].
    ///
    /// Streams are stored lossily as UTF-8; collectors emit text on both.
    pub fn from_process(result: &ProcessResult) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            cmd: result.command_line(),
            cmddir: result.dir.display().to_string(),
            status: result.status,
            env: result.env.clone(),
        }
    }
}
