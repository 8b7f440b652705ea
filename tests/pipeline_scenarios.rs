use std::error::Error;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use tracing_subscriber::fmt::MakeWriter;
use coletor::config::model::{BlobSection, DatabaseSection, RunnerSection, Settings};
use coletor::envelope::CrawlResult;
use coletor::pipeline::Orchestrator;
use coletor::storage::StorageClient;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

/// Gateway double that records everything it is asked to store.
#[derive(Default)]
struct MemoryStorage {
    stored: Mutex<Vec<CrawlResult>>,
}

impl MemoryStorage {
    fn stored(&self) -> Vec<CrawlResult> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn store(&self, result: CrawlResult) -> anyhow::Result<()> {
        self.stored.lock().unwrap().push(result);
        Ok(())
    }
}

/// Gateway double whose store call always fails.
struct FailingStorage;

#[async_trait]
impl StorageClient for FailingStorage {
    async fn store(&self, _result: CrawlResult) -> anyhow::Result<()> {
        Err(anyhow!("database unavailable"))
    }
}

/// Shell script standing in for the container tool.
///
/// `build` fails for the `mppe` image (after printing to both streams);
/// `run` emits a valid result envelope and records the image name in a
/// `ran` marker file next to the script, so tests can assert which jobs
/// ever reached the execute stage.
const STUB_TOOL: &str = r#"#!/bin/sh
mode="$1"
shift
if [ "$mode" = "build" ]; then
    # build --build-arg REVISION=<rev> -t <image> .
    image="$4"
    echo "pulling base image for $image"
    if [ "$image" = "mppe" ]; then
        echo "unable to resolve base image" >&2
        exit 1
    fi
    exit 0
fi
# run -v <vol>:/output --rm -e OUTPUT_FOLDER=<dir> --env-file=<f> <image> --month=<m> --year=<y>
image="$7"
month="${8#--month=}"
year="${9#--year=}"
echo "$image" >> "$(dirname "$0")/ran"
printf '{"aid":"%s","month":%s,"year":%s,"crawler":{"id":"%s","version":"test"},"files":["%s-contracheque.xlsx"],"employees":[],"timestamp":"2019-02-28T12:00:00Z"}\n' \
    "$image" "$month" "$year" "$image" "$image"
"#;

/// Collects formatted log output so tests can assert on emitted lines.
///
/// These tests run on the single-threaded test runtime, so a thread-local
/// default subscriber (`set_default`) sees the log calls of every pipeline
/// task spawned during the run.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> LogBuffer {
        self.clone()
    }
}

fn capture_logs(buffer: &LogBuffer) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(buffer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

struct Fixture {
    _dir: TempDir,
    tool: PathBuf,
    output: PathBuf,
    jobs: Vec<PathBuf>,
}

fn fixture(job_names: &[&str]) -> Result<Fixture, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;

    let tool = dir.path().join("tool.sh");
    fs::write(&tool, STUB_TOOL)?;
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755))?;

    let output = dir.path().join("out");
    fs::create_dir(&output)?;

    let mut jobs = Vec::new();
    for name in job_names {
        let job_dir = dir.path().join("coletores").join(name);
        fs::create_dir_all(&job_dir)?;
        jobs.push(job_dir);
    }

    Ok(Fixture {
        _dir: dir,
        tool,
        output,
        jobs,
    })
}

fn settings(fx: &Fixture) -> Arc<Settings> {
    Arc::new(Settings {
        output_folder: fx.output.clone(),
        jobs: fx.jobs.clone(),
        month: 2,
        year: 2019,
        runner: RunnerSection {
            tool: fx.tool.display().to_string(),
            volume: "vol".to_string(),
            env_file: ".env".to_string(),
            max_parallel: 2,
        },
        database: DatabaseSection {
            url: "postgres://unused".to_string(),
        },
        blob: BlobSection {
            endpoint: "https://unused".to_string(),
            container: "unused".to_string(),
            access_key: String::new(),
        },
    })
}

fn artifact_names(output: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn ran_jobs(fx: &Fixture) -> Vec<String> {
    let marker = fx.tool.parent().unwrap().join("ran");
    if !marker.exists() {
        return Vec::new();
    }
    fs::read_to_string(marker)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

#[tokio::test]
async fn failed_build_isolates_one_job_and_spares_the_other() -> TestResult {
    let fx = fixture(&["trt13", "mppe"])?;
    let storage = Arc::new(MemoryStorage::default());

    let orchestrator = Orchestrator::new(settings(&fx), storage.clone(), "deadbeef".to_string());
    orchestrator.run().await?;

    // trt13 went all the way to the gateway.
    let stored = storage.stored();
    assert_eq!(stored.len(), 1);
    let record = &stored[0];
    assert_eq!(record.agency_id, "trt13");
    assert_eq!(record.month, 2);
    assert_eq!(record.year, 2019);
    assert_eq!(record.files, vec!["trt13-contracheque.xlsx".to_string()]);

    // Provenance is the pipeline's own capture of the execute stage.
    assert_eq!(record.proc_info.status, 0);
    assert!(record.proc_info.cmd.contains("--month=2"));
    assert!(record.proc_info.cmd.contains("--year=2019"));
    assert!(record.proc_info.cmd.ends_with("--year=2019"));

    // mppe never reached the execute stage; trt13 did.
    assert_eq!(ran_jobs(&fx), vec!["trt13".to_string()]);

    let names = artifact_names(&fx.output);
    assert!(names.iter().any(|n| n.starts_with("trt13(2-2019)-build.stdout-")));
    assert!(names.iter().any(|n| n.starts_with("trt13(2-2019)-exec.stdout-")));
    assert!(names.iter().any(|n| n.starts_with("mppe(2-2019)-build.stdout-")));
    assert!(names.iter().any(|n| n.starts_with("mppe(2-2019)-build.stderr-")));
    assert!(!names.iter().any(|n| n.contains("mppe(2-2019)-exec")));
    Ok(())
}

#[tokio::test]
async fn failed_build_leaves_exactly_one_error_line() -> TestResult {
    let fx = fixture(&["trt13", "mppe"])?;
    let storage = Arc::new(MemoryStorage::default());
    let logs = LogBuffer::default();

    {
        let _guard = capture_logs(&logs);
        Orchestrator::new(settings(&fx), storage.clone(), "deadbeef".to_string())
            .run()
            .await?;
    }

    let error_lines: Vec<String> = logs
        .lines()
        .into_iter()
        .filter(|l| l.contains("ERROR"))
        .collect();

    assert_eq!(
        error_lines.len(),
        1,
        "expected a single error line, got: {error_lines:#?}"
    );
    assert!(error_lines[0].contains("build error mppe"));
    Ok(())
}

#[tokio::test]
async fn backup_failure_terminates_one_job_but_not_the_run() -> TestResult {
    // Every artifact name for this job exceeds the filesystem's 255-byte
    // name limit, so its backup writes fail while the sibling job's writes
    // are untouched.
    let long_name = "a".repeat(240);
    let fx = fixture(&["trt13", long_name.as_str()])?;
    let storage = Arc::new(MemoryStorage::default());
    let logs = LogBuffer::default();

    {
        let _guard = capture_logs(&logs);
        Orchestrator::new(settings(&fx), storage.clone(), "deadbeef".to_string())
            .run()
            .await?;
    }

    // The sibling still went all the way to the gateway.
    let stored = storage.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].agency_id, "trt13");

    // The failing job stopped at its first backup write: its build ran but
    // the execute stage was never reached.
    assert_eq!(ran_jobs(&fx), vec!["trt13".to_string()]);

    let lines = logs.lines();
    assert!(
        lines
            .iter()
            .any(|l| l.contains("backup error") && l.contains(&long_name))
    );
    assert!(lines.iter().any(|l| l.contains("audit trail is incomplete")));
    Ok(())
}

#[tokio::test]
async fn store_failure_terminates_only_that_job() -> TestResult {
    let fx = fixture(&["trt13"])?;

    let orchestrator = Orchestrator::new(
        settings(&fx),
        Arc::new(FailingStorage),
        "deadbeef".to_string(),
    );

    // The run itself still finishes cleanly; the store failure stays a
    // per-job concern.
    orchestrator.run().await?;

    // Build and execute still happened, and their output was backed up.
    assert_eq!(ran_jobs(&fx), vec!["trt13".to_string()]);
    let names = artifact_names(&fx.output);
    assert!(names.iter().any(|n| n.starts_with("trt13(2-2019)-exec.stdout-")));
    Ok(())
}

#[tokio::test]
async fn rerunning_the_same_target_stores_a_new_record() -> TestResult {
    let fx = fixture(&["trt13"])?;
    let storage = Arc::new(MemoryStorage::default());

    let orchestrator = Orchestrator::new(settings(&fx), storage.clone(), "deadbeef".to_string());
    orchestrator.run().await?;
    orchestrator.run().await?;

    // No deduplication in the pipeline; that belongs to the gateway.
    assert_eq!(storage.stored().len(), 2);
    Ok(())
}

#[tokio::test]
async fn jobs_beyond_the_parallel_limit_still_all_run() -> TestResult {
    let fx = fixture(&["trt13", "trepb", "trt6", "tjpb", "mpf"])?;
    let storage = Arc::new(MemoryStorage::default());

    // max_parallel is 2; five jobs must still all complete.
    let orchestrator = Orchestrator::new(settings(&fx), storage.clone(), "deadbeef".to_string());
    orchestrator.run().await?;

    let mut agencies: Vec<String> = storage
        .stored()
        .into_iter()
        .map(|r| r.agency_id)
        .collect();
    agencies.sort();
    assert_eq!(agencies, vec!["mpf", "tjpb", "trepb", "trt13", "trt6"]);
    Ok(())
}
