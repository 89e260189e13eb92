use chimera_domain::repositories::frames::FrameSink;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

fn record_write_metrics(kind: &'static str, start: Instant, bytes: usize, result: &Result<(), String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "chimera.infra.frames.write.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("chimera.infra.frames.write_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
    if result.is_ok() {
        metrics::counter!("chimera.infra.frames.write.bytes_total", "kind" => kind).increment(bytes as u64);
    }
}

/// Hidden sibling used for the write-then-rename swap.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create dir {}: {}", parent.display(), err))?;
    }
    let tmp = temp_sibling(path);
    let result = fs::write(&tmp, bytes)
        .map_err(|err| format!("failed to write {}: {}", tmp.display(), err))
        .and_then(|()| {
            fs::rename(&tmp, path).map_err(|err| {
                format!(
                    "failed to move {} over {}: {}",
                    tmp.display(),
                    path.display(),
                    err
                )
            })
        });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Publishes frames to a file, replacing the previous frame in one rename.
#[derive(Debug, Clone)]
pub struct FilesystemFrameSink {
    path: PathBuf,
}

impl FilesystemFrameSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for FilesystemFrameSink {
    fn publish(&self, frame: &[u8]) -> Result<(), String> {
        let start = Instant::now();
        let result = write_atomically(&self.path, frame);
        record_write_metrics("file", start, frame.len(), &result);
        result
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Publishes frames to standard output in a single buffered write.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutFrameSink;

impl StdoutFrameSink {
    pub fn new() -> Self {
        Self
    }
}

impl FrameSink for StdoutFrameSink {
    fn publish(&self, frame: &[u8]) -> Result<(), String> {
        let start = Instant::now();
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let result = handle
            .write_all(frame)
            .and_then(|()| handle.flush())
            .map_err(|err| format!("failed to write frame to stdout: {err}"));
        record_write_metrics("stdout", start, frame.len(), &result);
        result
    }

    fn describe(&self) -> String {
        "<stdout>".to_string()
    }
}
