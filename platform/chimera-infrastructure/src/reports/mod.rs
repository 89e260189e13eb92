use chimera_domain::repositories::analysis_report::AnalysisReportRepository;
use chimera_domain::value_objects::analysis::AgentAnalysis;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn record_read_metrics(outcome: &'static str, start: Instant) {
    metrics::counter!("chimera.infra.report.read.calls_total", "outcome" => outcome).increment(1);
    metrics::histogram!("chimera.infra.report.read_ms", "outcome" => outcome)
        .record(start.elapsed().as_millis() as f64);
}

/// Reads the agent's last cycle report from a JSON file written by another
/// process. A missing or half-written file is not an error.
#[derive(Debug, Clone)]
pub struct FilesystemAnalysisReportRepository {
    path: PathBuf,
}

impl FilesystemAnalysisReportRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnalysisReportRepository for FilesystemAnalysisReportRepository {
    fn latest_report(&self) -> Result<Option<AgentAnalysis>, String> {
        let start = Instant::now();
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                record_read_metrics("missing", start);
                return Ok(None);
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                tracing::debug!(path = %self.path.display(), "analysis report is not utf-8, ignoring");
                record_read_metrics("malformed", start);
                return Ok(None);
            }
            Err(err) => {
                record_read_metrics("error", start);
                return Err(format!(
                    "failed to read analysis report {}: {}",
                    self.path.display(),
                    err
                ));
            }
        };

        match AgentAnalysis::from_json(&raw) {
            Ok(analysis) => {
                record_read_metrics("ok", start);
                Ok(Some(analysis))
            }
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "analysis report malformed, ignoring");
                record_read_metrics("malformed", start);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_domain::value_objects::analysis::Validation;

    fn test_temp_dir(prefix: &str) -> PathBuf {
        let unique = format!(
            "{}_{}_{}",
            prefix,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before UNIX_EPOCH")
                .as_nanos()
        );
        let dir = std::env::temp_dir().join(unique);
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = test_temp_dir("chimera_report_missing");
        let repo = FilesystemAnalysisReportRepository::new(dir.join("last_cycle_report.json"));
        assert_eq!(repo.latest_report(), Ok(None));
    }

    #[test]
    fn malformed_json_is_absent() {
        let dir = test_temp_dir("chimera_report_malformed");
        let path = dir.join("last_cycle_report.json");
        fs::write(&path, "{\"scenarios\": [").expect("write");
        let repo = FilesystemAnalysisReportRepository::new(&path);
        assert_eq!(repo.latest_report(), Ok(None));

        fs::write(&path, [0xff, 0xfe, 0x00]).expect("write");
        assert_eq!(repo.latest_report(), Ok(None));
    }

    #[test]
    fn valid_report_is_parsed_with_defaults() {
        let dir = test_temp_dir("chimera_report_valid");
        let path = dir.join("last_cycle_report.json");
        fs::write(
            &path,
            r#"{"scenarios":[{"hypothesis":"ETF inflows","validation":"Valid","impact":0.015},{"validation":"Rejected"}],"cycle":12}"#,
        )
        .expect("write");
        let analysis = FilesystemAnalysisReportRepository::new(&path)
            .latest_report()
            .expect("read")
            .expect("present");
        assert_eq!(analysis.scenarios.len(), 2);
        assert_eq!(analysis.scenarios[0].impact, Some(0.015));
        assert_eq!(analysis.scenarios[1].hypothesis, "N/A");
        assert_eq!(analysis.scenarios[1].validation, Validation::Other("Rejected".to_string()));
    }

    #[test]
    fn directory_in_place_of_file_is_an_error() {
        let dir = test_temp_dir("chimera_report_dir");
        let result = FilesystemAnalysisReportRepository::new(&dir).latest_report();
        assert!(result.is_err());
    }
}
