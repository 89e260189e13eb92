use crate::value_objects::analysis::AgentAnalysis;

pub trait AnalysisReportRepository {
    /// `Ok(None)` when no report was written yet or the file is not valid JSON.
    fn latest_report(&self) -> Result<Option<AgentAnalysis>, String>;
}
