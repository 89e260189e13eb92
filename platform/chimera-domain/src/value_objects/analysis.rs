use serde::{Deserialize, Serialize};

/// Outcome of the agent's check of a single causal hypothesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Validation {
    Valid,
    #[default]
    Pending,
    Other(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

impl From<String> for Validation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Valid" => Validation::Valid,
            "Pending" => Validation::Pending,
            _ => Validation::Other(value),
        }
    }
}

impl From<Validation> for String {
    fn from(value: Validation) -> Self {
        match value {
            Validation::Valid => "Valid".to_string(),
            Validation::Pending => "Pending".to_string(),
            Validation::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_hypothesis")]
    pub hypothesis: String,
    #[serde(default)]
    pub validation: Validation,
    /// Estimated impact as a fraction (0.015 == +1.50%).
    #[serde(default)]
    pub impact: Option<f64>,
}

fn default_hypothesis() -> String {
    "N/A".to_string()
}

/// The agent's last cycle report, as written to `last_cycle_report.json`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentAnalysis {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl AgentAnalysis {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|err| format!("failed to parse analysis report: {err}"))
    }

    pub fn has_scenarios(&self) -> bool {
        !self.scenarios.is_empty()
    }
}
