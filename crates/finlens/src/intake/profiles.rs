use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::IntakeConfiguration;

/// Upload presets used by the dashboard's analysis modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeProfile {
    /// Spreadsheet exports feeding the income statement analysis.
    IncomeStatement,
    /// Annual reports and strategy documents for the business model analysis.
    BusinessModel,
}

impl IntakeProfile {
    pub const ALL: [IntakeProfile; 2] = [
        IntakeProfile::IncomeStatement,
        IntakeProfile::BusinessModel,
    ];

    pub fn key(self) -> &'static str {
        match self {
            IntakeProfile::IncomeStatement => "income_statement",
            IntakeProfile::BusinessModel => "business_model",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            IntakeProfile::IncomeStatement => "Income Statement Analysis",
            IntakeProfile::BusinessModel => "Business Model Analysis",
        }
    }

    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            IntakeProfile::IncomeStatement => &[".xlsx", ".xls", ".csv"],
            IntakeProfile::BusinessModel => &[".pdf", ".docx", ".doc"],
        }
    }

    pub fn max_files(self) -> usize {
        match self {
            IntakeProfile::IncomeStatement => 5,
            IntakeProfile::BusinessModel => 15,
        }
    }

    pub fn configuration(self) -> IntakeConfiguration {
        IntakeConfiguration::from_static(self.accepted_extensions(), self.max_files())
    }
}

impl fmt::Display for IntakeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intake profile '{0}'")]
pub struct UnknownProfile(pub String);

impl FromStr for IntakeProfile {
    type Err = UnknownProfile;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "income_statement" | "income" => Ok(IntakeProfile::IncomeStatement),
            "business_model" | "business" => Ok(IntakeProfile::BusinessModel),
            _ => Err(UnknownProfile(raw.to_string())),
        }
    }
}
