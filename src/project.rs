//! Named snapshots of parameters and results, stored as JSON.

use std::path::Path;

use chrono::{DateTime, Utc};
use cubesat_data::{DailyBudgetParameters, DailyBudgetResult, TimelineParameters, TimelineResult};
use cubesat_export::{ExportError, json};
use cubesat_link::{LinkBudgetParameters, LinkBudgetResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSection {
    pub parameters: LinkBudgetParameters,
    pub result: LinkBudgetResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySection {
    pub parameters: DailyBudgetParameters,
    pub result: DailyBudgetResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSection {
    pub parameters: TimelineParameters,
    pub result: TimelineResult,
}

/// A saved study. Sections are optional so a project can hold only the budgets it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<LinkSection>,
    #[serde(default)]
    pub data: Option<DailySection>,
    #[serde(default)]
    pub timeline: Option<TimelineSection>,
}

impl Project {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
            updated_at: None,
            link: None,
            data: None,
            timeline: None,
        }
    }

    pub fn with_link(mut self, parameters: LinkBudgetParameters, result: LinkBudgetResult) -> Self {
        self.link = Some(LinkSection { parameters, result });
        self
    }

    pub fn with_data(mut self, parameters: DailyBudgetParameters, result: DailyBudgetResult) -> Self {
        self.data = Some(DailySection { parameters, result });
        self
    }

    pub fn with_timeline(mut self, parameters: TimelineParameters, result: TimelineResult) -> Self {
        self.timeline = Some(TimelineSection { parameters, result });
        self
    }

    /// Record a modification time.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        json::write_pretty(path, self)
    }

    pub fn load(path: &Path) -> Result<Self, ExportError> {
        json::read(path)
    }
}
