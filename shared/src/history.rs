use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Approved,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Approved,
    Completed,
}

impl TaskFilter {
    #[must_use]
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == TaskStatus::Pending,
            Self::Approved => status == TaskStatus::Approved,
            Self::Completed => status == TaskStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub description: String,
    pub specialist: String,
    pub timestamp: DateTime<Utc>,
    pub status: TaskStatus,
}

/// Tasks approved during this session, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistory {
    tasks: Vec<TaskRecord>,
    pub filter: TaskFilter,
}

impl TaskHistory {
    pub fn record_approval(&mut self, result: &AnalysisResult, at: DateTime<Utc>) {
        let description = result.task_description.clone().unwrap_or_default();
        let specialist = result
            .specialist
            .clone()
            .unwrap_or_else(|| crate::intake::DEFAULT_SPECIALIST.to_string());
        let id = result
            .id
            .clone()
            .unwrap_or_else(|| format!("task-{}", at.timestamp_millis()));

        self.tasks.insert(
            0,
            TaskRecord {
                id,
                description,
                specialist,
                timestamp: at,
                status: TaskStatus::Approved,
            },
        );
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&TaskRecord> {
        self.tasks
            .iter()
            .filter(|t| self.filter.matches(t.status))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
