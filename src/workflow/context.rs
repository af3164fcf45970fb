use std::future::Future;

use chrono::{DateTime, Utc};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A unit of durable progress recorded by the workflow engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepRecord {
    /// A completed `run` step and its serialized output
    Run {
        label: String,
        output: serde_json::Value,
    },
    /// A suspension until `wake_at`
    #[serde(rename_all = "camelCase")]
    Sleep {
        label: String,
        wake_at: DateTime<Utc>,
    },
}

impl StepRecord {
    pub fn label(&self) -> &str {
        match self {
            Self::Run { label, .. } | Self::Sleep { label, .. } => label,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Execution stopped at a new step that the engine must persist before resuming.
    /// Not a failure.
    #[error("Workflow suspended at step \"{}\"", .0.label())]
    Suspended(StepRecord),

    #[error("Step \"{label}\" failed")]
    StepFailed {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to suspend at \"{label}\"")]
    SuspensionFailed {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Recorded history for step \"{label}\" does not match the workflow")]
    HistoryMismatch {
        label: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Durable-execution primitives provided by the workflow engine
#[async_trait::async_trait]
pub trait WorkflowContext: Send + Sync {
    /// Run `step` at most once for `label`. If the engine already recorded a
    /// result under this label, it is returned without running `step` again.
    async fn run<T, F, Fut>(&self, label: &str, step: F) -> Result<T, WorkflowError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = anyhow::Result<T>> + Send;

    /// Suspend until the wall-clock reaches `wake_at`.
    /// Returns immediately when that instant has already passed.
    async fn sleep_until(&self, label: &str, wake_at: DateTime<Utc>) -> Result<(), WorkflowError>;
}
