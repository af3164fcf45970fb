use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Clock, StepRecord, WorkflowContext, WorkflowError};

/// One callback from the workflow engine: the run payload plus every step
/// the engine has persisted for this run so far
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInvocation<P> {
    pub workflow_run_id: String,
    pub payload: P,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

/// Reply to the engine after an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkflowOutcome {
    /// A new step completed; persist it and call back immediately
    Step {
        label: String,
        output: serde_json::Value,
    },
    /// Persist the sleep and call back once `wake_at` is reached
    #[serde(rename_all = "camelCase")]
    Sleep {
        label: String,
        wake_at: DateTime<Utc>,
    },
    /// The run is over
    Finished,
}

impl From<StepRecord> for WorkflowOutcome {
    fn from(step: StepRecord) -> Self {
        match step {
            StepRecord::Run { label, output } => Self::Step { label, output },
            StepRecord::Sleep { label, wake_at } => Self::Sleep { label, wake_at },
        }
    }
}

impl WorkflowOutcome {
    /// Turn the result of one workflow pass into the engine reply.
    /// Suspensions are normal outcomes, anything else is a failed pass.
    pub fn settle<T>(result: Result<T, WorkflowError>) -> Result<Self, WorkflowError> {
        match result {
            Ok(_) => Ok(Self::Finished),
            Err(WorkflowError::Suspended(step)) => Ok(step.into()),
            Err(e) => Err(e),
        }
    }
}

/// Workflow context that replays engine history keyed by step label.
///
/// Recorded steps return their stored output. The first unrecorded step is
/// executed (or, for a sleep, requested) and handed back to the engine via
/// [`WorkflowError::Suspended`], ending the current pass.
pub struct ReplayContext {
    clock: Arc<dyn Clock>,
    history: HashMap<String, StepRecord>,
}

impl ReplayContext {
    pub fn new(clock: Arc<dyn Clock>, steps: Vec<StepRecord>) -> Self {
        let history = steps
            .into_iter()
            .map(|step| (step.label().to_string(), step))
            .collect();
        Self { clock, history }
    }
}

#[async_trait::async_trait]
impl WorkflowContext for ReplayContext {
    async fn run<T, F, Fut>(&self, label: &str, step: F) -> Result<T, WorkflowError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = anyhow::Result<T>> + Send,
    {
        match self.history.get(label) {
            Some(StepRecord::Run { output, .. }) => {
                tracing::debug!(step = %label, "Replaying recorded step");
                serde_json::from_value(output.clone()).map_err(|e| {
                    WorkflowError::HistoryMismatch {
                        label: label.to_string(),
                        source: Some(e),
                    }
                })
            }
            Some(StepRecord::Sleep { .. }) => Err(WorkflowError::HistoryMismatch {
                label: label.to_string(),
                source: None,
            }),
            None => {
                tracing::info!(step = %label, "Running workflow step");
                let result = step().await.map_err(|source| WorkflowError::StepFailed {
                    label: label.to_string(),
                    source,
                })?;
                let output = serde_json::to_value(&result).map_err(|source| {
                    WorkflowError::StepFailed {
                        label: label.to_string(),
                        source: source.into(),
                    }
                })?;
                Err(WorkflowError::Suspended(StepRecord::Run {
                    label: label.to_string(),
                    output,
                }))
            }
        }
    }

    async fn sleep_until(&self, label: &str, wake_at: DateTime<Utc>) -> Result<(), WorkflowError> {
        match self.history.get(label) {
            Some(StepRecord::Sleep { .. }) => Ok(()),
            Some(StepRecord::Run { .. }) => Err(WorkflowError::HistoryMismatch {
                label: label.to_string(),
                source: None,
            }),
            None if wake_at <= self.clock.now() => Ok(()),
            None => {
                tracing::info!(step = %label, %wake_at, "Suspending workflow");
                Err(WorkflowError::Suspended(StepRecord::Sleep {
                    label: label.to_string(),
                    wake_at,
                }))
            }
        }
    }
}
