use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use serde::{Deserialize, Serialize};

use url::Url;

use super::{Clock, ReminderTimeZone, WorkflowContext, WorkflowError};
use crate::model::SubscriptionDetails;

/// Days before renewal at which a reminder goes out, in the order they are evaluated
pub const REMINDER_LEAD_DAYS: [i64; 4] = [7, 5, 2, 1];

/// Name under which the reminder workflow is triggered and served
pub const REMINDER_WORKFLOW_PATH: &str = "api/v1/workflows/subscriptions/reminder";

/// Public URL the workflow service calls back for reminder runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderWorkflowUrl(Url);

impl ReminderWorkflowUrl {
    pub fn new(base_url: &Url) -> anyhow::Result<Self> {
        use anyhow::Context;

        base_url
            .join(REMINDER_WORKFLOW_PATH)
            .map(Self)
            .context("Failed to build reminder workflow URL")
    }
}

impl AsRef<Url> for ReminderWorkflowUrl {
    fn as_ref(&self) -> &Url {
        &self.0
    }
}

/// Trigger payload of a reminder workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub subscription_id: String,
}

/// Read access to subscriptions for the reminder workflow
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// `None` when no subscription matches, including for malformed ids
    async fn find_subscription(&self, id: &str) -> anyhow::Result<Option<SubscriptionDetails>>;
}

/// A renewal reminder ready to be delivered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub recipient: String,
    pub label: String,
    pub lead_days: i64,
    pub subscription: SubscriptionDetails,
}

/// Delivers reminders to subscription owners
#[async_trait::async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn send(&self, reminder: &Reminder) -> anyhow::Result<()>;
}

/// Where a single reminder stands relative to the evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderSlot {
    /// Later than now; the workflow must sleep until then
    Upcoming,
    /// Falls on today's calendar date
    Due,
    /// Passed on an earlier calendar date
    Missed,
}

/// One lead time of a renewal's reminder schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedReminder {
    pub lead_days: i64,
    pub remind_at: DateTime<Utc>,
}

impl PlannedReminder {
    pub fn new(renewal_date: DateTime<Utc>, lead_days: i64) -> Self {
        Self {
            lead_days,
            remind_at: renewal_date - Duration::days(lead_days),
        }
    }

    /// Classify the reminder as seen at `now`, by calendar day in `time_zone`
    pub fn slot_at(&self, now: DateTime<Utc>, time_zone: ReminderTimeZone) -> ReminderSlot {
        if self.remind_at > now {
            ReminderSlot::Upcoming
        } else if time_zone.same_day(now, self.remind_at) {
            ReminderSlot::Due
        } else {
            ReminderSlot::Missed
        }
    }

    fn label(&self) -> String {
        format!("{} days before reminder", self.lead_days)
    }

    fn sleep_label(&self) -> String {
        format!("Reminder {} days", self.lead_days)
    }
}

/// Compute the reminder schedule for a renewal as seen at `now`.
/// Empty once the renewal itself is due.
pub fn plan_reminders(
    renewal_date: DateTime<Utc>,
    now: DateTime<Utc>,
    time_zone: ReminderTimeZone,
) -> Vec<(PlannedReminder, ReminderSlot)> {
    if renewal_date <= now {
        return Vec::new();
    }

    REMINDER_LEAD_DAYS
        .iter()
        .map(|&lead_days| {
            let reminder = PlannedReminder::new(renewal_date, lead_days);
            (reminder, reminder.slot_at(now, time_zone))
        })
        .collect()
}

/// How a planner run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanExit {
    SubscriptionNotFound,
    Inactive,
    RenewalPassed,
    Completed,
}

/// Walks a subscription's reminder schedule on top of a durable workflow context
pub struct ReminderPlanner<S, N> {
    store: S,
    notifier: N,
    clock: Arc<dyn Clock>,
    time_zone: ReminderTimeZone,
}

impl<S, N> ReminderPlanner<S, N>
where
    S: SubscriptionStore,
    N: ReminderNotifier,
{
    pub fn new(store: S, notifier: N, clock: Arc<dyn Clock>, time_zone: ReminderTimeZone) -> Self {
        Self {
            store,
            notifier,
            clock,
            time_zone,
        }
    }

    /// Clock the planner evaluates reminders against
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    #[tracing::instrument(name = "Plan renewal reminders", skip(self, ctx))]
    pub async fn run<C: WorkflowContext>(
        &self,
        ctx: &C,
        subscription_id: &str,
    ) -> Result<PlanExit, WorkflowError> {
        let store = &self.store;
        let details: Option<SubscriptionDetails> = ctx
            .run("get subscription", move || {
                store.find_subscription(subscription_id)
            })
            .await?;

        let Some(details) = details else {
            tracing::info!("No subscription found, stopping workflow");
            return Ok(PlanExit::SubscriptionNotFound);
        };
        if !details.subscription.status.is_active() {
            tracing::info!(status = ?details.subscription.status, "Subscription is not active, stopping workflow");
            return Ok(PlanExit::Inactive);
        }

        let renewal_date = details.subscription.renewal_date;
        if renewal_date <= self.clock.now() {
            tracing::info!(%renewal_date, "Renewal date has passed, stopping workflow");
            return Ok(PlanExit::RenewalPassed);
        }

        for lead_days in REMINDER_LEAD_DAYS {
            let planned = PlannedReminder::new(renewal_date, lead_days);

            if planned.slot_at(self.clock.now(), self.time_zone) == ReminderSlot::Upcoming {
                ctx.sleep_until(&planned.sleep_label(), planned.remind_at)
                    .await?;
            }

            let due = match planned.slot_at(self.clock.now(), self.time_zone) {
                ReminderSlot::Due => true,
                ReminderSlot::Missed => false,
                // Woken ahead of the target time
                ReminderSlot::Upcoming => self
                    .time_zone
                    .same_day(self.clock.now(), planned.remind_at),
            };
            if !due {
                tracing::debug!(lead_days, remind_at = %planned.remind_at, "Reminder window missed");
                continue;
            }

            let reminder = Reminder {
                recipient: details.user.email.clone(),
                label: planned.label(),
                lead_days,
                subscription: details.clone(),
            };
            let notifier = &self.notifier;
            let reminder = &reminder;
            ctx.run(&reminder.label, move || notifier.send(reminder))
                .await?;
        }

        Ok(PlanExit::Completed)
    }
}
