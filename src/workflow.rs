mod calendar;
mod context;
mod notifier;
mod reminders;
mod replay;

pub use calendar::{Clock, ManualClock, ReminderTimeZone, SystemClock};
pub use context::{StepRecord, WorkflowContext, WorkflowError};
pub use notifier::reminder_email;
pub use reminders::{
    plan_reminders, PlanExit, PlannedReminder, Reminder, ReminderNotifier, ReminderPayload,
    ReminderPlanner, ReminderSlot, ReminderWorkflowUrl, SubscriptionStore, REMINDER_LEAD_DAYS,
    REMINDER_WORKFLOW_PATH,
};
pub use replay::{ReplayContext, WorkflowInvocation, WorkflowOutcome};
