use anyhow::Context;

use crate::client::{Email, EmailClient};
use crate::error::Error;

use super::{Reminder, ReminderNotifier};

const REMINDER_TAG: &str = "renewal-reminder";

/// Render the renewal reminder email for a subscription owner
pub fn reminder_email(reminder: &Reminder) -> anyhow::Result<Email> {
    let recipient = reminder
        .recipient
        .parse()
        .context("Reminder recipient is not a valid email address")?;

    let subscription = &reminder.subscription.subscription;
    let owner = &reminder.subscription.user;
    let renewal = subscription.renewal_date.format("%B %-d, %Y");
    let price = format!("{:.2} {}", subscription.price, subscription.currency.as_ref());
    let plan = subscription
        .frequency
        .map(|f| format!(" ({})", f.as_ref()))
        .unwrap_or_default();

    let subject = format!(
        "Reminder: your {} subscription renews in {} day{}",
        subscription.name,
        reminder.lead_days,
        if reminder.lead_days == 1 { "" } else { "s" }
    );
    let text_body = format!(
        "Hi {},\n\n\
         Your {} subscription renews on {}.\n\
         Price: {}{}\n\
         Payment method: {}\n\n\
         ({})",
        owner.name, subscription.name, renewal, price, plan, subscription.payment_method, reminder.label,
    );
    let html_body = format!(
        "<p>Hi {},</p>\
         <p>Your <strong>{}</strong> subscription renews on <strong>{}</strong>.</p>\
         <p>Price: {}{}<br>Payment method: {}</p>\
         <p><small>{}</small></p>",
        owner.name, subscription.name, renewal, price, plan, subscription.payment_method, reminder.label,
    );

    Ok(Email::new(recipient, subject, html_body, text_body)
        .tagged(REMINDER_TAG)
        .with_metadata("subscriptionId", subscription.id)
        .with_metadata("leadDays", reminder.lead_days))
}

#[async_trait::async_trait]
impl ReminderNotifier for EmailClient {
    #[tracing::instrument(name = "Send renewal reminder", skip(self, reminder), fields(label = %reminder.label))]
    async fn send(&self, reminder: &Reminder) -> anyhow::Result<()> {
        let email = reminder_email(reminder)?;
        EmailClient::send(self, &email)
            .await
            .map_err(Error::SendEmailError)?;
        Ok(())
    }
}
