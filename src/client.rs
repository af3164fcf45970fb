mod email_client;
mod workflow_client;

pub use email_client::{Email, EmailClient};
pub use workflow_client::WorkflowClient;
