//! Notification payloads and the delivery boundary.
//!
//! The engine only describes what should be raised; transport (push
//! subscriptions and so on) lives behind `NotificationSink`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::project::Project;
use crate::workflow::{DivisionSelector, NotificationSpec};

/// Rendered payload handed to the sink for fan-out to each listed division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub divisions: Vec<String>,
    pub title: String,
    pub body: String,
    pub project_id: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Default sink: a structured log event per notification. Stands in for
/// real push delivery, which is out of scope.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            project_id = %notification.project_id,
            divisions = ?notification.divisions,
            title = %notification.title,
            body = %notification.body,
            "Notification delivered"
        );
        Ok(())
    }
}

/// Render a transition's notification spec against the updated project.
/// A missing division selector falls back to the project's (post-transition)
/// assigned division.
pub fn render(spec: &NotificationSpec, project: &Project) -> Notification {
    let divisions = match &spec.division {
        Some(DivisionSelector::One(division)) => vec![division.clone()],
        Some(DivisionSelector::Many(divisions)) => divisions.clone(),
        None => vec![project.assigned_division.clone()],
    };
    Notification {
        divisions,
        title: format!("Proyek {}", project.name),
        body: render_template(&spec.message, project),
        project_id: project.id.clone(),
    }
}

fn render_template(template: &str, project: &Project) -> String {
    template
        .replace("{project}", &project.name)
        .replace("{status}", &project.status)
        .replace("{division}", &project.assigned_division)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_project() -> Project {
        Project {
            id: "p-1".to_string(),
            name: "Gedung A".to_string(),
            workflow_id: "wf-1".to_string(),
            status: "Review".to_string(),
            assigned_division: "Admin".to_string(),
            progress: 50,
            next_action: None,
            current_step: 1,
            division_completions: Default::default(),
            history: vec![],
            files: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn renders_placeholders_and_fans_out_to_listed_divisions() {
        let spec = NotificationSpec {
            division: Some(DivisionSelector::Many(vec![
                "Arsitek".to_string(),
                "MEP".to_string(),
            ])),
            message: "{project} masuk tahap {status}".to_string(),
        };
        let notification = render(&spec, &sample_project());
        assert_eq!(notification.divisions, vec!["Arsitek", "MEP"]);
        assert_eq!(notification.body, "Gedung A masuk tahap Review");
    }

    #[test]
    fn missing_selector_targets_assigned_division() {
        let spec = NotificationSpec {
            division: None,
            message: "Menunggu {division}".to_string(),
        };
        let notification = render(&spec, &sample_project());
        assert_eq!(notification.divisions, vec!["Admin"]);
        assert_eq!(notification.body, "Menunggu Admin");
    }
}
