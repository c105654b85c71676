//! Shared fixtures for integration tests: an in-memory recording sink,
//! canonical workflows, and a service wired over a temp data directory.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use alurkerja::{
    DivisionSelector, FileProjectStore, FileUserDirectory, Notification, NotificationSink,
    NotificationSpec, ParallelSpec, Policy, ProjectService, Step, Transition, User, Workflow,
    WorkflowCatalog,
};

/// Captures everything the service hands to the sink.
pub struct RecordingSink {
    pub delivered: tokio::sync::Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            delivered: tokio::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }
}

pub fn step(name: &str, status: &str, division: &str, progress: u8) -> Step {
    Step {
        step_name: name.to_string(),
        status: status.to_string(),
        assigned_division: division.to_string(),
        progress,
        next_action: None,
        transitions: BTreeMap::new(),
        revision_target: None,
        parallel: None,
    }
}

pub fn transition(status: &str, division: &str, progress: u8) -> Transition {
    Transition {
        status: status.to_string(),
        assigned_division: division.to_string(),
        next_action: None,
        progress,
        notification: None,
    }
}

/// Draft (Arsitek) → Review (Admin Proyek) → Done. Review can roll back to
/// Draft and notifies the owner on approval.
pub fn draft_review_done() -> Workflow {
    let mut draft = step("Draft", "Draft", "Arsitek", 10);
    let mut submit = transition("Review", "Admin Proyek", 50);
    submit.notification = Some(NotificationSpec {
        division: None,
        message: "{project} menunggu review".to_string(),
    });
    draft.transitions.insert("submit".to_string(), submit);

    let mut review = step("Review", "Review", "Admin Proyek", 50);
    review.revision_target = Some("Draft".to_string());
    let mut approve = transition("Done", "Admin Proyek", 100);
    approve.notification = Some(NotificationSpec {
        division: Some(DivisionSelector::One("Owner".to_string())),
        message: "{project} selesai".to_string(),
    });
    review.transitions.insert("approve".to_string(), approve);

    let done = step("Done", "Done", "Admin Proyek", 100);

    Workflow {
        id: "wf-3step".to_string(),
        name: "Tiga Tahap".to_string(),
        description: String::new(),
        steps: vec![draft, review, done],
    }
}

/// A parallel design step requiring Arsitek, Struktur and MEP, then review.
pub fn parallel_workflow() -> Workflow {
    let mut design = step("Desain", "Desain Paralel", "Teknik", 30);
    design.parallel = Some(ParallelSpec {
        divisions: BTreeSet::from([
            "Arsitek".to_string(),
            "Struktur".to_string(),
            "MEP".to_string(),
        ]),
        completion_action: "design_done".to_string(),
    });
    let mut done_transition = transition("Review", "Admin Proyek", 70);
    done_transition.notification = Some(NotificationSpec {
        division: Some(DivisionSelector::Many(vec![
            "Admin Proyek".to_string(),
            "Owner".to_string(),
        ])),
        message: "{project} siap direview".to_string(),
    });
    design
        .transitions
        .insert("design_done".to_string(), done_transition);

    let review = step("Review", "Review", "Admin Proyek", 70);

    Workflow {
        id: "wf-parallel".to_string(),
        name: "Desain Paralel".to_string(),
        description: String::new(),
        steps: vec![design, review],
    }
}

pub fn roster() -> Vec<User> {
    let user = |name: &str, role: &str| User {
        username: name.to_string(),
        display_name: String::new(),
        roles: vec![role.to_string()],
    };
    vec![
        user("budi", "Arsitek"),
        user("sari", "Struktur"),
        user("joko", "MEP"),
        user("tuti", "Admin Proyek"),
        user("owner", "Owner"),
    ]
}

pub fn admin_roles() -> Vec<String> {
    vec![
        "Owner".to_string(),
        "Admin Proyek".to_string(),
        "Admin Developer".to_string(),
    ]
}

/// Wire a service over `data_dir` with the given workflows and the
/// standard roster. Returns the sink so tests can assert deliveries.
pub async fn service_with(
    data_dir: &Path,
    workflows: &[Workflow],
) -> (ProjectService, Arc<RecordingSink>) {
    let catalog = WorkflowCatalog::new(data_dir);
    for workflow in workflows {
        catalog.save(workflow).await.unwrap();
    }
    let directory = FileUserDirectory::new(data_dir);
    directory.save_all(&roster()).await.unwrap();

    let sink = Arc::new(RecordingSink::new());
    let service = ProjectService::new(
        Arc::new(FileProjectStore::new(data_dir)),
        Arc::new(FileUserDirectory::new(data_dir)),
        sink.clone(),
        catalog,
        Policy::new(admin_roles()),
        true,
    );
    (service, sink)
}
