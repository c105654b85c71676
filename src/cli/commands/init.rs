use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::AlurkerjaConfig;
use crate::directory::FileUserDirectory;
use crate::project::User;
use crate::workflow::{
    NotificationSpec, ParallelSpec, Step, Transition, Workflow, WorkflowCatalog,
};

/// Seed the data directory: config file, an owner account, and a starter
/// workflow covering the common shapes (hand-off, parallel design step,
/// revision back-edge, terminal step).
pub async fn init_command(force: bool) -> Result<()> {
    let config = AlurkerjaConfig::default();
    let data_dir = Path::new(&config.data_dir);

    if data_dir.exists() && !force {
        bail!(
            "data directory '{}' already exists; re-run with --force to overwrite",
            config.data_dir
        );
    }

    tokio::fs::create_dir_all(data_dir).await?;
    config.save_to_file("alurkerja.toml")?;

    let directory = FileUserDirectory::new(&config.data_dir);
    directory
        .save_all(&[User {
            username: "owner".to_string(),
            display_name: "Owner".to_string(),
            roles: vec!["Owner".to_string()],
        }])
        .await?;

    let catalog = WorkflowCatalog::new(&config.data_dir);
    catalog.save(&starter_workflow()).await?;

    println!("✅ Initialized alurkerja");
    println!("   config:     alurkerja.toml");
    println!("   data dir:   {}", config.data_dir);
    println!("   workflow:   wf-desain-standar");
    println!("   first user: owner (role Owner)");
    println!();
    println!("Next: add users to {}/users.json, then", config.data_dir);
    println!("  alurkerja new-project \"Gedung A\" --workflow wf-desain-standar --user owner");
    Ok(())
}

fn starter_workflow() -> Workflow {
    let mut draft = step("Draft", "Draft", "Arsitek", 10, Some("Unggah denah awal"));
    draft.transitions.insert(
        "submit".to_string(),
        Transition {
            status: "Desain Paralel".to_string(),
            assigned_division: "Teknik".to_string(),
            next_action: Some("Tiap divisi unggah desain".to_string()),
            progress: 30,
            notification: Some(NotificationSpec {
                division: Some(crate::workflow::DivisionSelector::Many(vec![
                    "Arsitek".to_string(),
                    "Struktur".to_string(),
                    "MEP".to_string(),
                ])),
                message: "{project} masuk tahap desain paralel".to_string(),
            }),
        },
    );

    let mut design = step(
        "Desain Paralel",
        "Desain Paralel",
        "Teknik",
        30,
        Some("Tiap divisi unggah desain"),
    );
    design.revision_target = Some("Draft".to_string());
    design.parallel = Some(ParallelSpec {
        divisions: BTreeSet::from([
            "Arsitek".to_string(),
            "Struktur".to_string(),
            "MEP".to_string(),
        ]),
        completion_action: "design_done".to_string(),
    });
    design.transitions.insert(
        "design_done".to_string(),
        Transition {
            status: "Review".to_string(),
            assigned_division: "Admin Proyek".to_string(),
            next_action: Some("Periksa kelengkapan desain".to_string()),
            progress: 70,
            notification: Some(NotificationSpec {
                division: None,
                message: "{project} siap direview".to_string(),
            }),
        },
    );

    let mut review = step(
        "Review",
        "Review",
        "Admin Proyek",
        70,
        Some("Periksa kelengkapan desain"),
    );
    review.revision_target = Some("Desain Paralel".to_string());
    review.transitions.insert(
        "approve".to_string(),
        Transition {
            status: "Selesai".to_string(),
            assigned_division: "Admin Proyek".to_string(),
            next_action: None,
            progress: 100,
            notification: Some(NotificationSpec {
                division: Some(crate::workflow::DivisionSelector::One("Owner".to_string())),
                message: "{project} selesai".to_string(),
            }),
        },
    );

    let done = step("Selesai", "Selesai", "Admin Proyek", 100, None);

    Workflow {
        id: "wf-desain-standar".to_string(),
        name: "Desain Standar".to_string(),
        description: "Alur desain dengan tahap paralel tiga divisi".to_string(),
        steps: vec![draft, design, review, done],
    }
}

fn step(name: &str, status: &str, division: &str, progress: u8, next: Option<&str>) -> Step {
    Step {
        step_name: name.to_string(),
        status: status.to_string(),
        assigned_division: division.to_string(),
        progress,
        next_action: next.map(|s| s.to_string()),
        transitions: BTreeMap::new(),
        revision_target: None,
        parallel: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::validation;

    #[test]
    fn starter_workflow_passes_validation() {
        validation::validate(&starter_workflow()).unwrap();
    }
}
