#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` command.
//!
//! These tests exercise the full step list produced by [`all_install_tasks`],
//! the id-based filtering applied by the `--skip` and `--only` flags, and the
//! files the scaffolding steps leave under the project root.

mod common;

use std::collections::HashSet;
use std::os::unix::fs::PermissionsExt as _;

use common::{FILE_STEPS, IntegrationTestContext};
use healing_setup::commands::install::Selection;
use healing_setup::config::Preset;
use healing_setup::logging::TaskStatus;
use healing_setup::tasks::{self, all_install_tasks, run_sequence};

// ---------------------------------------------------------------------------
// Snapshot: full install step list
// ---------------------------------------------------------------------------

/// Snapshot of all install step names in their declared order.
///
/// Any addition, removal, reorder or rename of a step fails this test,
/// prompting a deliberate snapshot update.
#[test]
fn install_task_names() {
    let all_tasks = all_install_tasks();
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!("install_task_names", task_names.join("\n"));
}

// ---------------------------------------------------------------------------
// Structural invariants
// ---------------------------------------------------------------------------

#[test]
fn install_task_count() {
    assert_eq!(all_install_tasks().len(), 10);
}

/// Ids are what `--skip`/`--only` accept, so they must be unique.
#[test]
fn install_task_ids_are_unique() {
    let ids = tasks::task_ids();
    let seen: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(seen.len(), ids.len(), "duplicate step id in {ids:?}");
}

#[test]
fn every_step_id_is_selectable() {
    for id in tasks::task_ids() {
        let selection = Selection::new(&[], &[id.to_string()]).unwrap();
        assert!(selection.includes(id));
    }
}

#[test]
fn unknown_step_id_is_rejected() {
    assert!(Selection::new(&["fonts".to_string()], &[]).is_err());
}

// ---------------------------------------------------------------------------
// File-writing steps against a real directory
// ---------------------------------------------------------------------------

#[test]
fn file_steps_lay_down_project() {
    let fixture = IntegrationTestContext::new();
    let (ctx, log) = fixture.context(false);
    run_sequence(&all_install_tasks(), &ctx, |id| FILE_STEPS.contains(&id)).unwrap();

    for rel in [
        "docker-compose.yml",
        "README.md",
        "start.sh",
        "stop.sh",
        "status.sh",
        "services/auth-service/package.json",
        "services/protocol-service/index.js",
        "services/session-service/index.js",
    ] {
        assert!(fixture.path(rel).is_file(), "{rel} missing");
    }
    let mode = std::fs::metadata(fixture.path("start.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);

    let entries = log.task_entries();
    assert_eq!(entries.len(), 10);
    assert_eq!(log.failure_count(), 0);
    let not_selected = entries
        .iter()
        .filter(|e| e.status == TaskStatus::NotApplicable)
        .count();
    assert_eq!(not_selected, 6);
}

#[test]
fn second_run_changes_nothing() {
    let fixture = IntegrationTestContext::new();
    let (ctx, _log) = fixture.context(false);
    let all = all_install_tasks();
    run_sequence(&all, &ctx, |id| FILE_STEPS.contains(&id)).unwrap();
    let first = std::fs::read_to_string(fixture.path("docker-compose.yml")).unwrap();

    let (ctx, log) = fixture.context(false);
    run_sequence(&all, &ctx, |id| FILE_STEPS.contains(&id)).unwrap();
    let second = std::fs::read_to_string(fixture.path("docker-compose.yml")).unwrap();

    assert_eq!(first, second);
    assert!(
        log.task_entries()
            .iter()
            .all(|e| matches!(e.status, TaskStatus::Ok | TaskStatus::NotApplicable))
    );
}

#[test]
fn dry_run_writes_nothing() {
    let fixture = IntegrationTestContext::new();
    let (ctx, log) = fixture.context(true);
    run_sequence(&all_install_tasks(), &ctx, |id| FILE_STEPS.contains(&id)).unwrap();

    assert!(!fixture.root().exists());
    let dry = log
        .task_entries()
        .iter()
        .filter(|e| e.status == TaskStatus::DryRun)
        .count();
    assert_eq!(dry, FILE_STEPS.len());
}

#[test]
fn compose_declares_three_core_services_with_volumes() {
    let fixture = IntegrationTestContext::new().without_admin_ui();
    let (ctx, _log) = fixture.context(false);
    run_sequence(&all_install_tasks(), &ctx, |id| id == "compose").unwrap();

    let text = std::fs::read_to_string(fixture.path("docker-compose.yml")).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    let services = doc["services"].as_mapping().unwrap();
    assert_eq!(services.len(), 3);
    for name in ["mongodb", "timescaledb", "redis"] {
        let volume = doc["services"][name]["volumes"][0].as_str().unwrap();
        let named = volume.split(':').next().unwrap();
        assert!(doc["volumes"].get(named).is_some(), "{name} volume undeclared");
    }
}

#[test]
fn standard_compose_includes_admin_ui() {
    let fixture = IntegrationTestContext::new();
    let (ctx, _log) = fixture.context(false);
    run_sequence(&all_install_tasks(), &ctx, |id| id == "compose").unwrap();

    let text = std::fs::read_to_string(fixture.path("docker-compose.yml")).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(doc["services"].as_mapping().unwrap().len(), 4);
    assert_eq!(doc["services"]["adminer"]["ports"][0].as_str(), Some("8080:8080"));
}

#[test]
fn minimal_preset_binds_loopback() {
    let fixture = IntegrationTestContext::new().with_preset(Preset::Minimal);
    let (ctx, _log) = fixture.context(false);
    run_sequence(&all_install_tasks(), &ctx, |id| id == "compose").unwrap();

    let text = std::fs::read_to_string(fixture.path("docker-compose.yml")).unwrap();
    assert!(text.contains("127.0.0.1:6379:6379"));
    assert!(!text.contains("healing-net"));
}
