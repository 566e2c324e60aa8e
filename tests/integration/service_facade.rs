//! Integration tests for the application-facing facade.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use plantcare::model::{Period, Plant, PlantId, RecurrenceRule, ReminderId, TaskConfiguration, TaskType};
use plantcare::{
    EngineConfig, InMemoryScheduler, InMemoryTaskStore, ManualClock, PlantCareService,
    ReminderOutcome, StoreError,
};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

type Service = PlantCareService<InMemoryScheduler, InMemoryTaskStore, Arc<ManualClock>>;

struct Harness {
    scheduler: Arc<InMemoryScheduler>,
    store: Arc<InMemoryTaskStore>,
    clock: Arc<ManualClock>,
    service: Service,
}

fn harness(config: EngineConfig, now: DateTime<Utc>) -> Harness {
    let scheduler = Arc::new(InMemoryScheduler::new());
    let store = Arc::new(InMemoryTaskStore::new());
    let clock = Arc::new(ManualClock::new(now));
    let service = PlantCareService::new(
        config,
        Arc::clone(&scheduler),
        Arc::clone(&store),
        Arc::clone(&clock),
    );
    Harness {
        scheduler,
        store,
        clock,
        service,
    }
}

fn every(n: u32) -> Plant {
    Plant::new("Pothos").with_configuration(
        TaskConfiguration::new(TaskType::Watering, at(2024, 1, 1))
            .with_notifications()
            .with_period(Period::new("Regular", RecurrenceRule::daily(n).unwrap())),
    )
}

// ---------------------------------------------------------------------------
// Upcoming tasks
// ---------------------------------------------------------------------------

#[test]
fn default_horizon_comes_from_config() {
    let config = EngineConfig::from_toml_str("[schedule]\ndefault_horizon_days = 3\n").unwrap();
    let h = harness(config, at(2024, 1, 1));

    assert_eq!(h.service.upcoming_tasks(&every(3)).len(), 1);
    assert!(h.service.upcoming_tasks(&every(4)).is_empty());
}

#[test]
fn requested_horizon_is_capped() {
    let config = EngineConfig::from_toml_str("[schedule]\nmax_horizon_days = 30\n").unwrap();
    let h = harness(config, at(2024, 1, 1));

    assert_eq!(h.service.upcoming_tasks_within(&every(30), 1000).len(), 1);
    assert!(h.service.upcoming_tasks_within(&every(31), 1000).is_empty());
}

#[test]
fn projection_follows_the_clock() {
    let h = harness(EngineConfig::default(), at(2024, 1, 1));
    let plant = every(7);
    assert_eq!(h.service.upcoming_tasks(&plant).len(), 1);

    h.clock.advance(Duration::days(8));
    let tasks = h.service.upcoming_tasks(&plant);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].due_date, at(2024, 1, 15));

    h.clock.set(at(2024, 6, 1));
    let tasks = h.service.upcoming_tasks(&plant);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].due_date, at(2024, 6, 3));
}

#[test]
fn upcoming_tasks_for_merges_plants() {
    let h = harness(EngineConfig::default(), at(2024, 1, 1));
    let plants = [every(6), every(2)];

    let tasks = h.service.upcoming_tasks_for(&plants, 14);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].plant_id, plants[1].id);
    assert_eq!(tasks[1].plant_id, plants[0].id);
}

// ---------------------------------------------------------------------------
// Completion and history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_task_now_uses_clock() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    let plant = every(7);

    let outcome = h
        .service
        .complete_task_now(&plant, TaskType::Watering)
        .await
        .unwrap();

    assert_eq!(outcome.record.completion_date, Some(at(2024, 1, 10)));
    assert_eq!(
        outcome.reminder,
        ReminderOutcome::Scheduled {
            reminder_id: ReminderId::new(&plant.id, TaskType::Watering),
            trigger_at: at(2024, 1, 17),
        }
    );
    assert_eq!(h.service.completed_tasks(&plant.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn completed_tasks_for_reports_each_plant() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    let a = every(7);
    let b = every(3);
    h.service
        .complete_task_now(&a, TaskType::Watering)
        .await
        .unwrap();

    let outcome = h.service.completed_tasks_for(&[a.id, b.id]).await;
    assert!(outcome.is_complete());
    let counts: Vec<usize> = outcome.succeeded.iter().map(Vec::len).collect();
    assert_eq!(counts, vec![1, 0]);
}

#[tokio::test]
async fn completed_tasks_for_surfaces_store_failures() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    h.store.set_unavailable(true);
    let ids = [PlantId::new(), PlantId::new()];

    let outcome = h.service.completed_tasks_for(&ids).await;
    assert!(outcome.succeeded.is_empty());
    assert_eq!(outcome.failed.len(), 2);
    assert!(outcome
        .failed
        .iter()
        .all(|(_, e)| matches!(e, StoreError::Unavailable(_))));
}

// ---------------------------------------------------------------------------
// Synchronization and deletion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_then_delete_plant_clears_everything() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    let plant = every(7);

    h.service.synchronize(&plant).await.unwrap();
    h.service
        .complete_task_now(&plant, TaskType::Watering)
        .await
        .unwrap();
    assert_eq!(h.scheduler.pending().await.len(), 1);

    let deleted = h.service.delete_plant(&plant.id).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(h.scheduler.pending().await.is_empty());
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn delete_task_type_through_facade() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    let plant = every(7);
    h.service
        .complete_task_now(&plant, TaskType::Watering)
        .await
        .unwrap();

    h.service
        .delete_task_type(&plant, TaskType::Watering)
        .await
        .unwrap();
    assert!(h.scheduler.pending().await.is_empty());
    assert_eq!(h.service.completed_tasks(&plant.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn synchronize_all_through_facade() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    let outcome = h.service.synchronize_all(&[every(7), every(3)]).await;
    assert!(outcome.is_complete());
    assert_eq!(h.scheduler.pending().await.len(), 2);
}

#[tokio::test]
async fn synchronize_uses_clock_instant() {
    let h = harness(EngineConfig::default(), at(2024, 1, 10));
    let plant = every(7);

    h.service.synchronize(&plant).await.unwrap();
    assert_eq!(
        h.scheduler
            .trigger_for(&ReminderId::new(&plant.id, TaskType::Watering))
            .await,
        Some(at(2024, 1, 15))
    );
}
