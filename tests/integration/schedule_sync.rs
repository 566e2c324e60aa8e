//! Integration tests for reminder synchronization.
//!
//! Covers upsert of enabled configurations, idempotency, staleness cleanup
//! and failure isolation across plants.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use plantcare::model::{Period, Plant, RecurrenceRule, ReminderId, TaskConfiguration, TaskType};
use plantcare::{InMemoryScheduler, NotificationScheduler, ScheduleSynchronizer, SyncFailure};

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

/// The instant every synchronization in this file runs at.
fn now() -> DateTime<Utc> {
    at(2024, 1, 1)
}

fn daily(n: u32) -> Period {
    Period::new(format!("every {n} days"), RecurrenceRule::daily(n).unwrap())
}

fn notified(task_type: TaskType, period: Period) -> TaskConfiguration {
    TaskConfiguration::new(task_type, at(2024, 1, 1))
        .with_notifications()
        .with_period(period)
}

fn setup() -> (Arc<InMemoryScheduler>, ScheduleSynchronizer<InMemoryScheduler>) {
    let scheduler = Arc::new(InMemoryScheduler::new());
    let sync = ScheduleSynchronizer::new(Arc::clone(&scheduler));
    (scheduler, sync)
}

// ---------------------------------------------------------------------------
// Upsert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn schedules_earliest_period_per_task_type() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Calathea").with_configuration(
        TaskConfiguration::new(TaskType::Watering, at(2024, 1, 1))
            .with_notifications()
            .with_period(daily(10))
            .with_period(daily(4)),
    );

    sync.synchronize(&plant, now()).await.unwrap();

    let pending = scheduler.pending().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending.get(&ReminderId::new(&plant.id, TaskType::Watering)),
        Some(&at(2024, 1, 5))
    );
}

#[tokio::test]
async fn untracked_and_muted_configurations_are_not_scheduled() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Cactus")
        .with_configuration(TaskConfiguration::new(TaskType::Watering, at(2024, 1, 1)).with_period(daily(3)))
        .with_configuration(
            TaskConfiguration::new(TaskType::Fertilizing, at(2024, 1, 1))
                .tracked()
                .with_period(daily(3)),
        );

    let report = sync.synchronize(&plant, now()).await.unwrap();
    assert!(report.scheduled.is_empty());
    assert!(scheduler.pending().await.is_empty());
}

#[tokio::test]
async fn configuration_without_periods_schedules_nothing() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Cactus").with_configuration(
        TaskConfiguration::new(TaskType::Repotting, at(2024, 1, 1)).with_notifications(),
    );

    sync.synchronize(&plant, now()).await.unwrap();
    assert!(scheduler.pending().await.is_empty());
}

#[tokio::test]
async fn trigger_is_rolled_forward_to_current_instant() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Fern").with_configuration(notified(TaskType::Watering, daily(7)));
    let id = ReminderId::new(&plant.id, TaskType::Watering);

    // Months after the start date, the first occurrence is long past.
    sync.synchronize(&plant, at(2024, 6, 1)).await.unwrap();
    assert_eq!(scheduler.trigger_for(&id).await, Some(at(2024, 6, 3)));
}

#[tokio::test]
async fn synchronize_does_not_pull_reminder_into_the_past() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Fern").with_configuration(notified(TaskType::Watering, daily(7)));
    let id = ReminderId::new(&plant.id, TaskType::Watering);
    scheduler.schedule(&id, at(2024, 6, 8)).await.unwrap();

    let now = at(2024, 6, 4);
    sync.synchronize(&plant, now).await.unwrap();

    let trigger = scheduler.trigger_for(&id).await.unwrap();
    assert!(trigger >= now);
    assert_eq!(trigger, at(2024, 6, 10));
}

// ---------------------------------------------------------------------------
// Idempotency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn synchronize_twice_yields_same_table() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Fern")
        .with_configuration(notified(TaskType::Watering, daily(7)))
        .with_configuration(notified(
            TaskType::PestInspection,
            Period::new("Fortnightly", RecurrenceRule::weekly(2, 4).unwrap()),
        ));

    sync.synchronize(&plant, now()).await.unwrap();
    let first = scheduler.pending().await;

    let second_report = sync.synchronize(&plant, now()).await.unwrap();
    let second = scheduler.pending().await;

    assert_eq!(first, second);
    assert_eq!(second.len(), 2);
    assert!(second_report.cancelled.is_empty());
}

// ---------------------------------------------------------------------------
// Staleness cleanup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn untracking_removes_reminder() {
    let (scheduler, sync) = setup();
    let mut plant = Plant::new("Fern").with_configuration(notified(TaskType::Watering, daily(7)));
    let id = ReminderId::new(&plant.id, TaskType::Watering);

    sync.synchronize(&plant, now()).await.unwrap();
    assert!(scheduler.trigger_for(&id).await.is_some());

    plant.configuration_mut(TaskType::Watering).unwrap().is_tracked = false;
    let report = sync.synchronize(&plant, now()).await.unwrap();

    assert_eq!(report.cancelled, vec![id.clone()]);
    assert!(scheduler.trigger_for(&id).await.is_none());
}

#[tokio::test]
async fn disabling_notifications_removes_reminder() {
    let (scheduler, sync) = setup();
    let mut plant = Plant::new("Fern").with_configuration(notified(TaskType::Cleaning, daily(14)));
    let id = ReminderId::new(&plant.id, TaskType::Cleaning);

    sync.synchronize(&plant, now()).await.unwrap();
    plant.configuration_mut(TaskType::Cleaning).unwrap().has_notifications = false;
    sync.synchronize(&plant, now()).await.unwrap();

    assert!(scheduler.trigger_for(&id).await.is_none());
}

#[tokio::test]
async fn removed_configuration_reminder_is_cancelled() {
    let (scheduler, sync) = setup();
    let mut plant = Plant::new("Fern")
        .with_configuration(notified(TaskType::Watering, daily(7)))
        .with_configuration(notified(TaskType::Fertilizing, daily(30)));

    sync.synchronize(&plant, now()).await.unwrap();
    assert_eq!(scheduler.pending().await.len(), 2);

    plant.remove_configuration(TaskType::Fertilizing);
    sync.synchronize(&plant, now()).await.unwrap();

    let pending = scheduler.pending().await;
    assert_eq!(pending.len(), 1);
    assert!(pending.contains_key(&ReminderId::new(&plant.id, TaskType::Watering)));
}

#[tokio::test]
async fn cleanup_does_not_touch_other_plants() {
    let (scheduler, sync) = setup();
    let fern = Plant::new("Fern").with_configuration(notified(TaskType::Watering, daily(7)));
    let mut ivy = Plant::new("Ivy").with_configuration(notified(TaskType::Watering, daily(3)));

    sync.synchronize(&fern, now()).await.unwrap();
    sync.synchronize(&ivy, now()).await.unwrap();

    ivy.remove_configuration(TaskType::Watering);
    sync.synchronize(&ivy, now()).await.unwrap();

    let pending = scheduler.pending().await;
    assert_eq!(pending.len(), 1);
    assert!(pending.contains_key(&ReminderId::new(&fern.id, TaskType::Watering)));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_upsert_keeps_prior_reminder() {
    let (scheduler, sync) = setup();
    let mut plant = Plant::new("Fern").with_configuration(notified(TaskType::Watering, daily(7)));
    let id = ReminderId::new(&plant.id, TaskType::Watering);
    sync.synchronize(&plant, now()).await.unwrap();

    // Configuration changes but the service refuses the new trigger.
    plant.upsert_configuration(notified(TaskType::Watering, daily(2)));
    scheduler.reject_schedule_for(id.clone()).await;

    let err = sync.synchronize(&plant, now()).await.unwrap_err();
    assert_eq!(err.plant_id, plant.id);
    assert!(matches!(
        &err.failures[..],
        [SyncFailure::Schedule { task_type: TaskType::Watering, .. }]
    ));
    // Neither rescheduled nor cleaned up as stale.
    assert_eq!(scheduler.trigger_for(&id).await, Some(at(2024, 1, 8)));
}

#[tokio::test]
async fn one_rejected_configuration_does_not_block_others() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Fern")
        .with_configuration(notified(TaskType::Watering, daily(7)))
        .with_configuration(notified(TaskType::Cleaning, daily(14)));
    scheduler
        .reject_schedule_for(ReminderId::new(&plant.id, TaskType::Watering))
        .await;

    let err = sync.synchronize(&plant, now()).await.unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(
        err.partial.scheduled,
        vec![(ReminderId::new(&plant.id, TaskType::Cleaning), at(2024, 1, 15))]
    );
}

#[tokio::test]
async fn failed_cleanup_reports_stale_ids() {
    let (scheduler, sync) = setup();
    let mut plant = Plant::new("Fern")
        .with_configuration(notified(TaskType::Watering, daily(7)))
        .with_configuration(notified(TaskType::Fertilizing, daily(30)));
    sync.synchronize(&plant, now()).await.unwrap();

    plant.remove_configuration(TaskType::Fertilizing);
    scheduler.reject_cancel(true);
    let err = sync.synchronize(&plant, now()).await.unwrap_err();

    let stale = ReminderId::new(&plant.id, TaskType::Fertilizing);
    assert!(matches!(
        &err.failures[..],
        [SyncFailure::Cancel { ids, .. }] if ids == &[stale.clone()]
    ));
    assert!(err.partial.cancelled.is_empty());
    // The stale reminder is still there for the next run to clean up.
    assert!(scheduler.trigger_for(&stale).await.is_some());

    scheduler.reject_cancel(false);
    let report = sync.synchronize(&plant, now()).await.unwrap();
    assert_eq!(report.cancelled, vec![stale]);
}

#[tokio::test]
async fn synchronize_all_isolates_failing_plant() {
    let (scheduler, sync) = setup();
    let fern = Plant::new("Fern").with_configuration(notified(TaskType::Watering, daily(7)));
    let ivy = Plant::new("Ivy").with_configuration(notified(TaskType::Watering, daily(3)));
    let palm = Plant::new("Palm").with_configuration(notified(TaskType::Cleaning, daily(21)));
    scheduler
        .reject_schedule_for(ReminderId::new(&ivy.id, TaskType::Watering))
        .await;

    let outcome = sync
        .synchronize_all(&[fern.clone(), ivy.clone(), palm.clone()], now())
        .await;

    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].plant_id, ivy.id);

    let pending = scheduler.pending().await;
    assert!(pending.contains_key(&ReminderId::new(&fern.id, TaskType::Watering)));
    assert!(pending.contains_key(&ReminderId::new(&palm.id, TaskType::Cleaning)));
    assert!(!pending.contains_key(&ReminderId::new(&ivy.id, TaskType::Watering)));
}

#[tokio::test]
async fn unavailable_service_reports_list_failure() {
    let (scheduler, sync) = setup();
    let plant = Plant::new("Empty");
    scheduler.set_unavailable(true);

    let err = sync.synchronize(&plant, now()).await.unwrap_err();
    assert!(matches!(&err.failures[..], [SyncFailure::ListPending(_)]));

    scheduler.set_unavailable(false);
    assert!(sync.synchronize(&plant, now()).await.is_ok());
    assert!(scheduler.list_pending_ids().await.unwrap().is_empty());
}
