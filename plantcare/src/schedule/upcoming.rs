//! Projection of upcoming task occurrences over a day horizon.

use chrono::{DateTime, Days, Utc};

use plantcare_model::{Plant, PlantTask};

use super::recurrence::next_occurrence_on_or_after;

/// Lists the tracked occurrences of `plant` due within `horizon_days` of
/// `now`, both ends inclusive, sorted by due date.
///
/// Each period contributes its own entry: the first occurrence counted
/// from the configuration's start date that is not before `now`. A
/// configuration whose seasonal periods both fall in the window yields two
/// entries for the same task type. Entries due at the same instant keep configuration order.
#[must_use]
pub fn project(plant: &Plant, horizon_days: u32, now: DateTime<Utc>) -> Vec<PlantTask> {
    let end = horizon_end(now, horizon_days);
    let mut tasks: Vec<PlantTask> = plant
        .configurations()
        .iter()
        .filter(|cfg| cfg.is_tracked)
        .flat_map(|cfg| {
            cfg.periods
                .iter()
                .filter_map(move |period| {
                    next_occurrence_on_or_after(cfg.start_date, &period.rule, now)
                        .map(|due| (cfg.task_type, due))
                })
        })
        .filter(|(_, due)| now <= *due && *due <= end)
        .map(|(task_type, due)| PlantTask::upcoming(plant, task_type, due))
        .collect();
    tasks.sort_by_key(|t| t.due_date);
    tasks
}

/// [`project`] over several plants, merged and re-sorted by due date.
#[must_use]
pub fn project_all(plants: &[Plant], horizon_days: u32, now: DateTime<Utc>) -> Vec<PlantTask> {
    let mut tasks: Vec<PlantTask> = plants
        .iter()
        .flat_map(|plant| project(plant, horizon_days, now))
        .collect();
    tasks.sort_by_key(|t| t.due_date);
    tasks
}

fn horizon_end(now: DateTime<Utc>, horizon_days: u32) -> DateTime<Utc> {
    now.checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
