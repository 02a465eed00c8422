//! Dashboard statistics derived from a task collection.
//!
//! All durations are whole hours, truncated toward zero. Percentages are in
//! the range `0.0..=100.0`.

use crate::model::{Priority, Task, TaskStatus};
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityTimeStats {
    pub priority: Priority,
    /// Hours already spent on pending tasks of this priority.
    pub time_lapsed: i64,
    /// Hours remaining until the planned end of pending tasks of this priority.
    pub estimated_time_left: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_percentage: f64,
    pub pending_percentage: f64,
    /// One entry per priority level, highest priority first.
    pub time_stats: Vec<PriorityTimeStats>,
    pub average_completion_time: f64,
}

/// Computes [`TaskStats`] for `tasks` as observed at `now`.
///
/// An empty collection reports 0% completed and 0% pending.
pub fn calculate_task_stats(tasks: &[Task], now: OffsetDateTime) -> TaskStats {
    let total_tasks = tasks.len();
    let finished: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Finished)
        .collect();
    let pending: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .collect();

    let time_stats = Priority::all()
        .map(|priority| {
            let (time_lapsed, estimated_time_left) = pending
                .iter()
                .filter(|task| task.priority == priority)
                .fold((0, 0), |(lapsed, left), task| {
                    (
                        lapsed + hours_between(task.start_time, now).max(0),
                        left + hours_between(now, task.end_time).max(0),
                    )
                });
            PriorityTimeStats {
                priority,
                time_lapsed,
                estimated_time_left,
            }
        })
        .collect();

    let average_completion_time = if finished.is_empty() {
        0.0
    } else {
        let total: i64 = finished
            .iter()
            .map(|task| hours_between(task.start_time, task.end_time))
            .sum();
        total as f64 / finished.len() as f64
    };

    TaskStats {
        total_tasks,
        completed_percentage: percentage(finished.len(), total_tasks),
        pending_percentage: percentage(pending.len(), total_tasks),
        time_stats,
        average_completion_time,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

fn hours_between(from: OffsetDateTime, to: OffsetDateTime) -> i64 {
    (to - from).whole_hours()
}
