use crate::error::AppError;
use crate::filter::{TaskQuery, filter_and_sort};
use crate::model::{Task, TaskStatus};
use crate::stats::{TaskStats, calculate_task_stats};
use crate::storage::json_store;
use crate::validate::{TaskDraft, parse_task};
use std::path::Path;
use time::OffsetDateTime;

pub fn add_task(draft: &TaskDraft) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, draft, OffsetDateTime::now_utc())
}

/// All stored tasks, most recently created first.
pub fn list_tasks() -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    list_tasks_with_path(&path)
}

pub fn query_tasks(query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let path = json_store::store_path()?;
    query_tasks_with_path(&path, query)
}

pub fn get_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, id)
}

pub fn update_task_status(id: &str, status: TaskStatus) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    update_task_status_with_path(&path, id, status, OffsetDateTime::now_utc())
}

pub fn task_stats() -> Result<TaskStats, AppError> {
    let path = json_store::store_path()?;
    task_stats_with_path(&path, OffsetDateTime::now_utc())
}

fn add_task_with_path(
    path: &Path,
    draft: &TaskDraft,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let new_task = parse_task(draft)?;

    let task = Task {
        id: format!("task-{}", now.unix_timestamp_nanos()),
        title: new_task.title,
        start_time: new_task.start_time,
        end_time: new_task.end_time,
        priority: new_task.priority,
        status: TaskStatus::Pending,
        created_at: now,
    };

    let mut tasks = json_store::load_tasks(path)?;
    tasks.push(task.clone());
    json_store::save_tasks(path, &tasks)?;

    tracing::debug!(id = %task.id, priority = %task.priority, "task added");
    Ok(task)
}

fn list_tasks_with_path(path: &Path) -> Result<Vec<Task>, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tasks)
}

fn query_tasks_with_path(path: &Path, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let tasks = list_tasks_with_path(path)?;
    Ok(filter_and_sort(&tasks, query))
}

fn get_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    json_store::load_tasks(path)?
        .into_iter()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))
}

fn update_task_status_with_path(
    path: &Path,
    id: &str,
    status: TaskStatus,
    now: OffsetDateTime,
) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    let mut tasks = json_store::load_tasks(path)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))?;

    if task.status == status {
        return Err(AppError::invalid_input(format!("task already {status}")));
    }

    if status == TaskStatus::Finished {
        // end_time records the completion instant and must stay after start_time
        if now <= task.start_time {
            return Err(AppError::invalid_input(
                "task cannot be finished before it starts",
            ));
        }
        task.end_time = now;
    }
    task.status = status;

    let updated = task.clone();
    json_store::save_tasks(path, &tasks)?;

    tracing::debug!(id = %updated.id, status = %updated.status, "task status updated");
    Ok(updated)
}

fn task_stats_with_path(path: &Path, now: OffsetDateTime) -> Result<TaskStats, AppError> {
    let tasks = json_store::load_tasks(path)?;
    Ok(calculate_task_stats(&tasks, now))
}
