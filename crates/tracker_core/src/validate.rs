use crate::error::AppError;
use crate::model::{NewTask, Priority};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Raw task submission as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub priority: Option<i64>,
}

/// Collects every problem with `draft`; an empty list means it can be stored.
pub fn validate_task(draft: &TaskDraft) -> Vec<String> {
    check_draft(draft).err().unwrap_or_default()
}

/// Validates `draft` and converts it into a [`NewTask`].
pub fn parse_task(draft: &TaskDraft) -> Result<NewTask, AppError> {
    check_draft(draft).map_err(|errors| AppError::invalid_input(errors.join("; ")))
}

fn check_draft(draft: &TaskDraft) -> Result<NewTask, Vec<String>> {
    let mut errors = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.push("title is required".to_string());
    }

    let start = check_timestamp(draft.start_time.as_deref(), "start time", &mut errors);
    let end = check_timestamp(draft.end_time.as_deref(), "end time", &mut errors);

    if let (Some(start), Some(end)) = (start, end)
        && start >= end
    {
        errors.push("end time must be after start time".to_string());
    }

    let priority = draft
        .priority
        .and_then(|value| u8::try_from(value).ok())
        .and_then(|value| Priority::new(value).ok());
    if priority.is_none() {
        errors.push("priority must be between 1 and 5".to_string());
    }

    match (start, end, priority) {
        (Some(start_time), Some(end_time), Some(priority)) if errors.is_empty() => Ok(NewTask {
            title: title.to_string(),
            start_time,
            end_time,
            priority,
        }),
        _ => Err(errors),
    }
}

fn check_timestamp(
    raw: Option<&str>,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<OffsetDateTime> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => {
            errors.push(format!("{label} is required"));
            None
        }
        Some(value) => match OffsetDateTime::parse(value, &Rfc3339) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(format!("{label} must be RFC3339"));
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskDraft, parse_task, validate_task};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "write report".to_string(),
            start_time: Some("2025-03-01T09:00:00Z".to_string()),
            end_time: Some("2025-03-01T17:00:00Z".to_string()),
            priority: Some(2),
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(validate_task(&draft()).is_empty());
    }

    #[test]
    fn empty_draft_reports_every_problem() {
        let errors = validate_task(&TaskDraft::default());

        assert_eq!(
            errors,
            vec![
                "title is required".to_string(),
                "start time is required".to_string(),
                "end time is required".to_string(),
                "priority must be between 1 and 5".to_string(),
            ]
        );
    }

    #[test]
    fn end_must_follow_start() {
        let mut equal = draft();
        equal.end_time = equal.start_time.clone();

        let errors = validate_task(&equal);

        assert_eq!(errors, vec!["end time must be after start time".to_string()]);
    }

    #[test]
    fn rejects_out_of_range_priority() {
        for value in [0, 6, -1, 300] {
            let mut bad = draft();
            bad.priority = Some(value);
            assert_eq!(
                validate_task(&bad),
                vec!["priority must be between 1 and 5".to_string()]
            );
        }
    }

    #[test]
    fn rejects_malformed_timestamps() {
        let mut bad = draft();
        bad.start_time = Some("tomorrow".to_string());

        assert_eq!(
            validate_task(&bad),
            vec!["start time must be RFC3339".to_string()]
        );
    }

    #[test]
    fn parse_task_trims_title_and_converts_fields() {
        let mut padded = draft();
        padded.title = "  write report  ".to_string();

        let task = parse_task(&padded).unwrap();

        assert_eq!(task.title, "write report");
        assert_eq!(task.start_time, datetime!(2025-03-01 09:00 UTC));
        assert_eq!(task.end_time, datetime!(2025-03-01 17:00 UTC));
        assert_eq!(task.priority.value(), 2);
    }

    #[test]
    fn parse_task_joins_messages() {
        let mut bad = draft();
        bad.title = " ".to_string();
        bad.priority = None;

        let err = parse_task(&bad).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(
            err.message(),
            "title is required; priority must be between 1 and 5"
        );
    }

    #[test]
    fn parse_task_fails_exactly_when_validation_reports_problems() {
        let mut drafts = vec![draft(), TaskDraft::default()];
        let mut inverted = draft();
        inverted.end_time = Some("2025-03-01T08:00:00Z".to_string());
        drafts.push(inverted);
        let mut offset = draft();
        offset.start_time = Some(" 2025-03-01T10:00:00+02:00 ".to_string());
        drafts.push(offset);

        for candidate in &drafts {
            let errors = validate_task(candidate);
            match parse_task(candidate) {
                Ok(_) => assert!(errors.is_empty()),
                Err(err) => assert_eq!(err.message(), errors.join("; ")),
            }
        }
    }
}
