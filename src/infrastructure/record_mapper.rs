use crate::domain::models::{Profile, Task};
use crate::infrastructure::error::ClientError;
use chrono::{DateTime, Utc};

/// Wire shape of a task as the resource API sends it: snake_case fields
/// and RFC 3339 timestamp strings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Normalizes a wire record into the client entity. A null or absent
/// description stays `None`; an empty string is a real (empty) value.
pub fn decode_task_record(record: &TaskRecord) -> Result<Task, ClientError> {
    let id = record.id.trim();
    if id.is_empty() {
        return Err(ClientError::InvalidPayload(
            "task record has an empty id".to_string(),
        ));
    }

    let created_at = parse_rfc3339_utc(&record.created_at, "created_at")?;
    let updated_at = parse_rfc3339_utc(&record.updated_at, "updated_at")?;

    Ok(Task {
        id: id.to_string(),
        title: record.title.clone(),
        description: record.description.clone(),
        completed: record.completed,
        owner_user_id: record.user_id.clone(),
        created_at,
        updated_at,
    })
}

pub fn decode_task_records(records: &[TaskRecord]) -> Result<Vec<Task>, ClientError> {
    records.iter().map(decode_task_record).collect()
}

pub fn decode_profile_record(record: &ProfileRecord) -> Profile {
    Profile {
        name: record.name.clone().unwrap_or_default(),
        email: record.email.clone(),
        image: record.image.clone(),
    }
}

fn parse_rfc3339_utc(value: &str, field_name: &str) -> Result<DateTime<Utc>, ClientError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| {
            ClientError::InvalidPayload(format!("invalid task record {field_name} '{value}': {error}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TaskRecord {
        TaskRecord {
            id: "t1".to_string(),
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            user_id: "u1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn decode_renames_fields_and_parses_timestamps() {
        let task = decode_task_record(&sample_record()).expect("decode record");
        assert_eq!(task.id, "t1");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.owner_user_id, "u1");
        assert!(!task.completed);
        assert_eq!(task.created_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn null_and_absent_descriptions_both_decode_to_none() {
        let from_null: TaskRecord = serde_json::from_str(
            r#"{"id":"t1","title":"Buy milk","description":null,"completed":false,
                "user_id":"u1","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .expect("deserialize record");
        let from_absent: TaskRecord = serde_json::from_str(
            r#"{"id":"t1","title":"Buy milk","completed":false,
                "user_id":"u1","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .expect("deserialize record");

        assert_eq!(
            decode_task_record(&from_null).expect("decode").description,
            None
        );
        assert_eq!(
            decode_task_record(&from_absent).expect("decode").description,
            None
        );
    }

    #[test]
    fn empty_string_description_is_preserved() {
        let mut record = sample_record();
        record.description = Some(String::new());
        let task = decode_task_record(&record).expect("decode record");
        assert_eq!(task.description, Some(String::new()));
    }

    #[test]
    fn decode_rejects_invalid_timestamps() {
        let mut record = sample_record();
        record.updated_at = "yesterday".to_string();
        let result = decode_task_record(&record);
        assert!(matches!(result, Err(ClientError::InvalidPayload(_))));
    }

    #[test]
    fn decode_rejects_an_empty_id() {
        let mut record = sample_record();
        record.id = "  ".to_string();
        let result = decode_task_record(&record);
        assert!(matches!(result, Err(ClientError::InvalidPayload(_))));
    }

    #[test]
    fn decode_many_fails_when_any_record_is_malformed() {
        let mut bad = sample_record();
        bad.created_at = "not-a-time".to_string();
        let result = decode_task_records(&[sample_record(), bad]);
        assert!(result.is_err());
    }

    #[test]
    fn profile_record_tolerates_a_missing_name() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{"email":"ada@example.com"}"#).expect("deserialize record");
        let profile = decode_profile_record(&record);
        assert_eq!(profile.name, "");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.image, None);
    }

    #[test]
    fn unknown_wire_fields_are_ignored() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"id":"t1","title":"Buy milk","completed":true,"user_id":"u1",
                "created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-02T00:00:00Z",
                "priority":"high"}"#,
        )
        .expect("deserialize record");
        let task = decode_task_record(&record).expect("decode record");
        assert!(task.completed);
    }
}
