use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::resource::Resource;

/// Coursework item as served by the course-authoring service. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    pub max_points: f64,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Assignment {
    pub fn is_past_due(&self, now: OffsetDateTime) -> bool {
        now > self.due_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn deserializes_camel_case_payload() {
        let assignment: Assignment = serde_json::from_value(serde_json::json!({
            "id": "hw-1",
            "title": "Essay",
            "dueDate": "2025-01-10T00:00:00Z",
            "maxPoints": 100.0,
            "resources": [
                {"title": "Brief", "resourceLink": "https://x.example/brief.pdf", "fileType": "PDF"}
            ]
        }))
        .expect("assignment");

        assert_eq!(assignment.due_date, datetime!(2025-01-10 00:00 UTC));
        assert_eq!(assignment.description, "");
        assert_eq!(assignment.resources.len(), 1);
    }

    #[test]
    fn past_due_is_strict() {
        let assignment = Assignment {
            id: "hw-1".to_string(),
            title: "Essay".to_string(),
            description: String::new(),
            due_date: datetime!(2025-01-10 00:00 UTC),
            max_points: 10.0,
            resources: Vec::new(),
        };
        assert!(!assignment.is_past_due(datetime!(2025-01-10 00:00 UTC)));
        assert!(assignment.is_past_due(datetime!(2025-01-10 00:00:01 UTC)));
    }
}
