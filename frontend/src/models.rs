use std::fmt;

use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/*                                 roles                                      */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Tutor, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Tutor => "tutor",
            Role::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Tutor => "Tutor",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* -------------------------------------------------------------------------- */
/*                            auth / profile                                  */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub role:         String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegisterBody {
    pub name:     String,
    pub email:    String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject:  Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name:     String,
    pub password: String,
}

/// Reply of the mutating endpoints; anything goes, `message` when present.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/* -------------------------------------------------------------------------- */
/*                       sessions / queries / answers                          */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Pending,
    Answered,
    Escalated,
    Resolved,
    #[serde(other)]
    Other,
}

impl QueryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryStatus::Pending => "pending",
            QueryStatus::Answered => "answered",
            QueryStatus::Escalated => "escalated",
            QueryStatus::Resolved => "resolved",
            QueryStatus::Other => "unknown",
        }
    }

    /// Shown in the "Tutor Resolutions" tab.
    pub fn is_escalation(self) -> bool {
        matches!(self, QueryStatus::Escalated | QueryStatus::Resolved)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Answer {
    pub answer_id: i64,
    pub content:   String,
    #[serde(default)]
    pub tutor_id:  Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Answer {
    pub fn is_ai(&self) -> bool {
        self.tutor_id.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Query {
    pub query_id:  i64,
    pub content:   String,
    pub status:    QueryStatus,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub answers:   Vec<Answer>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatSession {
    pub session_id: i64,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub queries:    Vec<Query>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewQuery {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image:   Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedbackBody {
    pub answer_id: i64,
    pub rating:    u8,
    pub comment:   String,
}

/* -------------------------------------------------------------------------- */
/*                                 tutor                                      */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PendingQuery {
    pub query_id:  i64,
    pub content:   String,
    #[serde(default = "escalated")]
    pub status:    QueryStatus,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn escalated() -> QueryStatus {
    QueryStatus::Escalated
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TutorAnswerBody {
    pub query_id: i64,
    pub content:  String,
}

/* -------------------------------------------------------------------------- */
/*                                 admin                                      */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_students:    u64,
    pub total_tutors:      u64,
    pub total_queries:     u64,
    pub queries_resolved:  u64,
    pub queries_escalated: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EscalationEntry {
    pub query_id:     i64,
    pub status:       String,
    #[serde(default)]
    pub escalated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TutorPerformance {
    pub tutor_name:    String,
    pub answers_given: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StudentActivity {
    pub name:    String,
    pub queries: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Reports {
    pub recent_escalations: Vec<EscalationEntry>,
    pub tutor_performance:  Vec<TutorPerformance>,
    pub student_activity:   Vec<StudentActivity>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UserRow {
    #[serde(default)]
    pub id:     Option<i64>,
    pub role:   String,
    pub name:   String,
    pub email:  String,
    #[serde(default)]
    pub joined: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_parses_with_null_tutor() {
        let raw = r#"[{"session_id":3,"started_at":"2024-05-01T10:00:00","queries":[
            {"query_id":1,"content":"2+2?","status":"answered","timestamp":"2024-05-01T10:00:01",
             "answers":[{"answer_id":9,"content":"4","tutor_id":null}]}]}]"#;
        let sessions: Vec<ChatSession> = serde_json::from_str(raw).unwrap();
        let answer = &sessions[0].queries[0].answers[0];
        assert!(answer.is_ai());
        assert_eq!(sessions[0].queries[0].status, QueryStatus::Answered);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let q: Query = serde_json::from_str(
            r#"{"query_id":1,"content":"x","status":"archived"}"#,
        )
        .unwrap();
        assert_eq!(q.status, QueryStatus::Other);
        assert!(q.answers.is_empty());
    }

    #[test]
    fn subject_is_omitted_when_absent() {
        let body = RegisterBody {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "pw".into(),
            subject: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("subject").is_none());
    }

    #[test]
    fn stats_fill_missing_counters() {
        let stats: Stats = serde_json::from_str(r#"{"total_queries":0}"#).unwrap();
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn image_is_omitted_when_absent() {
        let json = serde_json::to_string(&NewQuery { content: "hi".into(), image: None }).unwrap();
        assert_eq!(json, r#"{"content":"hi"}"#);
    }
}
