use async_trait::async_trait;
use reqwest::StatusCode;

use super::http::{read_error, read_json, send, ServiceEndpoint};
use super::{ClientError, DeleteOutcome, SubmissionApi};
use crate::core::config::Settings;
use crate::schemas::{Assignment, Submission, SubmissionPayload};

/// JSON client for the submission service.
///
/// Routes, relative to the configured base URL:
/// `GET /assignments/{id}` and `GET|POST|PUT|DELETE /assignments/{id}/submission`.
#[derive(Debug, Clone)]
pub struct HttpSubmissionApi {
    endpoint: ServiceEndpoint,
}

impl HttpSubmissionApi {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Ok(Self { endpoint: ServiceEndpoint::from_settings(settings)? })
    }

    pub(crate) fn with_endpoint(endpoint: ServiceEndpoint) -> Self {
        Self { endpoint }
    }

    fn assignment_url(&self, assignment_id: &str) -> reqwest::Url {
        self.endpoint.url(&["assignments", assignment_id])
    }

    fn submission_url(&self, assignment_id: &str) -> reqwest::Url {
        self.endpoint.url(&["assignments", assignment_id, "submission"])
    }
}

#[async_trait]
impl SubmissionApi for HttpSubmissionApi {
    async fn get_assignment(&self, assignment_id: &str) -> Result<Assignment, ClientError> {
        let response = send(self.endpoint.get(self.assignment_url(assignment_id))).await?;
        read_json(response).await
    }

    async fn get_my_submission(
        &self,
        assignment_id: &str,
    ) -> Result<Option<Submission>, ClientError> {
        let response = send(self.endpoint.get(self.submission_url(assignment_id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response).await.map(Some)
    }

    async fn create_submission(
        &self,
        assignment_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, ClientError> {
        let response =
            send(self.endpoint.post(self.submission_url(assignment_id)).json(payload)).await?;
        read_json(response).await
    }

    async fn amend_submission(
        &self,
        assignment_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<Submission, ClientError> {
        let response =
            send(self.endpoint.put(self.submission_url(assignment_id)).json(payload)).await?;
        read_json(response).await
    }

    async fn delete_submission(&self, assignment_id: &str) -> Result<DeleteOutcome, ClientError> {
        let response = send(self.endpoint.delete(self.submission_url(assignment_id))).await?;
        if response.status().is_success() {
            return Ok(DeleteOutcome::Deleted);
        }

        match read_error(response).await {
            ClientError::Forbidden(message) => Ok(DeleteOutcome::Forbidden(message)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::clients::http::ServiceEndpoint;
    use crate::schemas::Resource;

    #[derive(Clone, Default)]
    struct Recorded {
        calls: Arc<Mutex<Vec<String>>>,
        graded: Arc<Mutex<bool>>,
    }

    impl Recorded {
        fn push(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    fn submission_json(assignment_id: &str, comment: Option<&str>, resources: Value) -> Value {
        json!({
            "id": "sub-1",
            "assignmentId": assignment_id,
            "submittedAt": "2025-01-05T00:00:00Z",
            "isLate": false,
            "studentComment": comment,
            "resources": resources,
            "grade": null,
            "feedback": null,
            "gradedAt": null
        })
    }

    async fn get_assignment(
        Path(id): Path<String>,
        State(recorded): State<Recorded>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        let auth = headers.get("authorization").and_then(|value| value.to_str().ok());
        recorded.push(format!("GET assignment {id} {}", auth.unwrap_or("-")));
        if id == "missing" {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(Json(json!({
            "id": id,
            "title": "Essay",
            "description": "Write it",
            "dueDate": "2025-01-10T00:00:00Z",
            "maxPoints": 100,
            "resources": []
        })))
    }

    async fn get_submission(
        Path(id): Path<String>,
        State(recorded): State<Recorded>,
    ) -> Result<Json<Value>, StatusCode> {
        recorded.push(format!("GET submission {id}"));
        if id == "fresh" {
            return Err(StatusCode::NOT_FOUND);
        }
        Ok(Json(submission_json(&id, None, json!([]))))
    }

    async fn create_submission(
        Path(id): Path<String>,
        State(recorded): State<Recorded>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        recorded.push(format!("POST submission {id}"));
        let comment = body["comment"].as_str().map(ToString::to_string);
        Json(submission_json(&id, comment.as_deref(), body["resources"].clone()))
    }

    async fn amend_submission(
        Path(id): Path<String>,
        State(recorded): State<Recorded>,
    ) -> (StatusCode, Json<Value>) {
        recorded.push(format!("PUT submission {id}"));
        (StatusCode::CONFLICT, Json(json!({"detail": "Submission changed on the server"})))
    }

    async fn delete_submission(
        Path(id): Path<String>,
        State(recorded): State<Recorded>,
    ) -> (StatusCode, Json<Value>) {
        recorded.push(format!("DELETE submission {id}"));
        if *recorded.graded.lock().unwrap() {
            return (StatusCode::FORBIDDEN, Json(json!({"detail": "Submission already graded"})));
        }
        (StatusCode::OK, Json(json!({"ok": true})))
    }

    async fn spawn_service(recorded: Recorded) -> String {
        let app = Router::new()
            .route("/api/assignments/:id", get(get_assignment))
            .route(
                "/api/assignments/:id/submission",
                get(get_submission)
                    .post(create_submission)
                    .put(amend_submission)
                    .delete(delete_submission),
            )
            .with_state(recorded);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}/api")
    }

    fn client(base_url: &str) -> HttpSubmissionApi {
        let endpoint = ServiceEndpoint::new(
            base_url,
            "learner-token",
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .expect("endpoint");
        HttpSubmissionApi::with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn reads_assignment_with_bearer_token() {
        let recorded = Recorded::default();
        let base_url = spawn_service(recorded.clone()).await;
        let api = client(&base_url);

        let assignment = api.get_assignment("hw-1").await.expect("assignment");
        assert_eq!(assignment.id, "hw-1");
        assert_eq!(assignment.max_points, 100.0);

        let err = api.get_assignment("missing").await.expect_err("missing");
        assert_eq!(err, ClientError::NotFound);

        let calls = recorded.calls.lock().unwrap().clone();
        assert_eq!(calls[0], "GET assignment hw-1 Bearer learner-token");
    }

    #[tokio::test]
    async fn missing_submission_is_none() {
        let base_url = spawn_service(Recorded::default()).await;
        let api = client(&base_url);

        assert!(api.get_my_submission("fresh").await.expect("fetch").is_none());
        assert!(api.get_my_submission("hw-1").await.expect("fetch").is_some());
    }

    #[tokio::test]
    async fn create_sends_payload_and_amend_surfaces_rejection() {
        let recorded = Recorded::default();
        let base_url = spawn_service(recorded.clone()).await;
        let api = client(&base_url);

        let payload = SubmissionPayload::new(
            Some("see link".to_string()),
            vec![Resource::link("A", "http://x")],
        );
        let created = api.create_submission("hw-1", &payload).await.expect("create");
        assert_eq!(created.resources, vec![Resource::link("A", "http://x")]);
        assert_eq!(created.student_comment.as_deref(), Some("see link"));

        let err = api.amend_submission("hw-1", &payload).await.expect_err("conflict");
        assert_eq!(
            err,
            ClientError::Rejected {
                status: 409,
                message: "Submission changed on the server".to_string()
            }
        );
    }

    #[tokio::test]
    async fn delete_distinguishes_forbidden() {
        let recorded = Recorded::default();
        let base_url = spawn_service(recorded.clone()).await;
        let api = client(&base_url);

        assert_eq!(api.delete_submission("hw-1").await.expect("delete"), DeleteOutcome::Deleted);

        *recorded.graded.lock().unwrap() = true;
        assert_eq!(
            api.delete_submission("hw-1").await.expect("delete"),
            DeleteOutcome::Forbidden("Submission already graded".to_string())
        );
    }
}
