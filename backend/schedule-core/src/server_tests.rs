// src/server_tests.rs

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use reqwest::StatusCode as ReqwestStatusCode;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    use crate::manage_client::{ManageError, ScheduleQuery, DEFAULT_PAGE_SIZE};
    use crate::schedule_entry::{RawEntry, ScheduleTypeRef};
    use crate::schedule_service::ScheduleService;
    use crate::server::{router, AppState};

    enum StubResponse {
        Entries(Vec<RawEntry>),
        RateLimited,
        ApiError,
    }

    // Records the queries it receives and replays a canned response
    struct StubQuery {
        response: StubResponse,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl StubQuery {
        fn new(response: StubResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ScheduleQuery for StubQuery {
        async fn schedule_entries(
            &self,
            conditions: &str,
            page_size: u32,
        ) -> Result<Vec<RawEntry>, ManageError> {
            self.calls
                .lock()
                .unwrap()
                .push((conditions.to_string(), page_size));
            match &self.response {
                StubResponse::Entries(entries) => Ok(entries.clone()),
                StubResponse::RateLimited => Err(ManageError::RateLimitExceeded),
                StubResponse::ApiError => Err(ManageError::ApiError {
                    status: ReqwestStatusCode::BAD_REQUEST,
                    message: "conditions is invalid".to_string(),
                }),
            }
        }
    }

    fn entry(id: i64, code: &str, start: &str, end: &str, hours: f64, object_id: Option<i64>) -> RawEntry {
        RawEntry {
            id,
            object_id,
            name: None,
            member: None,
            date_start: start.to_string(),
            date_end: end.to_string(),
            hours,
            type_: ScheduleTypeRef {
                id: None,
                identifier: code.to_string(),
                name: None,
            },
        }
    }

    fn sample_entries() -> Vec<RawEntry> {
        vec![
            entry(
                1,
                "S",
                "2024-03-04T09:00:00Z",
                "2024-03-05T09:00:00Z",
                8.0,
                Some(1001),
            ),
            entry(
                2,
                "C",
                "2024-03-06T09:00:00Z",
                "2024-03-06T10:00:00Z",
                1.0,
                None,
            ),
        ]
    }

    fn app_with(query: Arc<StubQuery>) -> axum::Router {
        let state = AppState {
            schedule_service: Arc::new(ScheduleService::new(query)),
            default_timezone: chrono_tz::UTC,
        };
        router(state)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_status() {
        let app = app_with(StubQuery::new(StubResponse::Entries(vec![])));
        let (status, body) = get(app, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_get_schedule_returns_days_and_ticket_hours() {
        let query = StubQuery::new(StubResponse::Entries(sample_entries()));
        let app = app_with(query.clone());

        let (status, body) = get(
            app,
            "/api/schedule?member=jdoe&start_date=2024-03-04&timezone=UTC",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["member"], "jdoe");
        assert_eq!(body["startDate"], "2024-03-04");
        assert_eq!(body["timezone"], "UTC");
        assert_eq!(body["ticketHours"], json!({ "1001": 8.0 }));

        let days = body["days"].as_object().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days["2024-03-04"]["hours"], 4.0);
        assert_eq!(days["2024-03-05"]["tickets"], json!([1001]));
        assert_eq!(days["2024-03-05"]["times"]["09:00"], 1);
        assert!(!days.contains_key("2024-03-06"));

        let calls = query.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "member/identifier = \"jdoe\" AND dateStart >= [2024-03-03]"
        );
        assert_eq!(calls[0].1, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_default_timezone_is_used_when_omitted() {
        let app = app_with(StubQuery::new(StubResponse::Entries(sample_entries())));
        let (status, body) = get(app, "/api/schedule?member=jdoe&start_date=2024-03-04").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timezone"], "UTC");
    }

    #[tokio::test]
    async fn test_ticket_hours_endpoint() {
        let app = app_with(StubQuery::new(StubResponse::Entries(sample_entries())));
        let (status, body) = get(
            app,
            "/api/schedule/ticket-hours?member=jdoe&start_date=2024-03-04",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "1001": 8.0 }));
    }

    #[tokio::test]
    async fn test_unknown_timezone_is_bad_request() {
        let query = StubQuery::new(StubResponse::Entries(sample_entries()));
        let app = app_with(query.clone());
        let (status, body) = get(
            app,
            "/api/schedule?member=jdoe&start_date=2024-03-04&timezone=Nowhere/Land",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Nowhere/Land"));
        assert!(query.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_member_is_bad_request() {
        let app = app_with(StubQuery::new(StubResponse::Entries(vec![])));
        let (status, _) = get(app, "/api/schedule?member=%20&start_date=2024-03-04").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_start_date_is_rejected() {
        let app = app_with(StubQuery::new(StubResponse::Entries(vec![])));
        let (status, _) = get(app, "/api/schedule?member=jdoe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_rate_limit() {
        let app = app_with(StubQuery::new(StubResponse::RateLimited));
        let (status, _) = get(app, "/api/schedule?member=jdoe&start_date=2024-03-04").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_upstream_api_error_is_bad_gateway() {
        let app = app_with(StubQuery::new(StubResponse::ApiError));
        let (status, body) = get(app, "/api/schedule?member=jdoe&start_date=2024-03-04").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_entry_is_bad_gateway() {
        let entries = vec![entry(9, "S", "yesterday", "today", 1.0, None)];
        let app = app_with(StubQuery::new(StubResponse::Entries(entries)));
        let (status, body) = get(app, "/api/schedule?member=jdoe&start_date=2024-03-04").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("yesterday"));
    }
}
