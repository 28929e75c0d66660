//! # HTTP Flow
//!
//! The documented REST scenario, end to end against real workers.

#[cfg(test)]
mod tests {
    use crate::integration::harness::Deployment;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tower::ServiceExt;
    use wo_01_frontend::WorkFrontendApi;

    fn app(d: &Deployment) -> Router {
        wo_01_frontend::router(Arc::clone(&d.frontend) as Arc<dyn WorkFrontendApi>)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn submit(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/rest/words")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn check() -> Request<Body> {
        Request::builder()
            .uri("/rest/wordsuppercase")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_foo_bar_baz_scenario() {
        let d = Deployment::start(2).await;
        let app = app(&d);

        let (status, body) = send(&app, submit(r#"{"words": "foo bar baz"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "msgCount": 3 }));

        let words = timeout(Duration::from_secs(2), async {
            let mut words = HashSet::new();
            while words.len() < 3 {
                let (status, body) = send(&app, check()).await;
                match status {
                    StatusCode::OK => {
                        assert!(body["backend"].as_str().unwrap().starts_with("be-it-"));
                        words.insert(body["word"].as_str().unwrap().to_string());
                    }
                    StatusCode::NO_CONTENT => tokio::time::sleep(Duration::from_millis(5)).await,
                    other => panic!("unexpected status {other}"),
                }
            }
            words
        })
        .await
        .expect("results did not arrive");

        assert_eq!(
            words,
            HashSet::from(["FOO".to_string(), "BAR".to_string(), "BAZ".to_string()])
        );

        let (status, body) = send(&app, check()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);
        d.stop().await;
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let d = Deployment::start(0).await;
        let app = app(&d);

        for body in ["{}", r#"{"words": ""}"#, "not json"] {
            let (status, json) = send(&app, submit(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(json["error"].is_string());
        }
        assert_eq!(d.broker.stats().published(), 0);
        d.stop().await;
    }

    #[tokio::test]
    async fn test_whitespace_only_counts_zero() {
        let d = Deployment::start(0).await;
        let (status, body) = send(&app(&d), submit(r#"{"words": "   "}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["msgCount"], 0);
        d.stop().await;
    }

    #[tokio::test]
    async fn test_broker_outage_is_503() {
        let d = Deployment::start(0).await;
        let app = app(&d);
        d.broker.set_available(false);

        let (status, body) = send(&app, check()).await;
        // The subscription was never created, so the gate reports it.
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Subscription"));

        d.broker.set_available(true);
        assert_eq!(send(&app, check()).await.0, StatusCode::NO_CONTENT);

        d.broker.set_available(false);
        assert_eq!(send(&app, check()).await.0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            send(&app, submit(r#"{"words":"x"}"#)).await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        d.stop().await;
    }
}
