use axum::http::StatusCode;
use serde_json::json;

use crate::common::*;

mod search_endpoint {
    use super::*;

    #[tokio::test]
    async fn mirrors_then_returns_camel_case_rows() {
        let app = TestApp::spawn().await;
        app.judge.respond_with(vec![
            judge_submission(11, "alice", "1341", "C++17", epoch_millis(2024, 1, 1, 0, 0, 0) + 999),
            judge_submission(12, "alice", "1341", "Rust", epoch_millis(2024, 1, 2, 0, 0, 0)),
        ]);

        let res = app.search("alice", "", "", 0, 10).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.judge_ids(), vec![12, 11]);
        assert_eq!(
            res.body[1],
            json!({
                "judgeId": 11,
                "userId": "alice",
                "problemId": "1341",
                "language": "C++17",
                "version": "1.0",
                "submissionTime": "2024-01-01 09:00:00",
                "cpuTime": 10,
                "memory": 1024,
            })
        );
        assert_eq!(app.judge.requests(), vec!["/solutions/users/alice?page=0&size=10"]);
        assert_eq!(stored_count(&app.db).await, 2);
    }

    #[tokio::test]
    async fn accepts_pascal_case_fields() {
        let app = TestApp::spawn().await;
        app.judge.respond_with(vec![judge_submission(1, "bob", "ITP1_1_A", "JAVA", 0)]);

        let res = app
            .post(
                "/submissions",
                &json!({
                    "UserId": "",
                    "ProblemId": "ITP1_1_A",
                    "Language": "JAVA",
                    "PageId": 0,
                    "PageSize": 5,
                }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.judge_ids(), vec![1]);
        assert_eq!(
            app.judge.requests(),
            vec!["/solutions/problems/ITP1_1_A/lang/JAVA?page=0&size=5"]
        );
    }

    #[tokio::test]
    async fn unfiltered_search_serves_stored_rows_only() {
        let app = TestApp::spawn().await;
        seed(
            &app.db,
            vec![
                record(1, "alice", "1341", "C++17", "2024-01-01 09:00:00"),
                record(2, "bob", "1341", "Rust", "2024-01-02 09:00:00"),
            ],
        )
        .await;

        let res = app.search("", "", "", 0, 10).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.judge_ids(), vec![2, 1]);
        assert!(app.judge.requests().is_empty());
    }

    #[tokio::test]
    async fn repeated_requests_do_not_duplicate_rows() {
        let app = TestApp::spawn().await;
        app.judge.respond_with(vec![
            judge_submission(1, "alice", "1341", "C++17", 0),
            judge_submission(2, "alice", "1341", "C++17", 1_000),
        ]);

        let first = app.search("alice", "1341", "", 0, 10).await;
        let second = app.search("alice", "1341", "", 0, 10).await;

        assert_eq!(first.body, second.body);
        assert_eq!(stored_count(&app.db).await, 2);
    }

    #[tokio::test]
    async fn language_is_applied_locally_when_judge_cannot_filter_it() {
        let app = TestApp::spawn().await;
        app.judge.respond_with(vec![
            judge_submission(1, "alice", "1341", "C++17", 0),
            judge_submission(2, "alice", "1341", "Rust", 1_000),
        ]);

        let res = app.search("alice", "1341", "Rust", 0, 10).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.judge_ids(), vec![2]);
        assert_eq!(stored_count(&app.db).await, 2);
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let app = TestApp::spawn().await;
        let res = app.search("alice", "", "", 0, 0).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.judge.requests().is_empty());
    }

    #[tokio::test]
    async fn oversized_page_is_rejected() {
        let app = TestApp::spawn().await;
        let res = app.search("alice", "", "", 0, 1001).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_and_negative_page_fields_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post("/submissions", &json!({ "userId": "alice" })).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .post("/submissions", &json!({ "pageId": -1, "pageSize": 10 }))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod upstream_failures {
    use super::*;

    #[tokio::test]
    async fn judge_error_is_bad_gateway() {
        let app = TestApp::spawn().await;
        app.judge
            .respond_raw(StatusCode::SERVICE_UNAVAILABLE, "maintenance");

        let res = app.search("alice", "", "", 0, 10).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn malformed_record_is_bad_gateway_and_stores_nothing() {
        let app = TestApp::spawn().await;
        let mut broken = judge_submission(2, "alice", "1341", "C++17", 0);
        broken["judgeId"] = json!("not a number");
        app.judge.respond_with(vec![judge_submission(1, "alice", "1341", "C++17", 0), broken]);

        let res = app.search("alice", "", "", 0, 10).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "MALFORMED_RECORD");
        assert_eq!(stored_count(&app.db).await, 0);
    }

    #[tokio::test]
    async fn undecodable_body_is_bad_gateway() {
        let app = TestApp::spawn().await;
        app.judge.respond_raw(StatusCode::OK, "<html>");

        let res = app.search("", "1341", "", 0, 10).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "UPSTREAM_DECODE_ERROR");
    }
}

mod cors {
    use super::*;

    #[tokio::test]
    async fn preflight_from_allowed_origin_succeeds() {
        let app = TestApp::spawn().await;
        let res = app.preflight("/submissions", ALLOWED_ORIGIN).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.header("access-control-allow-origin"), Some(ALLOWED_ORIGIN));
        let methods = res.header("access-control-allow-methods").unwrap_or_default();
        assert!(methods.contains("POST"), "{methods}");
        assert!(methods.contains("OPTIONS"), "{methods}");
        let headers = res.header("access-control-allow-headers").unwrap_or_default();
        assert!(headers.contains("content-type"), "{headers}");
    }

    #[tokio::test]
    async fn other_origins_get_no_allow_header() {
        let app = TestApp::spawn().await;
        let res = app.preflight("/submissions", "http://evil.example").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.header("access-control-allow-origin"), None);
    }
}

mod storage_failures {
    use super::*;

    #[tokio::test]
    async fn closed_pool_is_service_unavailable() {
        let app = TestApp::spawn().await;
        seed(&app.db, vec![record(1, "alice", "1341", "C++17", "2024-01-01 09:00:00")]).await;
        app.db.clone().close().await.expect("Failed to close pool");

        let res = app.search("", "", "", 0, 10).await;

        assert_eq!(res.status, 503, "{}", res.text);
        assert_eq!(res.body["code"], "STORAGE_UNAVAILABLE");
        assert!(app.judge.requests().is_empty());
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = TestApp::spawn().await;
        let res = app.get("/health").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "ok");
    }
}
