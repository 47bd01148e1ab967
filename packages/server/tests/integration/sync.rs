use axum::http::StatusCode;
use judge_api::SearchFilter;
use mirror_server::sync::SyncError;

use crate::common::*;

mod upstream_requests {
    use super::*;

    #[tokio::test]
    async fn user_and_problem_become_path_segments() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;

        let filter = SearchFilter::new(0, 10)
            .with_user("alice")
            .with_problem("1341")
            .with_language("C++17");
        judge.synchronizer().sync(&db, &filter).await.unwrap();

        assert_eq!(
            judge.requests(),
            vec!["/solutions/users/alice/problems/1341?page=0&size=10"]
        );
    }

    #[tokio::test]
    async fn language_is_a_path_segment_when_user_is_alone() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;

        let filter = SearchFilter::new(2, 5).with_user("bob").with_language("JAVA");
        judge.synchronizer().sync(&db, &filter).await.unwrap();

        assert_eq!(
            judge.requests(),
            vec!["/solutions/users/bob/lang/JAVA?page=2&size=5"]
        );
    }

    #[tokio::test]
    async fn unfiltered_sync_does_not_call_the_judge() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;

        let report = judge
            .synchronizer()
            .sync(&db, &SearchFilter::new(0, 10))
            .await
            .unwrap();

        assert_eq!(report.fetched, 0);
        assert!(judge.requests().is_empty());
    }
}

mod storage {
    use super::*;

    #[tokio::test]
    async fn sync_is_idempotent() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;
        judge.respond_with(vec![
            judge_submission(1, "alice", "1341", "C++17", epoch_millis(2024, 1, 1, 0, 0, 0)),
            judge_submission(2, "alice", "1341", "Rust", epoch_millis(2024, 1, 2, 0, 0, 0)),
            judge_submission(3, "alice", "1341", "JAVA", epoch_millis(2024, 1, 3, 0, 0, 0)),
        ]);
        let filter = SearchFilter::new(0, 10).with_user("alice");
        let synchronizer = judge.synchronizer();

        let first = synchronizer.sync(&db, &filter).await.unwrap();
        assert_eq!((first.fetched, first.inserted), (3, 3));

        let second = synchronizer.sync(&db, &filter).await.unwrap();
        assert_eq!((second.fetched, second.inserted), (3, 0));
        assert_eq!(stored_count(&db).await, 3);
    }

    #[tokio::test]
    async fn first_stored_value_wins() {
        let db = test_db().await;
        seed(
            &db,
            vec![record(7, "alice", "1341", "C++17", "2024-01-01 09:00:00")],
        )
        .await;

        let judge = FakeJudge::spawn().await;
        let mut changed = judge_submission(7, "alice", "1341", "Rust", epoch_millis(2030, 1, 1, 0, 0, 0));
        changed["cpuTime"] = 999.into();
        judge.respond_with(vec![changed]);

        let report = judge
            .synchronizer()
            .sync(&db, &SearchFilter::new(0, 10).with_user("alice"))
            .await
            .unwrap();
        assert_eq!(report.inserted, 0);

        let row = stored(&db, 7).await.unwrap();
        assert_eq!(row.language, "C++17");
        assert_eq!(row.cpu_time, 10);
        assert_eq!(row.submission_time, local_time("2024-01-01 09:00:00"));
    }

    #[tokio::test]
    async fn submission_time_is_stored_in_tokyo_time() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;
        judge.respond_with(vec![judge_submission(
            1,
            "alice",
            "1341",
            "C++17",
            epoch_millis(2024, 3, 31, 20, 15, 30) + 750,
        )]);

        judge
            .synchronizer()
            .sync(&db, &SearchFilter::new(0, 10).with_problem("1341"))
            .await
            .unwrap();

        let row = stored(&db, 1).await.unwrap();
        assert_eq!(row.submission_time, local_time("2024-04-01 05:15:30"));
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn malformed_record_writes_nothing() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;
        let mut broken = judge_submission(2, "alice", "1341", "C++17", 0);
        broken.as_object_mut().unwrap().remove("memory");
        judge.respond_with(vec![
            judge_submission(1, "alice", "1341", "C++17", 0),
            broken,
            judge_submission(3, "alice", "1341", "C++17", 0),
        ]);

        let err = judge
            .synchronizer()
            .sync(&db, &SearchFilter::new(0, 10).with_user("alice"))
            .await
            .unwrap_err();

        match err {
            SyncError::MalformedRecord(e) => assert_eq!(e.index, 1),
            other => panic!("expected MalformedRecord, got {other}"),
        }
        assert_eq!(stored_count(&db).await, 0);
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;
        judge.respond_raw(StatusCode::INTERNAL_SERVER_ERROR, "oops");

        let err = judge
            .synchronizer()
            .sync(&db, &SearchFilter::new(0, 10).with_user("alice"))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::UpstreamUnavailable(_)), "{err}");
        assert_eq!(stored_count(&db).await, 0);
    }

    #[tokio::test]
    async fn non_array_body_is_a_decode_error() {
        let db = test_db().await;
        let judge = FakeJudge::spawn().await;
        judge.respond_raw(StatusCode::OK, r#"{"message": "not a list"}"#);

        let err = judge
            .synchronizer()
            .sync(&db, &SearchFilter::new(0, 10).with_language("Rust"))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::UpstreamDecode(_)), "{err}");
    }
}
