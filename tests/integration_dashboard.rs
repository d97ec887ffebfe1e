mod common;

use admitdesk_db::StudentRepository;
use admitdesk_models::students::{Stream, StudentFilter};
use axum::http::StatusCode;
use common::{TestApp, body_json, get_request, json_request};
use serde_json::json;

#[tokio::test]
async fn test_summary_stats() {
    let app = TestApp::new().await;
    app.seed_student("A", Stream::Pcm, |s| {
        s.roll_no = Some(1);
        s.admit_card_generated = true;
        s.admit_card_sent = true;
    })
    .await;
    app.seed_student("B", Stream::Pcm, |s| {
        s.roll_no = Some(2);
        s.admit_card_generated = true;
    })
    .await;
    app.seed_student("C", Stream::Pcb, |_| {}).await;

    let response = app
        .request(get_request("/api/admin/summary-stats", Some(&app.token())))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "totalStudents": 3,
            "pcmCount": 2,
            "pcbCount": 1,
            "admitCardGenerated": 2,
            "admitCardSent": 1,
            "rollNumbersAssigned": 2,
        })
    );
}

#[tokio::test]
async fn test_dashboard_stats_sorted_by_count() {
    let app = TestApp::new().await;
    app.seed_student("A", Stream::Pcb, |_| {}).await;
    app.seed_student("B", Stream::Pcm, |_| {}).await;
    app.seed_student("C", Stream::Pcb, |s| s.scholarship_offered = true)
        .await;

    let response = app
        .request(get_request("/api/admin/dashboard-stats", Some(&app.token())))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["stream"],
        json!([{ "name": "PCB", "count": 2 }, { "name": "PCM", "count": 1 }])
    );
    assert_eq!(
        body["scholarship"],
        json!([{ "name": "No", "count": 2 }, { "name": "Yes", "count": 1 }])
    );
    assert_eq!(body["gender"], json!([{ "name": "Female", "count": 3 }]));
}

#[tokio::test]
async fn test_stats_require_admin() {
    let app = TestApp::new().await;

    let response = app
        .request(get_request("/api/admin/summary-stats", None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_settings_partial_update() {
    let app = TestApp::new().await;
    let token = app.token();
    let update = |body| json_request("POST", "/api/admin/exam-settings", Some(&token), body);

    let response = app.request(update(json!({ "examDate": "2025-03-09" }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(update(json!({ "registrationOpen": false }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["settings"]["examDate"], "2025-03-09");
    assert_eq!(body["settings"]["registrationOpen"], false);

    let response = app
        .request(get_request("/api/admin/exam-settings", None))
        .await;
    assert_eq!(body_json(response).await["examDate"], "2025-03-09");
}

#[tokio::test]
async fn test_settings_reject_bad_date() {
    let app = TestApp::new().await;

    let response = app
        .request(json_request(
            "POST",
            "/api/admin/exam-settings",
            Some(&app.token()),
            json!({ "examDate": "9th March" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"],
        "examDate must be a YYYY-MM-DD date"
    );
}

#[tokio::test]
async fn test_settings_update_requires_admin() {
    let app = TestApp::new().await;

    let response = app
        .request(json_request(
            "POST",
            "/api/admin/exam-settings",
            None,
            json!({ "registrationOpen": false }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_clear_database() {
    let app = TestApp::new().await;
    app.seed_student("A", Stream::Pcm, |_| {}).await;
    app.seed_student("B", Stream::Pcb, |_| {}).await;

    let response = app
        .request(json_request(
            "DELETE",
            "/api/admin/clear-database",
            Some(&app.token()),
            json!({}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["deletedCount"], 2);

    let remaining = app.students.list(&StudentFilter::default()).await.unwrap();
    assert!(remaining.is_empty());
    assert_eq!(*app.sheets.rewrites.lock().unwrap(), vec![0]);

    let next = app.seed_student("C", Stream::Pcm, |_| {}).await;
    assert_eq!(next.student_id.to_string(), "STU0001");
}
