mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::{fill_seats, get, json_body, post_json, seed_course, seed_student, test_app};
use instituto_backend::models::{CourseStatus, Level};

fn course_body(code: &str) -> serde_json::Value {
    json!({
        "name": "Rust desde cero",
        "code": code,
        "description": "Introducción al lenguaje",
        "level": "basic",
        "duration_hours": 40,
        "price": 180.0,
        "max_capacity": 12,
        "start_date": "2026-03-01",
        "end_date": "2026-06-30",
        "teacher": "Ana Pérez"
    })
}

#[tokio::test]
async fn course_crud_roundtrip() {
    let (app, _pool) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/courses", course_body("RU-101")))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    let id = created["id"].as_str().expect("course id").to_string();
    assert_eq!(created["status"], "active");

    let response = app
        .clone()
        .oneshot(get(&format!("/courses/{id}")))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);

    let update = post_json_as_put(&format!("/courses/{id}"), json!({ "price": 200.0 }));
    let response = app.clone().oneshot(update).await.expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["price"], 200.0);

    let delete = axum::http::Request::builder()
        .method("DELETE")
        .uri(format!("/courses/{id}"))
        .body(axum::body::Body::empty())
        .expect("request builds");
    let response = app.clone().oneshot(delete).await.expect("request handled");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get(&format!("/courses/{id}")))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn post_json_as_put(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn duplicate_course_code_is_a_conflict() {
    let (app, pool) = test_app().await;
    seed_course(&pool, "Existente", "RU-101", Level::Basic, CourseStatus::Active, 10).await;

    let response = app
        .oneshot(post_json("/courses", course_body("RU-101")))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Este código ya está en uso.");
}

#[tokio::test]
async fn course_dates_must_be_ordered() {
    let (app, _pool) = test_app().await;

    let mut body = course_body("RU-102");
    body["end_date"] = json!("2026-03-01");
    let response = app
        .oneshot(post_json("/courses", body))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(
        body["message"],
        "La fecha de fin debe ser posterior a la fecha de inicio."
    );
}

#[tokio::test]
async fn course_listing_honors_level_and_status_filters() {
    let (app, pool) = test_app().await;
    seed_course(&pool, "Básico", "B-1", Level::Basic, CourseStatus::Active, 10).await;
    seed_course(&pool, "Avanzado", "A-1", Level::Advanced, CourseStatus::Active, 10).await;
    seed_course(&pool, "Cerrado", "C-1", Level::Basic, CourseStatus::Inactive, 10).await;

    let response = app
        .clone()
        .oneshot(get("/courses?level=B&status=A"))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let codes: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .map(|c| c["code"].as_str().expect("code"))
        .collect();
    assert_eq!(codes, vec!["B-1"]);

    let response = app
        .oneshot(get("/courses?level=mystery"))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn student_dni_is_validated_and_unique() {
    let (app, pool) = test_app().await;
    seed_student(&pool, "12345678", "AL-001").await;

    let mut body = json!({
        "dni": "123",
        "student_code": "AL-002",
        "first_names": "Juan",
        "last_names": "Quispe",
        "birth_date": "2001-09-02",
        "gender": "male",
        "email": "juan@example.com",
        "phone": "988776655",
        "address": "Jr. Unión 45",
        "admission_date": "2025-03-01"
    });
    let response = app
        .clone()
        .oneshot(post_json("/students", body.clone()))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    body["dni"] = json!("12345678");
    let response = app
        .oneshot(post_json("/students", body))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let parsed = json_body(response).await;
    assert_eq!(parsed["message"], "Este DNI ya está registrado.");
}

#[tokio::test]
async fn enrollment_happy_path_and_duplicate_rule() {
    let (app, pool) = test_app().await;
    let course = seed_course(&pool, "Rust", "RU-103", Level::Basic, CourseStatus::Active, 10).await;
    let student = seed_student(&pool, "11223344", "AL-010").await;

    let body = json!({
        "student_id": student.id,
        "course_id": course.id,
        "start_date": "2026-03-01"
    });
    let response = app
        .clone()
        .oneshot(post_json("/enrollments", body.clone()))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    assert_eq!(created["status"], "pending");

    let response = app
        .oneshot(post_json("/enrollments", body))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let parsed = json_body(response).await;
    assert_eq!(parsed["message"], "Este alumno ya está matriculado en este curso.");
}

#[tokio::test]
async fn enrollment_respects_course_capacity() {
    let (app, pool) = test_app().await;
    let course = seed_course(&pool, "Chico", "CH-001", Level::Basic, CourseStatus::Active, 1).await;
    fill_seats(&pool, &course.id, 1).await;
    let student = seed_student(&pool, "55667788", "AL-020").await;

    let response = app
        .oneshot(post_json(
            "/enrollments",
            json!({
                "student_id": student.id,
                "course_id": course.id,
                "start_date": "2026-03-01"
            }),
        ))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let parsed = json_body(response).await;
    assert_eq!(parsed["message"], "El curso no tiene cupos disponibles.");
}

#[tokio::test]
async fn enrollment_dates_must_be_ordered() {
    let (app, pool) = test_app().await;
    let course = seed_course(&pool, "Rust", "RU-104", Level::Basic, CourseStatus::Active, 10).await;
    let student = seed_student(&pool, "99887766", "AL-030").await;

    let response = app
        .oneshot(post_json(
            "/enrollments",
            json!({
                "student_id": student.id,
                "course_id": course.id,
                "start_date": "2026-03-01",
                "end_date": "2026-02-01"
            }),
        ))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = json_body(response).await;
    assert_eq!(
        parsed["message"],
        "La fecha de fin debe ser posterior a la fecha de inicio."
    );
}

#[tokio::test]
async fn enrollment_requires_an_active_course() {
    let (app, pool) = test_app().await;
    let course = seed_course(&pool, "Viejo", "VI-001", Level::Basic, CourseStatus::Completed, 10).await;
    let student = seed_student(&pool, "44556677", "AL-040").await;

    let response = app
        .oneshot(post_json(
            "/enrollments",
            json!({
                "student_id": student.id,
                "course_id": course.id,
                "start_date": "2026-03-01"
            }),
        ))
        .await
        .expect("request handled");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = json_body(response).await;
    assert_eq!(parsed["message"], "El curso no está activo.");
}
