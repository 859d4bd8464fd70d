use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use instituto_backend::api::router;
use instituto_backend::db::repository;
use instituto_backend::models::{
    Course, CourseStatus, Gender, Level, NewCourseRequest, NewStudentRequest, Student,
};
use instituto_backend::state::AppState;

pub async fn test_app() -> (Router, SqlitePool) {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply");
    (router(AppState { db: pool.clone() }), pool)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub async fn seed_course(
    pool: &SqlitePool,
    name: &str,
    code: &str,
    level: Level,
    status: CourseStatus,
    max_capacity: i64,
) -> Course {
    repository::insert_course(
        pool,
        NewCourseRequest {
            name: name.to_string(),
            code: code.to_string(),
            description: String::new(),
            level,
            duration_hours: 40,
            price: 150.0,
            max_capacity,
            start_date: date(2026, 3, 1),
            end_date: date(2026, 6, 30),
            status: Some(status),
            teacher: "Ana Pérez".to_string(),
        },
    )
    .await
    .expect("course inserted")
}

pub async fn seed_student(pool: &SqlitePool, dni: &str, student_code: &str) -> Student {
    repository::insert_student(
        pool,
        NewStudentRequest {
            dni: dni.to_string(),
            student_code: student_code.to_string(),
            first_names: "María".to_string(),
            last_names: "García".to_string(),
            birth_date: date(2000, 5, 14),
            gender: Gender::Female,
            email: "maria@example.com".to_string(),
            phone: "999111222".to_string(),
            address: "Av. Siempre Viva 123".to_string(),
            admission_date: date(2025, 3, 1),
            status: None,
            notes: None,
        },
    )
    .await
    .expect("student inserted")
}

/// Fills `seats` seats of a course with freshly created students, bypassing
/// the enrollment rules.
pub async fn fill_seats(pool: &SqlitePool, course_id: &str, seats: usize) {
    for i in 0..seats {
        let student = seed_student(
            pool,
            &format!("{:08}", 40_000_000 + i),
            &format!("SEAT-{course_id}-{i}"),
        )
        .await;
        sqlx::query(
            "INSERT INTO enrollments (id, student_id, course_id, enrolled_on, start_date, \
             end_date, status, grade, notes, created_at, updated_at) \
             VALUES (?, ?, ?, '2026-02-01', '2026-03-01', NULL, 'A', NULL, NULL, '', '')",
        )
        .bind(format!("enr-{course_id}-{i}"))
        .bind(&student.id)
        .bind(course_id)
        .execute(pool)
        .await
        .expect("seat filled");
    }
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    serde_json::from_slice(&bytes).expect("body is json")
}

pub async fn chat_reply(app: &Router, message: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(post_json("/chat", serde_json::json!({ "message": message })))
        .await
        .expect("request handled");
    let status = response.status();
    let body = json_body(response).await;
    let reply = body["reply"].as_str().expect("reply field").to_string();
    (status, reply)
}
