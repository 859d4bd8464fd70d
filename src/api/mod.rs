use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::{ChatService, EnrollmentService};
use crate::state::AppState;

pub const PROMPT_REPLY: &str = "Por favor, escribe tu pregunta.";
pub const MALFORMED_REPLY: &str = "Error al procesar tu mensaje.";
pub const INTERNAL_ERROR_REPLY: &str = "Hubo un error procesando tu solicitud.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    reply: String,
}

#[derive(Debug, Deserialize)]
struct CourseListParams {
    level: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudentListParams {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentListParams {
    student_id: Option<String>,
    course_id: Option<String>,
    status: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route(
            "/enrollments/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(delete_enrollment),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// The chat boundary never surfaces a raw fault: a body that is not JSON gets
/// the fixed 400 reply, anything unexpected the fixed 500 reply.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatReply>) {
    let Ok(Json(req)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatReply {
                reply: MALFORMED_REPLY.to_string(),
            }),
        );
    };

    let message = req.message.trim().to_lowercase();
    if message.is_empty() {
        return (
            StatusCode::OK,
            Json(ChatReply {
                reply: PROMPT_REPLY.to_string(),
            }),
        );
    }

    match ChatService::new(state.db.clone()).reply(&message).await {
        Ok(reply) => (StatusCode::OK, Json(ChatReply { reply })),
        Err(err) => {
            error!("chat reply failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatReply {
                    reply: INTERNAL_ERROR_REPLY.to_string(),
                }),
            )
        }
    }
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> Result<Json<Vec<Course>>, AppError> {
    let level = parse_filter(params.level.as_deref(), Level::parse, "Nivel desconocido")?;
    let status = parse_filter(params.status.as_deref(), CourseStatus::parse, "Estado desconocido")?;
    let courses = repository::fetch_courses(&state.db, level, status).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<Json<Course>, AppError> {
    validate_course_fields(
        req.duration_hours,
        req.price,
        req.max_capacity,
        req.start_date,
        req.end_date,
    )?;
    if repository::course_code_taken(&state.db, &req.code, None).await? {
        return Err(AppError::Conflict("Este código ya está en uso.".to_string()));
    }
    let course = repository::insert_course(&state.db, req).await?;
    Ok(Json(course))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = repository::find_course_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let current = repository::find_course_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    validate_course_fields(
        req.duration_hours.unwrap_or(current.duration_hours),
        req.price.unwrap_or(current.price),
        req.max_capacity.unwrap_or(current.max_capacity),
        req.start_date.unwrap_or(current.start_date),
        req.end_date.unwrap_or(current.end_date),
    )?;
    if let Some(code) = req.code.as_deref() {
        if repository::course_code_taken(&state.db, code, Some(&id)).await? {
            return Err(AppError::Conflict("Este código ya está en uso.".to_string()));
        }
    }
    let course = repository::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_course(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentListParams>,
) -> Result<Json<Vec<Student>>, AppError> {
    let status = parse_filter(params.status.as_deref(), StudentStatus::parse, "Estado desconocido")?;
    let students = repository::fetch_students(&state.db, status).await?;
    Ok(Json(students))
}

async fn create_student(
    State(state): State<AppState>,
    Json(req): Json<NewStudentRequest>,
) -> Result<Json<Student>, AppError> {
    validate_student_fields(&req.dni, req.birth_date)?;
    if repository::student_dni_taken(&state.db, &req.dni, None).await? {
        return Err(AppError::Conflict("Este DNI ya está registrado.".to_string()));
    }
    if repository::student_code_taken(&state.db, &req.student_code, None).await? {
        return Err(AppError::Conflict(
            "Este código de alumno ya está en uso.".to_string(),
        ));
    }
    let student = repository::insert_student(&state.db, req).await?;
    Ok(Json(student))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    let student = repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    let current = repository::find_student_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    validate_student_fields(
        req.dni.as_deref().unwrap_or(&current.dni),
        req.birth_date.unwrap_or(current.birth_date),
    )?;
    if let Some(dni) = req.dni.as_deref() {
        if repository::student_dni_taken(&state.db, dni, Some(&id)).await? {
            return Err(AppError::Conflict("Este DNI ya está registrado.".to_string()));
        }
    }
    if let Some(student_code) = req.student_code.as_deref() {
        if repository::student_code_taken(&state.db, student_code, Some(&id)).await? {
            return Err(AppError::Conflict(
                "Este código de alumno ya está en uso.".to_string(),
            ));
        }
    }
    let student = repository::update_student(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(student))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_student(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_enrollments(
    State(state): State<AppState>,
    Query(params): Query<EnrollmentListParams>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let status = parse_filter(
        params.status.as_deref(),
        EnrollmentStatus::parse,
        "Estado desconocido",
    )?;
    let enrollments = repository::fetch_enrollments(
        &state.db,
        params.student_id.as_deref(),
        params.course_id.as_deref(),
        status,
    )
    .await?;
    Ok(Json(enrollments))
}

async fn create_enrollment(
    State(state): State<AppState>,
    Json(req): Json<NewEnrollmentRequest>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::new(state.db.clone()).enroll(req).await?;
    Ok(Json(enrollment))
}

async fn get_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = repository::find_enrollment_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(enrollment))
}

async fn update_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateEnrollmentRequest>,
) -> Result<Json<Enrollment>, AppError> {
    let enrollment = EnrollmentService::new(state.db.clone()).update(&id, req).await?;
    Ok(Json(enrollment))
}

async fn delete_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if repository::delete_enrollment(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

fn parse_filter<T>(
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    message: &str,
) -> Result<Option<T>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("{message}: {raw}"))),
    }
}

fn validate_course_fields(
    duration_hours: i64,
    price: f64,
    max_capacity: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), AppError> {
    if duration_hours <= 0 {
        return Err(AppError::BadRequest(
            "La duración debe ser mayor a 0.".to_string(),
        ));
    }
    if price < 0.0 {
        return Err(AppError::BadRequest(
            "El precio no puede ser negativo.".to_string(),
        ));
    }
    if max_capacity <= 0 {
        return Err(AppError::BadRequest(
            "El cupo máximo debe ser mayor a 0.".to_string(),
        ));
    }
    if end_date <= start_date {
        return Err(AppError::BadRequest(
            "La fecha de fin debe ser posterior a la fecha de inicio.".to_string(),
        ));
    }
    Ok(())
}

fn validate_student_fields(dni: &str, birth_date: NaiveDate) -> Result<(), AppError> {
    if dni.len() != 8 || !dni.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "El DNI debe tener exactamente 8 dígitos.".to_string(),
        ));
    }
    let today = Utc::now().date_naive();
    if birth_date > today {
        return Err(AppError::BadRequest(
            "La fecha de nacimiento no es válida.".to_string(),
        ));
    }
    match today.years_since(birth_date) {
        Some(years) if years >= 5 => Ok(()),
        _ => Err(AppError::BadRequest(
            "El alumno debe tener al menos 5 años.".to_string(),
        )),
    }
}
