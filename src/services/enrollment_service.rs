use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Enrollment, EnrollmentStatus, NewEnrollmentRequest, UpdateEnrollmentRequest};

/// Enrollment registration with the record-keeping rules: no duplicate
/// student/course pair, seats must remain, dates must be ordered, grades stay
/// on the 0-20 scale.
pub struct EnrollmentService {
    db: SqlitePool,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn enroll(&self, req: NewEnrollmentRequest) -> Result<Enrollment, AppError> {
        let student = repository::find_student_by_id(&self.db, &req.student_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("El alumno no existe.".to_string()))?;
        if !student.is_active() {
            return Err(AppError::BadRequest("El alumno no está activo.".to_string()));
        }

        let course = repository::find_course_by_id(&self.db, &req.course_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("El curso no existe.".to_string()))?;
        if !course.is_active() {
            return Err(AppError::BadRequest("El curso no está activo.".to_string()));
        }

        if repository::enrollment_pair_exists(&self.db, &req.student_id, &req.course_id).await? {
            return Err(AppError::Conflict(
                "Este alumno ya está matriculado en este curso.".to_string(),
            ));
        }

        validate_dates(req.start_date, req.end_date)?;
        validate_grade(req.grade)?;

        let status = req.status.unwrap_or(EnrollmentStatus::Pending);
        if status.holds_seat() {
            let enrolled = repository::enrolled_count(&self.db, &req.course_id).await?;
            if course.max_capacity - enrolled <= 0 {
                return Err(AppError::Conflict(
                    "El curso no tiene cupos disponibles.".to_string(),
                ));
            }
        }

        let enrollment = repository::insert_enrollment(&self.db, req).await?;
        info!(
            enrollment_id = %enrollment.id,
            student = %student.full_name(),
            course = %course.code,
            "enrollment registered"
        );
        Ok(enrollment)
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateEnrollmentRequest,
    ) -> Result<Enrollment, AppError> {
        let current = repository::find_enrollment_by_id(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let start_date = req.start_date.unwrap_or(current.start_date);
        let end_date = req.end_date.or(current.end_date);
        validate_dates(start_date, end_date)?;
        validate_grade(req.grade.or(current.grade))?;

        repository::update_enrollment(&self.db, id, req)
            .await?
            .ok_or(AppError::NotFound)
    }
}

fn validate_dates(
    start_date: chrono::NaiveDate,
    end_date: Option<chrono::NaiveDate>,
) -> Result<(), AppError> {
    if let Some(end_date) = end_date {
        if end_date <= start_date {
            return Err(AppError::BadRequest(
                "La fecha de fin debe ser posterior a la fecha de inicio.".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_grade(grade: Option<f64>) -> Result<(), AppError> {
    if let Some(grade) = grade {
        if !(0.0..=20.0).contains(&grade) {
            return Err(AppError::BadRequest(
                "La calificación debe estar entre 0 y 20.".to_string(),
            ));
        }
    }
    Ok(())
}
