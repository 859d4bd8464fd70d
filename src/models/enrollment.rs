use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[sqlx(rename = "P")]
    Pending,
    #[sqlx(rename = "A")]
    Active,
    #[sqlx(rename = "C")]
    Completed,
    #[sqlx(rename = "R")]
    Withdrawn,
    #[sqlx(rename = "X")]
    Cancelled,
}

impl EnrollmentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "p" | "pendiente" | "pending" => Some(Self::Pending),
            "a" | "activa" | "active" => Some(Self::Active),
            "c" | "completada" | "completed" => Some(Self::Completed),
            "r" | "retirada" | "withdrawn" => Some(Self::Withdrawn),
            "x" | "cancelada" | "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Pending and active enrollments take up a seat.
    pub fn holds_seat(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrolled_on: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: EnrollmentStatus,
    pub grade: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEnrollmentRequest {
    pub student_id: String,
    pub course_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: Option<EnrollmentStatus>,
    pub grade: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEnrollmentRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<EnrollmentStatus>,
    pub grade: Option<f64>,
    pub notes: Option<String>,
}
