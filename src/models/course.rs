use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Course difficulty tier, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[sqlx(rename = "B")]
    Basic,
    #[sqlx(rename = "I")]
    Intermediate,
    #[sqlx(rename = "A")]
    Advanced,
}

impl Level {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "b" | "basico" | "básico" | "basic" => Some(Self::Basic),
            "i" | "intermedio" | "intermediate" => Some(Self::Intermediate),
            "a" | "avanzado" | "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Básico",
            Self::Intermediate => "Intermedio",
            Self::Advanced => "Avanzado",
        }
    }

    /// First letter of the display label, used in compact listings.
    pub fn letter(self) -> char {
        match self {
            Self::Basic => 'B',
            Self::Intermediate => 'I',
            Self::Advanced => 'A',
        }
    }
}

/// Course lifecycle stage, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[sqlx(rename = "A")]
    Active,
    #[sqlx(rename = "I")]
    Inactive,
    #[sqlx(rename = "C")]
    Completed,
}

impl CourseStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "a" | "activo" | "active" => Some(Self::Active),
            "i" | "inactivo" | "inactive" => Some(Self::Inactive),
            "c" | "completado" | "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub level: Level,
    pub duration_hours: i64,
    pub price: f64,
    pub max_capacity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CourseStatus,
    pub teacher: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Course {
    pub fn is_active(&self) -> bool {
        self.status == CourseStatus::Active
    }
}

/// Catalog row consumed by the chat responder: a course plus its current
/// enrollment count.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseSummary {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub level: Level,
    pub duration_hours: i64,
    pub price: f64,
    pub max_capacity: i64,
    pub start_date: NaiveDate,
    pub status: CourseStatus,
    pub teacher: String,
    pub enrolled: i64,
}

impl CourseSummary {
    pub fn open_seats(&self) -> i64 {
        self.max_capacity - self.enrolled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub level: Level,
    pub duration_hours: i64,
    pub price: f64,
    pub max_capacity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<CourseStatus>,
    pub teacher: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub level: Option<Level>,
    pub duration_hours: Option<i64>,
    pub price: Option<f64>,
    pub max_capacity: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<CourseStatus>,
    pub teacher: Option<String>,
}
