use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[sqlx(rename = "M")]
    Male,
    #[sqlx(rename = "F")]
    Female,
    #[sqlx(rename = "O")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[sqlx(rename = "A")]
    Active,
    #[sqlx(rename = "I")]
    Inactive,
    #[sqlx(rename = "E")]
    Graduated,
    #[sqlx(rename = "R")]
    Withdrawn,
}

impl StudentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "a" | "activo" | "active" => Some(Self::Active),
            "i" | "inactivo" | "inactive" => Some(Self::Inactive),
            "e" | "egresado" | "graduated" => Some(Self::Graduated),
            "r" | "retirado" | "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: String,
    pub dni: String,
    pub student_code: String,
    pub first_names: String,
    pub last_names: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub admission_date: NaiveDate,
    pub status: StudentStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_names, self.first_names)
    }

    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudentRequest {
    pub dni: String,
    pub student_code: String,
    pub first_names: String,
    pub last_names: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub admission_date: NaiveDate,
    pub status: Option<StudentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub dni: Option<String>,
    pub student_code: Option<String>,
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub admission_date: Option<NaiveDate>,
    pub status: Option<StudentStatus>,
    pub notes: Option<String>,
}
