use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{
    Course, CourseStatus, CourseSummary, Enrollment, EnrollmentStatus, Level, NewCourseRequest,
    NewEnrollmentRequest, NewStudentRequest, Student, StudentStatus, UpdateCourseRequest,
    UpdateEnrollmentRequest, UpdateStudentRequest,
};

const COURSE_COLUMNS: &str = "id, name, code, description, level, duration_hours, price, \
     max_capacity, start_date, end_date, status, teacher, created_at, updated_at";

const STUDENT_COLUMNS: &str = "id, dni, student_code, first_names, last_names, birth_date, \
     gender, email, phone, address, admission_date, status, notes, created_at, updated_at";

const ENROLLMENT_COLUMNS: &str = "id, student_id, course_id, enrolled_on, start_date, end_date, \
     status, grade, notes, created_at, updated_at";

pub async fn fetch_courses(
    db: &SqlitePool,
    level: Option<Level>,
    status: Option<CourseStatus>,
) -> Result<Vec<Course>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE 1 = 1"
    ));
    if let Some(level) = level {
        query.push(" AND level = ").push_bind(level);
    }
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY created_at DESC");

    query.build_query_as::<Course>().fetch_all(db).await
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn course_code_taken(
    db: &SqlitePool,
    code: &str,
    exclude_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM courses WHERE code = ? AND id != ?")
            .bind(code)
            .bind(exclude_id.unwrap_or(""))
            .fetch_optional(db)
            .await?;
    Ok(existing.is_some())
}

pub async fn insert_course(
    db: &SqlitePool,
    req: NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let course = Course {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        code: req.code,
        description: req.description,
        level: req.level,
        duration_hours: req.duration_hours,
        price: req.price,
        max_capacity: req.max_capacity,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status.unwrap_or(CourseStatus::Active),
        teacher: req.teacher,
        created_at: Utc::now().to_rfc3339(),
        updated_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(&format!(
        "INSERT INTO courses ({COURSE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&course.id)
    .bind(&course.name)
    .bind(&course.code)
    .bind(&course.description)
    .bind(course.level)
    .bind(course.duration_hours)
    .bind(course.price)
    .bind(course.max_capacity)
    .bind(course.start_date)
    .bind(course.end_date)
    .bind(course.status)
    .bind(&course.teacher)
    .bind(&course.created_at)
    .bind(&course.updated_at)
    .execute(db)
    .await?;

    Ok(course)
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(code) = req.code {
        current.code = code;
    }
    if let Some(description) = req.description {
        current.description = description;
    }
    if let Some(level) = req.level {
        current.level = level;
    }
    if let Some(duration_hours) = req.duration_hours {
        current.duration_hours = duration_hours;
    }
    if let Some(price) = req.price {
        current.price = price;
    }
    if let Some(max_capacity) = req.max_capacity {
        current.max_capacity = max_capacity;
    }
    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = end_date;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if let Some(teacher) = req.teacher {
        current.teacher = teacher;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE courses SET name = ?, code = ?, description = ?, level = ?, duration_hours = ?, \
         price = ?, max_capacity = ?, start_date = ?, end_date = ?, status = ?, teacher = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&current.name)
    .bind(&current.code)
    .bind(&current.description)
    .bind(current.level)
    .bind(current.duration_hours)
    .bind(current.price)
    .bind(current.max_capacity)
    .bind(current.start_date)
    .bind(current.end_date)
    .bind(current.status)
    .bind(&current.teacher)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Snapshot of every course with its enrollment count, for the chat responder.
pub async fn fetch_catalog(db: &SqlitePool) -> Result<Vec<CourseSummary>, sqlx::Error> {
    sqlx::query_as::<_, CourseSummary>(
        "SELECT c.id, c.name, c.code, c.description, c.level, c.duration_hours, c.price, \
         c.max_capacity, c.start_date, c.status, c.teacher, COUNT(e.id) AS enrolled \
         FROM courses c \
         LEFT JOIN enrollments e ON e.course_id = c.id \
         GROUP BY c.id \
         ORDER BY c.created_at DESC",
    )
    .fetch_all(db)
    .await
}

pub async fn enrolled_count(db: &SqlitePool, course_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(id) FROM enrollments WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(db)
            .await?;
    Ok(count)
}

pub async fn fetch_students(
    db: &SqlitePool,
    status: Option<StudentStatus>,
) -> Result<Vec<Student>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE 1 = 1"
    ));
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY last_names, first_names");

    query.build_query_as::<Student>().fetch_all(db).await
}

pub async fn find_student_by_id(db: &SqlitePool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn student_dni_taken(
    db: &SqlitePool,
    dni: &str,
    exclude_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM students WHERE dni = ? AND id != ?")
            .bind(dni)
            .bind(exclude_id.unwrap_or(""))
            .fetch_optional(db)
            .await?;
    Ok(existing.is_some())
}

pub async fn student_code_taken(
    db: &SqlitePool,
    student_code: &str,
    exclude_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM students WHERE student_code = ? AND id != ?")
            .bind(student_code)
            .bind(exclude_id.unwrap_or(""))
            .fetch_optional(db)
            .await?;
    Ok(existing.is_some())
}

pub async fn insert_student(
    db: &SqlitePool,
    req: NewStudentRequest,
) -> Result<Student, sqlx::Error> {
    let student = Student {
        id: Uuid::new_v4().to_string(),
        dni: req.dni,
        student_code: req.student_code,
        first_names: req.first_names,
        last_names: req.last_names,
        birth_date: req.birth_date,
        gender: req.gender,
        email: req.email,
        phone: req.phone,
        address: req.address,
        admission_date: req.admission_date,
        status: req.status.unwrap_or(StudentStatus::Active),
        notes: req.notes,
        created_at: Utc::now().to_rfc3339(),
        updated_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(&format!(
        "INSERT INTO students ({STUDENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&student.id)
    .bind(&student.dni)
    .bind(&student.student_code)
    .bind(&student.first_names)
    .bind(&student.last_names)
    .bind(student.birth_date)
    .bind(student.gender)
    .bind(&student.email)
    .bind(&student.phone)
    .bind(&student.address)
    .bind(student.admission_date)
    .bind(student.status)
    .bind(&student.notes)
    .bind(&student.created_at)
    .bind(&student.updated_at)
    .execute(db)
    .await?;

    Ok(student)
}

pub async fn update_student(
    db: &SqlitePool,
    id: &str,
    req: UpdateStudentRequest,
) -> Result<Option<Student>, sqlx::Error> {
    let mut current = match find_student_by_id(db, id).await? {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(dni) = req.dni {
        current.dni = dni;
    }
    if let Some(student_code) = req.student_code {
        current.student_code = student_code;
    }
    if let Some(first_names) = req.first_names {
        current.first_names = first_names;
    }
    if let Some(last_names) = req.last_names {
        current.last_names = last_names;
    }
    if let Some(birth_date) = req.birth_date {
        current.birth_date = birth_date;
    }
    if let Some(gender) = req.gender {
        current.gender = gender;
    }
    if let Some(email) = req.email {
        current.email = email;
    }
    if let Some(phone) = req.phone {
        current.phone = phone;
    }
    if let Some(address) = req.address {
        current.address = address;
    }
    if let Some(admission_date) = req.admission_date {
        current.admission_date = admission_date;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if req.notes.is_some() {
        current.notes = req.notes;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE students SET dni = ?, student_code = ?, first_names = ?, last_names = ?, \
         birth_date = ?, gender = ?, email = ?, phone = ?, address = ?, admission_date = ?, \
         status = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&current.dni)
    .bind(&current.student_code)
    .bind(&current.first_names)
    .bind(&current.last_names)
    .bind(current.birth_date)
    .bind(current.gender)
    .bind(&current.email)
    .bind(&current.phone)
    .bind(&current.address)
    .bind(current.admission_date)
    .bind(current.status)
    .bind(&current.notes)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_student(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_enrollments(
    db: &SqlitePool,
    student_id: Option<&str>,
    course_id: Option<&str>,
    status: Option<EnrollmentStatus>,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE 1 = 1"
    ));
    if let Some(student_id) = student_id {
        query.push(" AND student_id = ").push_bind(student_id.to_string());
    }
    if let Some(course_id) = course_id {
        query.push(" AND course_id = ").push_bind(course_id.to_string());
    }
    if let Some(status) = status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY enrolled_on DESC");

    query.build_query_as::<Enrollment>().fetch_all(db).await
}

pub async fn find_enrollment_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn enrollment_pair_exists(
    db: &SqlitePool,
    student_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM enrollments WHERE student_id = ? AND course_id = ?")
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(db)
            .await?;
    Ok(existing.is_some())
}

pub async fn insert_enrollment(
    db: &SqlitePool,
    req: NewEnrollmentRequest,
) -> Result<Enrollment, sqlx::Error> {
    let enrollment = Enrollment {
        id: Uuid::new_v4().to_string(),
        student_id: req.student_id,
        course_id: req.course_id,
        enrolled_on: Utc::now().date_naive(),
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status.unwrap_or(EnrollmentStatus::Pending),
        grade: req.grade,
        notes: req.notes,
        created_at: Utc::now().to_rfc3339(),
        updated_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(&format!(
        "INSERT INTO enrollments ({ENROLLMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&enrollment.id)
    .bind(&enrollment.student_id)
    .bind(&enrollment.course_id)
    .bind(enrollment.enrolled_on)
    .bind(enrollment.start_date)
    .bind(enrollment.end_date)
    .bind(enrollment.status)
    .bind(enrollment.grade)
    .bind(&enrollment.notes)
    .bind(&enrollment.created_at)
    .bind(&enrollment.updated_at)
    .execute(db)
    .await?;

    Ok(enrollment)
}

pub async fn update_enrollment(
    db: &SqlitePool,
    id: &str,
    req: UpdateEnrollmentRequest,
) -> Result<Option<Enrollment>, sqlx::Error> {
    let mut current = match find_enrollment_by_id(db, id).await? {
        Some(e) => e,
        None => return Ok(None),
    };

    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if req.end_date.is_some() {
        current.end_date = req.end_date;
    }
    if let Some(status) = req.status {
        current.status = status;
    }
    if req.grade.is_some() {
        current.grade = req.grade;
    }
    if req.notes.is_some() {
        current.notes = req.notes;
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "UPDATE enrollments SET start_date = ?, end_date = ?, status = ?, grade = ?, notes = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(current.start_date)
    .bind(current.end_date)
    .bind(current.status)
    .bind(current.grade)
    .bind(&current.notes)
    .bind(&current.updated_at)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_enrollment(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
