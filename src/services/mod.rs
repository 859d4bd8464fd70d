pub mod chat_service;
pub mod enrollment_service;

pub use chat_service::ChatService;
pub use enrollment_service::EnrollmentService;
