pub mod auth;
pub mod dashboard;
pub mod departments;
pub mod faculty;
pub mod faculty_profile;
pub mod health;
pub mod marksheets;
pub mod pending_registrations;
pub mod semesters;
pub mod student_dashboard;
pub mod students;
pub mod subjects;
pub mod users;
