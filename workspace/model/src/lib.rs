pub mod entities;
pub mod subject_codes;

pub use subject_codes::SubjectCodes;
