pub mod index;
pub mod modals;
pub mod sse;
pub mod student_form;
pub mod students;
