pub mod history;
pub mod problem;
pub mod session;
pub mod submission;
