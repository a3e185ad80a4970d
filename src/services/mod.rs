pub mod ai_service;
pub mod problem_service;
