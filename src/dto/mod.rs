pub mod problem_dto;
