pub mod health;
pub mod problems;
