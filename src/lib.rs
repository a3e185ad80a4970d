pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod flow;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{ai_service::AIService, problem_service::ProblemService};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ai_service: AIService,
    pub problem_service: ProblemService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::new();

        let ai_service = AIService::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            http_client,
        );
        let problem_service = ProblemService::new(pool.clone());

        Self {
            pool,
            ai_service,
            problem_service,
        }
    }
}
