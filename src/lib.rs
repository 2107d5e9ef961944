pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    participation_service::ParticipationService, report_service::ReportService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub participation_service: ParticipationService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let participation_service = ParticipationService::new(pool.clone());
        let report_service = ReportService::new(pool.clone());

        Self {
            pool,
            participation_service,
            report_service,
        }
    }
}
