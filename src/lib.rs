pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::database::store::Storage;
use crate::services::{
    access_service::AccessService, answer_service::AnswerService,
    attempt_service::AttemptService, navigation_service::NavigationService,
    pause_service::PauseService, session_service::SessionService, test_service::TestService,
};

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub test_service: TestService,
    pub access_service: AccessService,
    pub attempt_service: AttemptService,
    pub session_service: SessionService,
    pub navigation_service: NavigationService,
    pub pause_service: PauseService,
    pub answer_service: AnswerService,
}

impl AppState {
    pub fn new(storage: Storage, config: &Config) -> Self {
        Self::from_parts(storage, config.max_pauses, config.gate_premium_tests)
    }

    pub fn from_parts(storage: Storage, max_pauses: i32, gate_premium_tests: bool) -> Self {
        Self {
            test_service: TestService::new(storage.clone()),
            access_service: AccessService::new(storage.clone(), gate_premium_tests),
            attempt_service: AttemptService::new(storage.clone()),
            session_service: SessionService::new(storage.clone()),
            navigation_service: NavigationService::new(storage.clone()),
            pause_service: PauseService::new(storage.clone(), max_pauses),
            answer_service: AnswerService::new(storage.clone()),
            storage,
        }
    }
}
