pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::models::stage::{advance, Operation, SessionEvent, Stage};
pub use crate::services::quiz_flow_service::QuizFlowService;
pub use crate::services::session_service::SessionService;
