pub mod conversation;
pub mod core;
pub mod history;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector_math;

pub use crate::core::errors::ApiError;
pub use pipeline::{Pipeline, SessionHandle, SessionManager};
