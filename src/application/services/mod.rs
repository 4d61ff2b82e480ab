//! Application services - Message handling orchestration

pub mod message_service;

pub use message_service::MessageService;
