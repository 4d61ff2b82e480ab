//! Domain entities - Core objects with no external dependencies

pub mod message;
pub mod response;

pub use message::Message;
pub use response::Response;
