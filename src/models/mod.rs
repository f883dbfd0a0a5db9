pub mod chat;
pub mod volunteer;
pub mod websocket;
