pub mod chat_event;
pub mod contact;
pub mod currency;
pub mod message;
pub mod session;
pub mod settings;
