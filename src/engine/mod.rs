pub mod engine;
pub mod protocol;
pub mod controller;

pub mod chat_parser;
pub mod sequencer;
pub mod prompt_builder;
pub mod llm_client;
pub mod host;
pub mod storage;
pub mod error;
