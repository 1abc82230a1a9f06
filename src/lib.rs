pub mod api;
pub mod config;
pub mod document;
pub mod editor;
pub mod listing;
pub mod logger;
pub mod moderation;
pub mod mutation;
pub mod notify;
pub mod preview;
pub mod session;
pub mod text_utils;
mod test_data;
