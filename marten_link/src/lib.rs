pub mod auth;
pub mod engine;
pub mod link;
pub mod messages;
pub mod server_info;
pub mod update;
