pub mod config;
pub mod controller;
pub mod drive;
pub mod hold;
pub mod link;
pub mod messages;
pub mod render;
pub mod server;
