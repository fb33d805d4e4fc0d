pub mod client;
pub mod models;

pub use client::{message_or, ConsoleClient};
