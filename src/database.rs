pub mod connection;
pub mod dto;
pub mod repository;

pub use connection::{close_connection, establish_connection, establish_in_memory};
