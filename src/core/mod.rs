pub mod body;
pub mod config;
pub mod error;
pub mod prelude;
pub mod viewport;
pub mod world;
