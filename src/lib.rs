pub mod console;
pub mod core;
pub mod error;
pub mod logger;
pub mod state;
