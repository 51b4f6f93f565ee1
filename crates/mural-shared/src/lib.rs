pub mod clock;
pub mod constants;
pub mod error;
pub mod files;
pub mod models;
pub mod paths;
pub mod timestamp;
pub mod types;
