pub mod config;
pub mod mode;
pub mod note;
