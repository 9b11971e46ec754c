pub mod api;
pub mod config;
pub mod errors;
pub mod materialize;
pub mod parser;
pub mod preview;
pub mod prompt;
pub mod source;
pub mod utils;
pub mod vfs;
