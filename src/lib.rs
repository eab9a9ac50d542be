pub mod cache;
pub mod cli;
pub mod comments;
pub mod config;
pub mod export;
pub mod git;
pub mod highlight;
pub mod logging;
pub mod render;
pub mod review;
pub mod tui;
pub mod viewport;
