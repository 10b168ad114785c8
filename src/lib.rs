pub use tacktrack_cli::cli;
pub use tacktrack_cli::commands;
pub use tacktrack_cli::config;
pub use tacktrack_cli::{build_store, run, run_blocking};
pub use tacktrack_cli::AppConfig;

pub use tacktrack_core as core;
pub use tacktrack_core::calendar;
pub use tacktrack_core::capture;
pub use tacktrack_core::gateway;
pub use tacktrack_core::model;
pub use tacktrack_core::parser;
pub use tacktrack_core::views;
pub use tacktrack_core::{TaskError, TaskStore};
