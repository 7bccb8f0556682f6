//! Process wiring for the CLI subcommands.

pub mod context;
pub mod scheduler;

pub use context::ServiceContext;
pub use scheduler::spawn_all;
