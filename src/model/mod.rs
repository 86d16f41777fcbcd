pub mod config;
pub mod note;
pub mod project;
pub mod task;

pub use config::*;
pub use note::*;
pub use project::*;
pub use task::*;
