//! CLI command implementations

mod run;
mod session;

pub use run::run_command;
pub use session::{
    advance_command, create_command, fetch_command, join_command, leave_command,
};
