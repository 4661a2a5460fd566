pub mod args;
pub mod dispatch;
pub mod output;

pub use args::{Cli, Command, GlobalOptions};
pub use dispatch::{dispatch, run};
