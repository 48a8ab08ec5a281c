//! Developer shell for driving a controller on simulated hardware

mod cli;
#[cfg(test)]
mod tests;

pub use cli::{Args, Cli, CommandParseError, FocusCommand, ShellCommand};
