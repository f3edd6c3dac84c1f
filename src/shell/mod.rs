mod error;
mod executor;
mod parser;
mod readline;
#[allow(clippy::module_inception)]
mod shell;
mod signals;
mod tools;

pub use shell::Shell;
