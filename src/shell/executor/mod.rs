pub mod dispatcher;
pub mod job_manager;
pub mod pipeline;

pub use dispatcher::{Dispatcher, Status};
