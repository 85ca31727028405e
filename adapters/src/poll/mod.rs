pub mod client;
pub mod errors;
pub mod poller;

pub use client::{HttpVersionClient, VersionSource};
pub use errors::PollError;
pub use poller::run_version_poller;
