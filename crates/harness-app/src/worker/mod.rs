pub mod host;
pub mod link;
pub mod session;

pub use host::WorkerHost;
pub use link::{LinkError, WorkerLink};
pub use session::Session;
