pub mod logging;
pub mod models;
pub mod shutdown;
pub mod version;

pub use models::HostStatus;
