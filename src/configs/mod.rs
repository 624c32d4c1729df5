pub mod base;
pub mod logging;
pub mod providers;
pub mod server;

pub use base::*;
pub use logging::*;
pub use providers::*;
pub use server::*;
