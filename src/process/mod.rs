//! Chrome executable discovery, command line and debugging port allocation.

pub mod discovery;
pub mod launcher;
pub mod port;

pub use discovery::find_chrome;
pub use launcher::*;
pub use port::allocate_cdp_port;
