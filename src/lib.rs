pub mod artifacts;
pub mod assets;
pub mod browser;
pub mod config;
pub mod error;
pub mod flow;
pub mod identity;
pub mod otp;
pub mod outcome;
pub mod process;

pub use error::{Result, SignupError};
pub use flow::{RunReport, SignupFlow};
