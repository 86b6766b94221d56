//! Isolated execution of third-party tool binaries.
//!
//! - [`session`] - Disposable sandbox directories and scrubbed environments
//! - [`executor`] - The [`IsolatedExecutor`] that runs commands inside them

pub mod executor;
pub mod session;

pub use executor::IsolatedExecutor;
pub use session::{sandbox_env, SandboxSession, SANDBOX_PREFIX};
