pub mod config;
pub mod error;
pub mod indicator;
pub mod kernel;
pub mod monitor;
pub mod outputs;
pub mod services;
pub mod supervisor;

// Re-export the host-facing lifecycle for convenient access
pub use supervisor::{Supervisor, SupervisorConfig, SupervisorHandle};
