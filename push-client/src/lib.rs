//! Page and service-worker side of the push demo.
//!
//! Browser APIs are reached through the traits in [`registration`], [`install`],
//! [`storage`] and [`service_worker`]; a host binds them to the real
//! platform, tests bind them to recorders.

pub mod controller;
mod error;
pub mod install;
pub mod registration;
pub mod relay;
pub mod service_worker;
pub mod storage;

pub use controller::PushController;
pub use error::ClientError;
pub use install::InstallPromptController;
