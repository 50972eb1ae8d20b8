mod dispatcher;
mod error;
pub mod ports;
mod relay;
pub mod services;

pub use dispatcher::*;
pub use error::*;
pub use relay::*;
