mod push_transport;
mod subscription_store;

pub use push_transport::*;
pub use subscription_store::*;
