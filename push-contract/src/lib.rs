mod encoding;
mod payload;
mod subscription;
mod vapid;

pub use payload::*;
pub use subscription::*;
pub use vapid::*;
