mod push;

pub use push::PushServiceImpl;
