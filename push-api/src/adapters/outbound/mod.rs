pub mod memory;
#[cfg(test)]
pub mod mock;
pub mod postgres;
pub mod web_push;
