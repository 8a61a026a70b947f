pub mod client;
pub mod feed;
pub mod likes;
pub mod memory;
mod record;
pub mod store;

#[cfg(test)]
mod testing;
