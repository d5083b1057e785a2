pub mod client;
pub mod task;

pub use client::*;
pub use task::*;
