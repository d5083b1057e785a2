pub mod reminder;
pub mod resolver;
pub mod session;
pub mod sweep;
pub mod task_ops;
