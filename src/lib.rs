//! nextup: dump unstructured text in, get a structured, scheduled task out,
//! and always know what to do next.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
pub mod store;
pub mod util;
