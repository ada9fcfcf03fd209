pub mod hooks;
mod machine;

pub use machine::{Error, Machine, DEFAULT_BUDGET};
