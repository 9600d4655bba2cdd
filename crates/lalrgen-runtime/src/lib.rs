//! Table-driven LR parser driver for tables emitted by `lalrgen`.

pub mod definition;
pub mod parser;
