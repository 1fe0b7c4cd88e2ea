//! A small Unix shell: a recursive pipeline executor plus the thin
//! parsing, builtin and dispatch layers around it.

pub mod builtin;
pub mod dispatch;
pub mod exec;
pub mod parser;
pub mod types;
