//! Output formatting for consensus results and agent status

pub mod console;
pub mod formatter;
