pub mod cd;
pub mod exit;
pub mod status;

use crate::shell::commands::Executable;
use std::collections::HashMap;

pub type BuiltinTable = HashMap<&'static str, Box<dyn Executable>>;

/// Helper to register all built-in commands at once
pub fn register_all_builtins() -> BuiltinTable {
    let mut table: BuiltinTable = HashMap::new();
    table.insert("cd", Box::new(cd::CdCommand));
    table.insert("exit", Box::new(exit::ExitCommand));
    table.insert("status", Box::new(status::StatusCommand));
    table
}
