/// Shared helpers
pub mod command;

#[cfg(test)]
pub mod testing;
