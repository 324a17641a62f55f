// Include the binary's modules directly so integration tests can reach them
#[path = "commands.rs"]
pub mod commands;
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{handle_harvest, handle_mutate, normalize_seed_url, print_banner};
