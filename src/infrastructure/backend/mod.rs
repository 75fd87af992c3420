mod memory_repository;
mod rest_repository;

// Re-export the factory functions for easy access
pub use memory_repository::create_memory_repository;
pub use rest_repository::create_rest_repository;
