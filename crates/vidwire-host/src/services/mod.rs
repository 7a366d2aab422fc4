//! Built-in API backends.

pub mod memory_player;

pub use memory_player::MemoryPlayer;
