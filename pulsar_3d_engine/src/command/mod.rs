/// Command module - the replayable unit of GPU command-buffer work and
/// the ordered per-frame command list

// Module declarations
pub mod command;
pub mod catalog;
pub mod command_list;

// Re-export the command surface
pub use command::*;
pub use catalog::*;
pub use command_list::*;
