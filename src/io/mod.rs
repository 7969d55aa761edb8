pub mod loader;
pub mod program;

pub use loader::LoadError;
pub use program::ProgramDescription;
