mod directory;
mod file;
mod public;
mod syllabus;

pub use directory::{ProgramCommands, SubjectCommands, UserCommands};
pub use file::FileCommands;
pub use public::PublicCommands;
pub use syllabus::SyllabusCommands;
