pub mod directory;
pub mod dispatch;
pub mod file;
pub mod init;
pub mod public;
pub mod schema;
pub mod syllabus;
