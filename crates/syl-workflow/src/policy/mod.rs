//! File authorization policies.
//!
//! Both policies are pure functions of the acting user, their roles, and
//! the parent version's status and owner. A file carries no permission
//! state of its own.

mod access;
mod mutation;

pub use access::can_view_file;
pub use mutation::can_edit_file;
