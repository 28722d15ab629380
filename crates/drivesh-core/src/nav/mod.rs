//! Navigation logic for drivesh.
//!
//! This module contains lexical [`path`] handling, the
//! [`stack::WorkingDirectoryStack`] describing the current location, the
//! [`resolver::PathResolver`] that turns shell paths into remote items, and
//! tab [`complete`]ion.

pub mod complete;
pub mod path;
pub mod resolver;
pub mod stack;

pub use path::ParsedPath;
pub use resolver::{Lookup, Outcome, PathResolver, Resolution, Target};
pub use stack::{StackEntry, WorkingDirectoryStack};
