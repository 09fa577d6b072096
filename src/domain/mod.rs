//! Domain logic and core data structures
//!
//! Pure geometry and folder logic, independent of Win32 APIs.

pub mod core;
pub mod entries;
pub mod grid;
