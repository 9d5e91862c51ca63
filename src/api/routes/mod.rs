//! API Routes
//!
//! Route handlers organized by functionality.

pub mod backups;
pub mod fuel;
pub mod health;
pub mod journals;
pub mod profile;
pub mod state;
pub mod timeline;
pub mod transfer;
