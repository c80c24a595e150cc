//! Data models for Bookshelf

pub mod admin_code;
pub mod book;
pub mod borrow;
pub mod user;

// Re-export commonly used types
pub use admin_code::AdminCode;
pub use book::{Book, BookQuery};
pub use borrow::{Borrow, BorrowStatus};
pub use user::{Profile, Role, User, UserClaims};
