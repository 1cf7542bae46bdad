//! Domain entities exchanged with the catalog backend.

pub mod category;
pub mod file;
pub mod option;
pub mod page;
pub mod types;
pub mod user;
pub mod wallpaper;
