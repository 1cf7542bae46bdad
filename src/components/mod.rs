//! Headless UI state machines driven by the route handlers.

pub mod category_picker;
pub mod list_controller;
pub mod searchable_select;
pub mod upload_queue;
