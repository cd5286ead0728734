//! UI components built with Leptos.
//!
//! - [`navigation`] - Stack navigation (main entry point)
//! - [`Sidebar`] - Section list

pub mod navigation;
mod sidebar;

pub use navigation::Navigation;
pub use sidebar::Sidebar;
