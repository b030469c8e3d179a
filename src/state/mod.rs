/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Preview edit parameters (edit.rs)
/// - The composition session (composition.rs)
/// - The gallery and its sort filters (gallery.rs)
/// - The full-screen viewer (viewer.rs)

pub mod composition;
pub mod data;
pub mod edit;
pub mod gallery;
pub mod viewer;
