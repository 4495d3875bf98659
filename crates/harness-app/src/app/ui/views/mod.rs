pub mod error_view;
pub mod loading_view;
pub mod screen_view;
