pub mod action;
pub mod surface;
pub mod ui;
pub mod viewer;

pub use surface::SlotSurface;
pub use viewer::ViewerApp;
