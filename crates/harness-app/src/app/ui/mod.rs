use crate::app::action::Action;
use crate::shared::frame_slot::FrameSlotHandle;
use eframe::epaint::TextureHandle;

pub mod app_input;
pub mod clickwheel;
pub mod error;
pub mod views;

/// Borrowed app state handed to each view
pub struct UiCtx<'a> {
    pub slot: &'a FrameSlotHandle,
    pub texture: &'a mut Option<TextureHandle>,
    pub actions: &'a mut Vec<Action>,
}
