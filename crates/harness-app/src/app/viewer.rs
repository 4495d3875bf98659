use crate::app::SlotSurface;
use crate::app::action::Action;
use crate::app::ui::clickwheel::clickwheel_rotary;
use crate::app::ui::error::ErrorInfo;
use crate::app::ui::views::{error_view, loading_view};
use crate::app::ui::views::screen_view::ScreenView;
use crate::app::ui::{UiCtx, app_input};
use crate::harness::{Harness, Wiring};
use crate::loader::ResourceLoader;
use crate::orchestrator::{ForegroundEvent, Phase};
use crate::shared::frame_slot::{FrameSlot, FrameSlotHandle};
use eframe::epaint::TextureHandle;
use harness_core::prelude::*;
use log::info;

/// Windowed front end: paints frames, forwards input and refresh opportunities
pub struct ViewerApp {
    harness: Option<Harness>,
    slot: FrameSlotHandle,
    texture: Option<TextureHandle>,

    // UI
    screen: ScreenView,
    error: Option<ErrorInfo>,
}

impl ViewerApp {
    pub fn start<F: MachineFactory>(
        egui_ctx: &egui::Context,
        config: &HarnessConfig,
        factory: F,
    ) -> anyhow::Result<Self> {
        let slot = FrameSlot::handle();
        let wiring = Wiring {
            surface: SlotSurface::new(slot.clone(), egui_ctx.clone()),
            loader: ResourceLoader::from_fs(config.resources.clone()),
            translator: InputTranslator::new().with_rotary(clickwheel_rotary()),
            ticks: crossbeam_channel::never(),
        };
        let harness = Harness::launch(factory, config.cycles_per_tick, wiring)?;

        Ok(Self {
            harness: Some(harness),
            slot,
            texture: None,
            screen: ScreenView::new(config.cycles_per_tick),
            error: None,
        })
    }

    pub(crate) fn send(&self, event: ForegroundEvent) {
        if let Some(harness) = &self.harness {
            harness.send(event);
        }
    }
}

impl eframe::App for ViewerApp {
    /// Serves as the main UI loop
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions: Vec<Action> = Vec::new();
        let phase = self.slot.phase();

        match &phase {
            Phase::Running => {
                actions.extend(app_input::collect_input(ctx).into_iter().map(Action::Input));
                let mut ui_ctx = UiCtx {
                    slot: &self.slot,
                    texture: &mut self.texture,
                    actions: &mut actions,
                };
                self.screen.ui(ctx, &mut ui_ctx);
            }
            Phase::Failed(failure) => {
                let info = self
                    .error
                    .get_or_insert_with(|| ErrorInfo::from_failure(failure));
                error_view::ui(ctx, info, &mut actions);
            }
            phase => loading_view::ui(ctx, phase),
        }

        self.apply_actions(ctx, actions);

        // every redraw is a refresh opportunity for the render loop
        if phase == Phase::Running {
            self.send(ForegroundEvent::Refresh);
        }
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        if let Some(harness) = self.harness.take() {
            let phase = harness.shutdown();
            info!("[viewer] closed ({phase})");
        }
    }
}
