#![warn(clippy::all, rust_2018_idioms)]

mod headless;
mod testcard;

use anyhow::Context;
use clap::Parser;
use eframe::NativeOptions;
use harness_app::app::ViewerApp;
use harness_app::app::ui::clickwheel::WHEEL_OUTER_RADIUS;
use harness_app::loader::ResourceLoader;
use harness_app::{Harness, Phase, Wiring};
use harness_core::prelude::*;
use headless::HeadlessSurface;
use log::info;
use std::path::PathBuf;
use testcard::TestCardFactory;

#[derive(Parser, Debug)]
#[command(name = "emu-harness", version, about = "Drives an emulated machine on a worker thread")]
struct Args {
    /// JSON config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bootloader image (plain or gzip)
    #[arg(long)]
    bootloader: Option<String>,

    /// Disk image (plain or gzip)
    #[arg(long)]
    disk: Option<String>,

    /// Cycles run per drive request (1..=1048576)
    #[arg(long)]
    cycles_per_tick: Option<CycleQuantum>,

    /// Run without a window, refreshing on a timer
    #[arg(long)]
    headless: bool,

    /// Stop after painting this many frames (headless only)
    #[arg(long, requires = "headless")]
    frames: Option<u64>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(HarnessConfig, bool, Option<u64>)> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => HarnessConfig::default(),
        };
        if let Some(bootloader) = self.bootloader {
            config.resources.bootloader = bootloader;
        }
        if let Some(disk) = self.disk {
            config.resources.disk = disk;
        }
        if let Some(quantum) = self.cycles_per_tick {
            config.cycles_per_tick = quantum;
        }
        config.validate().context("invalid configuration")?;
        Ok((config, self.headless, self.frames))
    }
}

fn run_headless(config: &HarnessConfig, frames: Option<u64>) -> anyhow::Result<()> {
    let (done_tx, done_rx) = crossbeam_channel::unbounded();
    let factory = TestCardFactory::new(config.display.width, config.display.height);
    let wiring = Wiring {
        surface: HeadlessSurface::new(frames, done_tx),
        loader: ResourceLoader::from_fs(config.resources.clone()),
        translator: InputTranslator::new(),
        ticks: crossbeam_channel::tick(config.refresh_interval()),
    };
    let harness = Harness::launch(factory, config.cycles_per_tick, wiring)?;

    let outcome = done_rx.recv().unwrap_or(Phase::Running);
    let phase = harness.shutdown();
    info!("[headless] finished ({phase})");

    match outcome {
        Phase::Failed(failure) => anyhow::bail!("{failure}"),
        _ => Ok(()),
    }
}

fn run_windowed(config: HarnessConfig) -> anyhow::Result<()> {
    let scale = config.display.scale;
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([
                config.display.width as f32 * scale,
                // room for the tuning bar and the click wheel below the screen
                config.display.height as f32 * scale + 2.0 * WHEEL_OUTER_RADIUS + 64.0,
            ])
            .with_title("Emu Harness"),
        ..Default::default()
    };

    eframe::run_native(
        "Emu Harness",
        options,
        Box::new(move |cc| {
            let factory = TestCardFactory::new(config.display.width, config.display.height);
            let app = ViewerApp::start(&cc.egui_ctx, &config, factory)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, headless, frames) = Args::parse().into_config()?;
    info!(
        "bootloader {}, disk {}, {} cycles per tick",
        config.resources.bootloader, config.resources.disk, config.cycles_per_tick
    );

    if headless {
        run_headless(&config, frames)
    } else {
        run_windowed(config)
    }
}
