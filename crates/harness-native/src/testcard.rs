//! Built-in machine that draws an animated test card.
//!
//! Stands in for a real core so the harness can run on its own. The pattern
//! reacts to every control: arrows move a marker, scrolling shifts the bars,
//! `Action` inverts the marker and `Hold` freezes the animation.

use harness_core::prelude::*;
use log::info;
use std::cell::RefCell;
use std::rc::Rc;

const BARS: [u32; 8] = [
    0xC0C0C0, 0xC0C000, 0x00C0C0, 0x00C000, 0xC000C0, 0xC00000, 0x0000C0, 0x101010,
];
const CYCLES_PER_STEP: u64 = 4096;
const MARKER: usize = 6;

#[derive(Debug, Default)]
struct Pad {
    held: [bool; Control::ALL.len()],
    scroll: i64,
}

impl Pad {
    fn is_held(&self, control: Control) -> bool {
        self.held[control as usize]
    }
}

pub struct TestCardFactory {
    width: usize,
    height: usize,
}

impl TestCardFactory {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl MachineFactory for TestCardFactory {
    type Machine = TestCard;
    type Controls = TestCardControls;

    fn load(&mut self) -> Result<(), MachineError> {
        info!("[testcard] {}x{} test card core", self.width, self.height);
        Ok(())
    }

    fn construct(
        &mut self,
        bootloader: Vec<u8>,
        disk: Vec<u8>,
    ) -> Result<(TestCard, TestCardControls), MachineError> {
        if bootloader.is_empty() {
            return Err(MachineError::Construct("bootloader is empty".into()));
        }
        if disk.is_empty() {
            return Err(MachineError::Construct("disk image is empty".into()));
        }

        let blank = Frame::blank(self.width, self.height)
            .map_err(|err| MachineError::Construct(err.to_string()))?;

        // different disks give differently shifted cards
        let seed = disk
            .iter()
            .chain(bootloader.iter())
            .fold(0u64, |acc, &b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));

        let pad = Rc::new(RefCell::new(Pad::default()));
        let machine = TestCard {
            width: self.width,
            height: self.height,
            pad: pad.clone(),
            cycles: 0,
            phase: seed % self.width as u64,
            marker: (self.width / 2, self.height / 2),
            blank,
        };
        Ok((machine, TestCardControls { pad }))
    }
}

pub struct TestCard {
    width: usize,
    height: usize,
    pad: Rc<RefCell<Pad>>,
    cycles: u64,
    phase: u64,
    marker: (usize, usize),
    blank: Frame,
}

impl TestCard {
    fn step(&mut self) {
        let pad = self.pad.borrow();
        let (x, y) = &mut self.marker;
        if pad.is_held(Control::Left) {
            *x = x.saturating_sub(1);
        }
        if pad.is_held(Control::Right) {
            *x = (*x + 1).min(self.width.saturating_sub(MARKER));
        }
        if pad.is_held(Control::Up) {
            *y = y.saturating_sub(1);
        }
        if pad.is_held(Control::Down) {
            *y = (*y + 1).min(self.height.saturating_sub(MARKER));
        }
        self.phase = self.phase.wrapping_add(1);
    }
}

impl Machine for TestCard {
    fn get_frame(&mut self) -> Frame {
        let pad = self.pad.borrow();
        let bar_width = (self.width / BARS.len()).max(1);
        let shift = self.phase as i64 + pad.scroll;
        let invert = pad.is_held(Control::Action);

        let mut words = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let column = (x as i64 + shift).rem_euclid(self.width as i64) as usize;
                let mut color = BARS[(column / bar_width) % BARS.len()];
                let (mx, my) = self.marker;
                if (mx..mx + MARKER).contains(&x) && (my..my + MARKER).contains(&y) {
                    color = if invert { 0x000000 } else { 0xFFFFFF };
                }
                words.push(color);
            }
        }

        Frame::from_rgb_words(self.width, self.height, &words)
            .unwrap_or_else(|_| self.blank.clone())
    }

    fn run(&mut self, cycles: usize) -> Result<(), MachineError> {
        if self.pad.borrow().is_held(Control::Hold) {
            return Ok(());
        }
        let before = self.cycles / CYCLES_PER_STEP;
        self.cycles += cycles as u64;
        for _ in before..self.cycles / CYCLES_PER_STEP {
            self.step();
        }
        Ok(())
    }
}

pub struct TestCardControls {
    pad: Rc<RefCell<Pad>>,
}

impl Controls for TestCardControls {
    fn on_keydown(&mut self, control: Control) {
        self.pad.borrow_mut().held[control as usize] = true;
    }

    fn on_keyup(&mut self, control: Control) {
        self.pad.borrow_mut().held[control as usize] = false;
    }

    fn on_scroll(&mut self, _dx: f32, dy: f32) {
        self.pad.borrow_mut().scroll += dy as i64;
    }
}
