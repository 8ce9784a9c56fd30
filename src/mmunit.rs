// The memory management unit. Every CPU memory reference passes through
// here and is routed to the owning subsystem: the cartridge below 8000 and
// in the external RAM window, the LCD controller for VRAM and OAM, the I/O
// page handlers, and the on-board WRAM/HRAM arrays. Echo RAM is not stored
// twice; addresses E000-FDFF simply fold back onto the work RAM.
use super::bios::Bios;
use super::cartridge::{self, Cartridge};
use super::error::Error;
use super::gpu::{Gpu, OamEntry};
use super::intf::Intf;
use super::joypad::Joypad;
use super::memory::Memory;
use super::serial::Serial;
use super::timer::Timer;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

pub struct Mmunit {
    pub cartridge: Box<dyn Cartridge>,
    pub gpu: Gpu,
    pub joypad: Joypad,
    pub serial: Serial,
    pub timer: Timer,
    pub bios: Option<Bios>,
    inte: u8,
    intf: Rc<RefCell<Intf>>,
    hram: [u8; 0x7f],
    wram: [u8; 0x2000],
    // Fallback byte cells for the I/O page. Registers without a handler,
    // the whole audio block included, just hold whatever was written.
    ioreg: [u8; 0x80],
}

impl Mmunit {
    pub fn power_up(path: impl AsRef<Path>, bios: Option<Bios>) -> Result<Self, Error> {
        let cart = cartridge::power_up(path)?;
        Ok(Self::from_cartridge(cart, bios))
    }

    pub fn from_cartridge(cartridge: Box<dyn Cartridge>, bios: Option<Bios>) -> Self {
        let intf = Rc::new(RefCell::new(Intf::power_up()));
        Self {
            cartridge,
            gpu: Gpu::power_up(intf.clone()),
            joypad: Joypad::power_up(intf.clone()),
            serial: Serial::power_up(intf.clone()),
            timer: Timer::power_up(intf.clone()),
            bios,
            inte: 0x00,
            intf,
            hram: [0x00; 0x7f],
            wram: [0x00; 0x2000],
            ioreg: [0x00; 0x80],
        }
    }

    pub fn has_bios(&self) -> bool {
        self.bios.is_some()
    }

    // Advances the peripherals by the elapsed T-cycles of one CPU step.
    pub fn next(&mut self, cycles: u32) {
        self.gpu.next(cycles);
        self.timer.next(cycles);
        self.joypad.next();
    }

    pub fn read_sprite(&self, i: usize) -> OamEntry {
        self.gpu.sprite(i)
    }

    pub fn reset(&mut self) {
        self.gpu.reset();
        self.joypad.reset();
        self.serial.reset();
        self.timer.reset();
        if let Some(b) = self.bios.as_mut() {
            b.reset();
        }
        self.inte = 0x00;
        self.intf.borrow_mut().data = 0x00;
        self.hram = [0x00; 0x7f];
        self.wram = [0x00; 0x2000];
        self.ioreg = [0x00; 0x80];
    }

    // Writing the page number v to FF46 copies v<<8 .. v<<8+A0 into the
    // sprite attribute table in one burst. The source is read back through
    // normal routing, so banked ROM and RAM behave as mapped right now.
    fn run_dma(&mut self, v: u8) {
        let base = u16::from(v) << 8;
        for i in 0..0xa0 {
            let b = self.get(base + i);
            self.set(0xfe00 + i, b);
        }
    }
}

impl Memory for Mmunit {
    fn get(&self, a: u16) -> u8 {
        match a {
            0x0000..=0x00ff => {
                if let Some(b) = &self.bios {
                    if b.is_enabled() {
                        return b.get(a);
                    }
                }
                self.cartridge.get(a)
            }
            0x0100..=0x7fff => self.cartridge.get(a),
            0x8000..=0x9fff => self.gpu.get(a),
            0xa000..=0xbfff => self.cartridge.get(a),
            0xc000..=0xdfff => self.wram[a as usize - 0xc000],
            0xe000..=0xfdff => self.wram[a as usize - 0xe000],
            0xfe00..=0xfe9f => self.gpu.get(a),
            0xfea0..=0xfeff => 0xff,
            0xff00 => self.joypad.get(a),
            0xff01..=0xff02 => self.serial.get(a),
            0xff04..=0xff07 => self.timer.get(a),
            0xff0f => self.intf.borrow().data,
            0xff40..=0xff4b => self.gpu.get(a),
            0xff80..=0xfffe => self.hram[a as usize - 0xff80],
            0xffff => self.inte,
            0xff00..=0xff7f => self.ioreg[a as usize - 0xff00],
        }
    }

    fn set(&mut self, a: u16, v: u8) {
        match a {
            // The BIOS overlay is read only; control writes reach the MBC
            // underneath regardless.
            0x0000..=0x7fff => self.cartridge.set(a, v),
            0x8000..=0x9fff => self.gpu.set(a, v),
            0xa000..=0xbfff => self.cartridge.set(a, v),
            0xc000..=0xdfff => self.wram[a as usize - 0xc000] = v,
            0xe000..=0xfdff => self.wram[a as usize - 0xe000] = v,
            0xfe00..=0xfe9f => self.gpu.set(a, v),
            0xfea0..=0xfeff => {}
            0xff00 => self.joypad.set(a, v),
            0xff01..=0xff02 => self.serial.set(a, v),
            0xff04..=0xff07 => self.timer.set(a, v),
            0xff0f => self.intf.borrow_mut().data = v,
            0xff46 => {
                self.gpu.set(a, v);
                self.run_dma(v);
            }
            0xff40..=0xff4b => self.gpu.set(a, v),
            0xff50 => {
                self.ioreg[0x50] = v;
                if v != 0x00 {
                    if let Some(b) = self.bios.as_mut() {
                        b.disable();
                    }
                }
            }
            0xff80..=0xfffe => self.hram[a as usize - 0xff80] = v,
            0xffff => self.inte = v,
            0xff00..=0xff7f => self.ioreg[a as usize - 0xff00] = v,
        }
    }
}
