// Ties the CPU and the bus together and paces them in lockstep: one
// instruction, then the same number of T-cycles for every peripheral. Frame
// timing (59.73 Hz) is the host's business; the board itself never sleeps.
use super::bios::Bios;
use super::cartridge::Cartridge;
use super::cpu::Cpu;
use super::error::Error;
use super::gpu::{SCREEN_H, SCREEN_W};
use super::joypad::JoypadKey;
use super::mmunit::Mmunit;
use std::path::Path;

// One frame is 154 scanlines of 456 dots.
pub const FRAME_CYCLES: u32 = 70224;

pub struct MotherBoard {
    pub mmu: Mmunit,
    pub cpu: Cpu,
}

impl MotherBoard {
    pub fn power_up(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mmu = Mmunit::power_up(path, None)?;
        Ok(Self { cpu: Cpu::power_up(false), mmu })
    }

    pub fn power_up_with_bios(path: impl AsRef<Path>, bios: impl AsRef<Path>) -> Result<Self, Error> {
        let mmu = Mmunit::power_up(path, Some(Bios::power_up(bios)?))?;
        Ok(Self { cpu: Cpu::power_up(true), mmu })
    }

    // Embedding hosts that keep ROM images in memory build the cartridge
    // themselves and hand it over here.
    pub fn from_cartridge(cartridge: Box<dyn Cartridge>, bios: Option<Bios>) -> Self {
        let with_bios = bios.is_some();
        Self { cpu: Cpu::power_up(with_bios), mmu: Mmunit::from_cartridge(cartridge, bios) }
    }

    // Executes one instruction (or interrupt dispatch, or idle cycle) and
    // advances the peripherals by its cost. Returns the elapsed T-cycles.
    pub fn do_cycle(&mut self) -> Result<u32, Error> {
        let cycles = self.cpu.next(&mut self.mmu)? * 4;
        self.mmu.next(cycles);
        Ok(cycles)
    }

    // Runs one frame worth of machine time.
    pub fn do_frame(&mut self) -> Result<(), Error> {
        let mut frame_cycles = 0;
        while frame_cycles < FRAME_CYCLES {
            frame_cycles += self.do_cycle()?;
        }
        Ok(())
    }

    // True once per frame, when the controller has entered V-Blank and the
    // frame buffer holds a finished picture.
    pub fn check_and_reset_gpu_updated(&mut self) -> bool {
        let result = self.mmu.gpu.updated;
        self.mmu.gpu.updated = false;
        result
    }

    pub fn get_frame(&self) -> &[[u32; SCREEN_W]; SCREEN_H] {
        &self.mmu.gpu.data
    }

    pub fn keydown(&mut self, key: JoypadKey) {
        self.mmu.joypad.keydown(key);
    }

    pub fn keyup(&mut self, key: JoypadKey) {
        self.mmu.joypad.keyup(key);
    }

    // Battery persistence: flushes cartridge RAM to the save file when it
    // has been written since the last flush.
    pub fn flush_sav(&mut self) {
        if self.mmu.cartridge.is_ram_dirty() {
            self.mmu.cartridge.sav();
        }
    }

    pub fn romname(&self) -> String {
        self.mmu.cartridge.title()
    }

    pub fn reset(&mut self) {
        self.mmu.reset();
        self.cpu.reset(self.mmu.has_bios());
    }
}

#[cfg(test)]
mod tests {
    use super::{MotherBoard, FRAME_CYCLES};
    use crate::cartridge;
    use crate::cartridge::tests::build_rom;
    use crate::error::Error;
    use crate::gpu::SHADES;
    use crate::memory::Memory;

    // A NOP-filled board: execution walks an endless run of NOPs from the
    // entry point on.
    fn board(rom: Vec<u8>) -> MotherBoard {
        MotherBoard::from_cartridge(cartridge::from_rom(rom, None).unwrap(), None)
    }

    #[test]
    fn vblank_cadence_over_one_frame() {
        let mut mb = board(build_rom("TESTROM", 0x00, 0x00, 0x00));
        mb.mmu.set(0xff40, 0x91);
        mb.mmu.set(0xff47, 0xe4);

        let ly = mb.mmu.get(0xff44);
        let mut cycles = 0;
        let mut vblanks = 0;
        while cycles < FRAME_CYCLES {
            cycles += mb.do_cycle().unwrap();
            if mb.check_and_reset_gpu_updated() {
                vblanks += 1;
            }
        }
        assert_eq!(cycles, FRAME_CYCLES);
        assert_eq!(mb.mmu.get(0xff44), ly);
        assert_eq!(vblanks, 1);
        let frame = mb.get_frame();
        assert!(frame.iter().all(|line| line.iter().all(|&p| p == SHADES[0])));
    }

    #[test]
    fn timer_overflow_vectors_to_0x50() {
        let mut mb = board(build_rom("TESTROM", 0x00, 0x00, 0x00));
        mb.mmu.set(0xffff, 0x04);
        mb.mmu.set(0xff06, 0xab);
        mb.mmu.set(0xff05, 0xfe);
        mb.mmu.set(0xff07, 0x05);

        let mut steps = 0;
        while mb.cpu.reg.pc != 0x0050 {
            mb.do_cycle().unwrap();
            steps += 1;
            assert!(steps < 100, "timer interrupt never arrived");
        }
        // Eight NOPs ran before the dispatch pushed their end address.
        assert_eq!(mb.mmu.get_word(mb.cpu.reg.sp), 0x0108);
        assert_eq!(mb.mmu.get(0xff0f) & 0x04, 0x00);
        // TIMA reloaded from TMA at overflow, then kept counting: the
        // 20-cycle dispatch itself covers one more 16-cycle period.
        assert_eq!(mb.mmu.get(0xff05), 0xac);
    }

    #[test]
    fn illegal_opcode_surfaces_through_do_cycle() {
        let mut rom = build_rom("TESTROM", 0x00, 0x00, 0x00);
        rom[0x0100] = 0xd3;
        let mut mb = board(rom);
        match mb.do_cycle() {
            Err(Error::IllegalOpcode { opcode, pc, trace }) => {
                assert_eq!(opcode, 0xd3);
                assert_eq!(pc, 0x0100);
                assert_eq!(trace.last(), Some(&0x0100));
            }
            other => panic!("expected a fault, got {:?}", other),
        }
    }

    #[test]
    fn reset_returns_to_power_on_state() {
        let mut mb = board(build_rom("TESTROM", 0x00, 0x00, 0x00));
        mb.mmu.set(0xff40, 0x91);
        mb.do_frame().unwrap();
        mb.mmu.set(0xc000, 0x55);
        mb.reset();
        assert_eq!(mb.cpu.reg.pc, 0x0100);
        assert_eq!(mb.mmu.get(0xc000), 0x00);
        assert_eq!(mb.mmu.get(0xff40), 0x00);
        assert_eq!(mb.mmu.get(0xff44), 0x00);
    }
}
