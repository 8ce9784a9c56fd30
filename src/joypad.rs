// The eight buttons are arranged as a 2x4 matrix. A program selects a row by
// writing to JOYP, then reads the column states from bits 0-3. Bit value 0
// means pressed/selected throughout.
//
// FF00 - P1/JOYP - Joypad (R/W)
//
// Bit 7 - Not used (reads 1)
// Bit 6 - Not used (reads 1)
// Bit 5 - P15 Select action row      (0=Select: A, B, Select, Start)
// Bit 4 - P14 Select direction row   (0=Select: Right, Left, Up, Down)
// Bit 3-0 - Selected row state       (0=Pressed) (Read Only)
use super::intf::{Flag, Intf};
use super::memory::Memory;
use std::cell::RefCell;
use std::rc::Rc;

// Bit positions in the internal key bitmap: the action buttons occupy the
// low nibble, the directions the high nibble.
#[rustfmt::skip]
#[derive(Clone, Copy)]
pub enum JoypadKey {
    A      = 0b0000_0001,
    B      = 0b0000_0010,
    Select = 0b0000_0100,
    Start  = 0b0000_1000,
    Right  = 0b0001_0000,
    Left   = 0b0010_0000,
    Up     = 0b0100_0000,
    Down   = 0b1000_0000,
}

pub struct Joypad {
    intf: Rc<RefCell<Intf>>,
    // 1 = released.
    matrix: u8,
    // Bits 4-5 of the last JOYP write.
    select: u8,
    // Low nibble as last observed, for edge detection.
    column: u8,
}

impl Joypad {
    pub fn power_up(intf: Rc<RefCell<Intf>>) -> Self {
        Self { intf, matrix: 0xff, select: 0x30, column: 0x0f }
    }

    pub fn keydown(&mut self, key: JoypadKey) {
        self.matrix &= !(key as u8);
    }

    pub fn keyup(&mut self, key: JoypadKey) {
        self.matrix |= key as u8;
    }

    // The joypad interrupt fires on a high-to-low transition of any selected
    // column line, which is what wakes a stopped CPU.
    pub fn next(&mut self) {
        let column = self.read_column();
        if self.column & !column & 0x0f != 0x00 {
            self.intf.borrow_mut().hi(Flag::Joypad);
        }
        self.column = column;
    }

    fn read_column(&self) -> u8 {
        let mut n = 0x0f;
        if self.select & 0x20 == 0x00 {
            n &= self.matrix & 0x0f;
        }
        if self.select & 0x10 == 0x00 {
            n &= self.matrix >> 4;
        }
        n
    }

    pub fn reset(&mut self) {
        self.matrix = 0xff;
        self.select = 0x30;
        self.column = 0x0f;
    }
}

impl Memory for Joypad {
    fn get(&self, a: u16) -> u8 {
        debug_assert_eq!(a, 0xff00);
        0xc0 | self.select | self.read_column()
    }

    fn set(&mut self, a: u16, v: u8) {
        debug_assert_eq!(a, 0xff00);
        // Bits 0-3 are read only.
        self.select = v & 0x30;
    }
}

#[cfg(test)]
mod tests {
    use super::{Joypad, JoypadKey};
    use crate::intf::{Flag, Intf};
    use crate::memory::Memory;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn joypad() -> (Joypad, Rc<RefCell<Intf>>) {
        let intf = Rc::new(RefCell::new(Intf::power_up()));
        (Joypad::power_up(intf.clone()), intf)
    }

    #[test]
    fn idle_rows_read_released() {
        let (mut joypad, _) = joypad();
        joypad.set(0xff00, 0xdf);
        assert_eq!(joypad.get(0xff00), 0xdf);
        joypad.set(0xff00, 0xef);
        assert_eq!(joypad.get(0xff00), 0xef);
    }

    #[test]
    fn action_row_exposes_a_press_and_raises_input() {
        let (mut joypad, intf) = joypad();
        // Bit 5 low selects the action row.
        joypad.set(0xff00, 0xdf);
        joypad.next();
        assert!(!intf.borrow().is_pending(Flag::Joypad));

        joypad.keydown(JoypadKey::A);
        joypad.next();
        assert_eq!(joypad.get(0xff00), 0xde);
        assert!(intf.borrow().is_pending(Flag::Joypad));
    }

    #[test]
    fn unselected_row_raises_nothing() {
        let (mut joypad, intf) = joypad();
        // Bit 4 low selects the direction row; A sits in the action row.
        joypad.set(0xff00, 0xef);
        joypad.next();
        joypad.keydown(JoypadKey::A);
        joypad.next();
        assert_eq!(joypad.get(0xff00), 0xef);
        assert!(!intf.borrow().is_pending(Flag::Joypad));
    }

    #[test]
    fn release_produces_no_edge() {
        let (mut joypad, intf) = joypad();
        joypad.set(0xff00, 0xdf);
        joypad.keydown(JoypadKey::B);
        joypad.next();
        intf.borrow_mut().data = 0x00;
        joypad.keyup(JoypadKey::B);
        joypad.next();
        assert!(!intf.borrow().is_pending(Flag::Joypad));
    }
}
