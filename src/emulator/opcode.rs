/// A raw 16-bit instruction word, with accessors for the
/// fields that CHIP-8 instructions encode in fixed positions.
///
/// ```text
///  15..12  11..8   7..4   3..0
/// +------+------+------+------+
/// | kind |  x   |  y   |  n   |
/// +------+------+------+------+
///         \____ nnn ________/
///                \___ kk ___/
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Combine two bytes, high byte first.
    pub fn from_bytes(high: u8, low: u8) -> Opcode {
        Opcode(((high as u16) << 8) | low as u16)
    }

    /// All four nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 >> 12) & 0xF) as u8,
            ((self.0 >> 8) & 0xF) as u8,
            ((self.0 >> 4) & 0xF) as u8,
            (self.0 & 0xF) as u8,
        )
    }

    pub fn x(self) -> u8 {
        self.nibbles().1
    }

    pub fn y(self) -> u8 {
        self.nibbles().2
    }

    pub fn n(self) -> u8 {
        self.nibbles().3
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }
}
