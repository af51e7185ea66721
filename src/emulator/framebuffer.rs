use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

type Pixels = [[u8; SCREEN_WIDTH]; SCREEN_HEIGHT];
const EMPTY_SCREEN: Pixels = [[0; SCREEN_WIDTH]; SCREEN_HEIGHT];

/// The 64x32 monochrome screen, stored row-major with the origin at the top left.
/// Every pixel is either 0 or 1.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Pixels,
}

impl Framebuffer {
    pub fn new() -> Framebuffer {
        Framebuffer {
            pixels: EMPTY_SCREEN,
        }
    }

    pub fn clear(&mut self) {
        self.pixels = EMPTY_SCREEN;
    }

    /// Read a pixel. Coordinates wrap around the edges of the screen.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }

    /// XOR one 8-pixel sprite row onto the screen, most significant bit leftmost.
    /// Pixels that fall off the right or bottom edge wrap around.
    /// Returns true if any pixel went from set to unset.
    pub fn draw_row(&mut self, x: usize, y: usize, row: u8) -> bool {
        let y = y % SCREEN_HEIGHT;
        let mut collision = false;
        for bit in 0..8 {
            let new_pixel = (row >> (7 - bit)) & 1;
            let old_pixel = &mut self.pixels[y][(x + bit) % SCREEN_WIDTH];
            if *old_pixel == 1 && new_pixel == 1 {
                collision = true;
            }
            *old_pixel ^= new_pixel;
        }
        collision
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8; SCREEN_WIDTH]> {
        self.pixels.iter()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels == EMPTY_SCREEN
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for c in row.iter() {
                write!(f, "{}", if *c == 1 { "#" } else { " " })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Framebuffer")?;
        fmt::Display::fmt(self, f)
    }
}
