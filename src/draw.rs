//! Software drawing into an RGBA frame buffer.

use crate::game::GameSimulator;
use crate::grid::{Direction, Pos};

pub type Rgba = (u8, u8, u8, u8);

const BACKGROUND: Rgba = (20, 20, 30, 255);
const CHECKER: Rgba = (25, 25, 35, 255);
const FOOD: Rgba = (220, 50, 50, 255);
const HEAD: Rgba = (100, 255, 100, 255);
const CRASH: Rgba = (255, 120, 40, 255);

/// A mutable view over a `width * height * 4` byte frame.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(frame.len(), (width * height * 4) as usize);
        Self { frame, width, height }
    }

    pub fn clear(&mut self, (r, g, b, a): Rgba) {
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, a]);
        }
    }

    pub fn blend_pixel(&mut self, x: u32, y: u32, (r, g, b, a): Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let ar = a as u16;
        let iar = (255 - a) as u16;
        for (c, src) in [r, g, b].into_iter().enumerate() {
            let dst = self.frame[idx + c] as u16;
            self.frame[idx + c] = ((src as u16 * ar + dst * iar) / 255) as u8;
        }
        self.frame[idx + 3] = 255;
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, col: Rgba) {
        let x2 = (x + w).min(self.width);
        let y2 = (y + h).min(self.height);
        for py in y..y2 {
            for px in x..x2 {
                self.blend_pixel(px, py, col);
            }
        }
    }

    pub fn text(&mut self, text: &str, x: u32, y: u32, scale: u32, col: Rgba) {
        let mut cx = x;
        for ch in text.chars() {
            if let Some(rows) = glyph_5x7(ch) {
                for (ry, row) in rows.iter().enumerate() {
                    for rx in 0..5u32 {
                        if (row >> (4 - rx)) & 1 == 1 {
                            self.fill_rect(cx + rx * scale, y + ry as u32 * scale, scale, scale, col);
                        }
                    }
                }
            }
            cx += 6 * scale;
        }
    }
}

/// Draws a game onto a canvas at `cell` pixels per grid square.
pub struct BoardPainter {
    pub cell: u32,
}

impl BoardPainter {
    pub fn new(cell: u32) -> Self {
        Self { cell }
    }

    fn fill_cell(&self, canvas: &mut Canvas<'_>, p: Pos, col: Rgba) {
        if p.x < 0 || p.y < 0 {
            return;
        }
        canvas.fill_rect(p.x as u32 * self.cell, p.y as u32 * self.cell, self.cell, self.cell, col);
    }

    pub fn paint<S>(&self, canvas: &mut Canvas<'_>, game: &GameSimulator<S>) {
        canvas.clear(BACKGROUND);
        let board = game.board();
        for y in 0..board.height {
            for x in 0..board.width {
                if (x + y) % 2 == 0 {
                    self.fill_cell(canvas, Pos::new(x, y), CHECKER);
                }
            }
        }

        self.fill_cell(canvas, game.food(), FOOD);

        // Tail-first storage: brightest segments are nearest the head.
        let len = game.body().len();
        for (i, &p) in game.body().iter().enumerate() {
            if i + 1 == len {
                self.fill_cell(canvas, p, HEAD);
                self.eyes(canvas, p, game.direction());
            } else {
                let from_head = len - 1 - i;
                let brightness = 200 - (from_head * 10).min(100) as u8;
                self.fill_cell(canvas, p, (50, brightness, 50, 255));
            }
        }

        if let Some(p) = game.crash_site() {
            self.fill_cell(canvas, p, CRASH);
        }
    }

    fn eyes(&self, canvas: &mut Canvas<'_>, p: Pos, dir: Direction) {
        let c = self.cell;
        let (bx, by) = (p.x as u32 * c, p.y as u32 * c);
        let (near, far) = (c / 4, c - c / 4 - 1);
        let [(x1, y1), (x2, y2)] = match dir {
            Direction::Right => [(far, near), (far, far)],
            Direction::Left => [(near, near), (near, far)],
            Direction::Up => [(near, near), (far, near)],
            Direction::Down => [(near, far), (far, far)],
        };
        let black = (0, 0, 0, 255);
        canvas.fill_rect(bx + x1, by + y1, 2, 2, black);
        canvas.fill_rect(bx + x2, by + y2, 2, 2, black);
    }
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    Some(match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ' ' => [0; 7],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Manual;
    use crate::grid::Board;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
    }

    #[test]
    fn blend_clips_and_mixes() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.clear((0, 0, 0, 255));
        canvas.blend_pixel(1, 1, (255, 255, 255, 255));
        canvas.blend_pixel(2, 2, (200, 100, 0, 0));
        canvas.blend_pixel(9, 9, (255, 0, 0, 255));
        assert_eq!(pixel(&frame, 4, 1, 1), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 4, 2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn board_colors_land_in_cells() {
        let game = GameSimulator::with_state(
            Board::new(6, 3),
            [Pos::new(0, 1), Pos::new(1, 1), Pos::new(2, 1)],
            Direction::Right,
            Pos::new(5, 2),
            Manual::default(),
        )
        .unwrap();
        let cell = 8;
        let (w, h) = (6 * cell, 3 * cell);
        let mut frame = vec![0u8; (w * h * 4) as usize];
        BoardPainter::new(cell).paint(&mut Canvas::new(&mut frame, w, h), &game);

        let food = pixel(&frame, w, 5 * cell + 1, 2 * cell + 1);
        assert_eq!(food, [FOOD.0, FOOD.1, FOOD.2, 255]);
        let head = pixel(&frame, w, 2 * cell, cell + cell - 1);
        assert_eq!(head, [HEAD.0, HEAD.1, HEAD.2, 255]);
    }
}
