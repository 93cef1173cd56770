//! Rendering for the digits puzzle.
//!
//! Renderers only read a `GridView` snapshot; nothing here feeds back into
//! rewards or termination.
//!
//! - `ansi` draws the grid as text
//! - `rasterize` draws an RGB frame
//! - `RenderContext` presents text frames to a terminal at a fixed rate

use crate::digits::Position;
use kidspuzzles::Result;
use ndarray::Array3;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

/// Frames per second for human rendering
pub const RENDER_FPS: u32 = 4;

/// RGB colors used by `rasterize`
pub mod color {
    pub type Rgb = [u8; 3];

    pub const WHITE: Rgb = [255, 255, 255];
    pub const BLACK: Rgb = [0, 0, 0];
    pub const BLUE: Rgb = [0, 0, 255];
    pub const ORANGE: Rgb = [255, 165, 0];
}

/// Read-only snapshot of the grid
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    pub width: i32,
    pub height: i32,
    pub digits: &'a [Position],
    pub targets: &'a [Position],
}

impl GridView<'_> {
    fn is_on_border(&self, x: i32, y: i32) -> bool {
        x == 0 || x == self.width - 1 || y == 0 || y == self.height - 1
    }

    fn digit_at(&self, p: Position) -> Option<usize> {
        self.digits.iter().position(|&d| d == p)
    }
}

/// Text rendering: one row per grid row, digits where present, `.` for
/// empty border cells and `:` for empty cells of the target area.
pub fn ansi(view: &GridView<'_>) -> String {
    (0..view.height)
        .map(|y| {
            (0..view.width)
                .map(|x| match view.digit_at(Position::new(x, y)) {
                    Some(d) => char::from_digit(d as u32, 10).unwrap_or('#'),
                    None if view.is_on_border(x, y) => '.',
                    None => ':',
                })
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// 3x5 bitmap glyphs, one row per byte, most significant of 3 bits on the left
const GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

const GLYPH_WIDTH: usize = 3;
const GLYPH_HEIGHT: usize = 5;
const LINE_WIDTH: usize = 3;

struct Canvas {
    pixels: Array3<u8>,
}

impl Canvas {
    fn new(width: usize, height: usize, background: color::Rgb) -> Self {
        let pixels = Array3::from_shape_fn((height, width, 3), |(_, _, c)| background[c]);
        Self { pixels }
    }

    fn width(&self) -> usize {
        self.pixels.dim().1
    }

    fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Fill `[x0, x1) x [y0, y1)`, clipped to the canvas
    fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, rgb: color::Rgb) {
        let (x1, y1) = (x1.min(self.width()), y1.min(self.height()));
        for y in y0..y1 {
            for x in x0..x1 {
                for (c, &v) in rgb.iter().enumerate() {
                    self.pixels[[y, x, c]] = v;
                }
            }
        }
    }

    /// Draw `digit` centred in the cell at `origin` of size `cell`
    fn draw_digit(&mut self, digit: usize, origin: (f32, f32), cell: (f32, f32), rgb: color::Rgb) {
        let ((cell_x, cell_y), (cell_w, cell_h)) = (origin, cell);
        let Some(glyph) = GLYPHS.get(digit) else {
            return;
        };
        let scale = ((cell_w.min(cell_h) * 0.6) / GLYPH_HEIGHT as f32).floor().max(1.0) as usize;
        let glyph_w = (GLYPH_WIDTH * scale) as f32;
        let glyph_h = (GLYPH_HEIGHT * scale) as f32;
        let left = (cell_x + (cell_w - glyph_w) / 2.0).max(0.0) as usize;
        let top = (cell_y + (cell_h - glyph_h) / 2.0).max(0.0) as usize;

        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1u8 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    let x = left + col * scale;
                    let y = top + row * scale;
                    self.fill_rect(x, y, x + scale, y + scale, rgb);
                }
            }
        }
    }
}

/// Draw the grid as an RGB image of shape `(window_height, window_width, 3)`.
///
/// White background, orange target area, targets as white digits, current
/// positions as blue digits, black grid lines.
pub fn rasterize(view: &GridView<'_>, window_width: usize, window_height: usize) -> Array3<u8> {
    let mut canvas = Canvas::new(window_width, window_height, color::WHITE);
    let cell_w = window_width as f32 / view.width as f32;
    let cell_h = window_height as f32 / view.height as f32;

    canvas.fill_rect(
        cell_w as usize,
        cell_h as usize,
        (cell_w * (view.width - 1) as f32) as usize,
        (cell_h * (view.height - 1) as f32) as usize,
        color::ORANGE,
    );

    for (layer, rgb) in [(view.targets, color::WHITE), (view.digits, color::BLUE)] {
        for (digit, p) in layer.iter().enumerate() {
            canvas.draw_digit(
                digit,
                (cell_w * p.x as f32, cell_h * p.y as f32),
                (cell_w, cell_h),
                rgb,
            );
        }
    }

    let half = LINE_WIDTH / 2;
    for y in 1..view.height {
        let center = (cell_h * y as f32) as usize;
        let top = center.saturating_sub(half);
        canvas.fill_rect(0, top, window_width, top + LINE_WIDTH, color::BLACK);
    }
    for x in 1..view.width {
        let center = (cell_w * x as f32) as usize;
        let left = center.saturating_sub(half);
        canvas.fill_rect(left, 0, left + LINE_WIDTH, window_height, color::BLACK);
    }

    canvas.pixels
}

/// Paces frames to a target rate
#[derive(Debug, Default)]
struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    /// Sleep until a full frame has passed since the previous tick
    fn tick(&mut self, fps: u32) {
        if fps > 0 {
            if let Some(last) = self.last {
                let frame = Duration::from_secs_f64(1.0 / fps as f64);
                let elapsed = last.elapsed();
                if elapsed < frame {
                    std::thread::sleep(frame - elapsed);
                }
            }
        }
        self.last = Some(Instant::now());
    }
}

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

type OpenSurface<W> = Box<dyn FnMut() -> io::Result<W> + Send>;

/// Human rendering context owned by the caller.
///
/// The output surface and frame clock are acquired on the first `present`
/// and released by `close` (or on drop). A closed context reopens on the
/// next `present`.
pub struct RenderContext<W: Write> {
    open_surface: OpenSurface<W>,
    surface: Option<W>,
    clock: FrameClock,
    fps: u32,
    frames: u64,
}

impl RenderContext<Stdout> {
    /// Render to the terminal at `fps` frames per second
    pub fn stdout(fps: u32) -> Self {
        Self::new(fps, || Ok(io::stdout()))
    }
}

impl<W: Write> RenderContext<W> {
    /// Create a context that opens its surface with `open_surface`.
    ///
    /// An `fps` of 0 disables frame pacing.
    pub fn new(fps: u32, open_surface: impl FnMut() -> io::Result<W> + Send + 'static) -> Self {
        Self {
            open_surface: Box::new(open_surface),
            surface: None,
            clock: FrameClock::default(),
            fps,
            frames: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Frames presented over the context's lifetime
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Draw one frame, replacing the previous one
    pub fn present(&mut self, frame: &str) -> Result<()> {
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => {
                let mut surface = (self.open_surface)()?;
                surface.write_all(HIDE_CURSOR.as_bytes())?;
                tracing::debug!(fps = self.fps, "Opened render surface");
                self.clock = FrameClock::default();
                surface
            }
        };
        let surface = self.surface.insert(surface);

        writeln!(surface, "{CLEAR_SCREEN}{frame}")?;
        surface.flush()?;
        self.frames += 1;
        self.clock.tick(self.fps);
        Ok(())
    }

    /// Release the surface; a no-op when already closed
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut surface) = self.surface.take() {
            surface.write_all(SHOW_CURSOR.as_bytes())?;
            surface.flush()?;
            tracing::debug!(frames = self.frames, "Closed render surface");
        }
        Ok(())
    }
}

impl<W: Write> Drop for RenderContext<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
