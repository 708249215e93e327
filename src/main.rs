//! Terminal frontend
//!
//! Rasterizes the simulation's draw list into an RGB pixel buffer and
//! paints it with unicode half-blocks, two pixels per terminal cell.
//! Text (score bar, letters, joke) goes on top as styled characters.

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute, queue,
    style::{self, Color as CColor},
    terminal,
};
use std::io::{self, Write, stdout};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossy_roads::consts::*;
use crossy_roads::draw::{DrawCmd, EGG_HEIGHT, EGG_WIDTH, build_draw_list};
use crossy_roads::sim::{Facing, ObstacleKind, Rect, StepDir, Terrain, TickInput, tick};
use crossy_roads::{Config, Session};

type Rgb = [u8; 3];

const GRASS: Rgb = [70, 160, 60];
const GRASS_ALT: Rgb = [85, 175, 70];
const ROAD: Rgb = [60, 60, 65];
const ROAD_MARK: Rgb = [200, 200, 90];
const RAIL_BED: Rgb = [115, 85, 55];
const RAIL_TIE: Rgb = [70, 50, 30];
const RAIL_STEEL: Rgb = [160, 160, 170];
const CHICKEN_BODY: Rgb = [250, 245, 235];
const CHICKEN_COMB: Rgb = [220, 40, 40];
const CHICKEN_BEAK: Rgb = [240, 160, 40];
const EGG_SHELL: Rgb = [248, 242, 225];
const EGG_SPECKLE: Rgb = [150, 120, 85];
const WINDOW_TINT: Rgb = [170, 210, 230];
const DANGER: Rgb = [200, 30, 30];

// ── Pixel buffer with half-block rendering ──────────────────────────────────

struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![[0, 0, 0]; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, [0, 0, 0]);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb, alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        for dy in 0..h {
            for dx in 0..w {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 && (px as usize) < self.w && (py as usize) < self.h {
                    let old = self.get(px as usize, py as usize);
                    let mixed = [
                        (old[0] as f32 * (1.0 - a) + c[0] as f32 * a) as u8,
                        (old[1] as f32 * (1.0 - a) + c[1] as f32 * a) as u8,
                        (old[2] as f32 * (1.0 - a) + c[2] as f32 * a) as u8,
                    ];
                    self.px[py as usize * self.w + px as usize] = mixed;
                }
            }
        }
    }

    fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg: Rgb = [0, 0, 0];
        let mut prev_bg: Rgb = [0, 0, 0];
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if need_fg || prev_fg != top {
                    queue!(
                        out,
                        style::SetForegroundColor(CColor::Rgb {
                            r: top[0],
                            g: top[1],
                            b: top[2]
                        })
                    )?;
                    prev_fg = top;
                    need_fg = false;
                }
                if need_bg || prev_bg != bot {
                    queue!(
                        out,
                        style::SetBackgroundColor(CColor::Rgb {
                            r: bot[0],
                            g: bot[1],
                            b: bot[2]
                        })
                    )?;
                    prev_bg = bot;
                    need_bg = false;
                }
                queue!(out, style::Print('\u{2580}'))?; // ▀
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        Ok(())
    }
}

// ── World-to-pixel rasterizer ───────────────────────────────────────────────

/// A styled string to print over the pixel layer
struct TextOverlay {
    col: u16,
    row: u16,
    color: Rgb,
    text: String,
}

struct Raster {
    sx: f32,
    sy: f32,
}

impl Raster {
    fn new(pw: usize, ph: usize) -> Self {
        Self {
            sx: pw as f32 / WORLD_WIDTH,
            sy: ph as f32 / WORLD_HEIGHT,
        }
    }

    fn px(&self, x: f32) -> i32 {
        (x * self.sx) as i32
    }

    fn py(&self, y: f32) -> i32 {
        (y * self.sy) as i32
    }

    fn rect(&self, buf: &mut PixelBuf, r: &Rect, c: Rgb) {
        let w = ((r.w * self.sx) as i32).max(1);
        let h = ((r.h * self.sy) as i32).max(1);
        buf.fill_rect(self.px(r.x), self.py(r.y), w, h, c);
    }

    /// Terminal cell for a world position (rows are two pixels tall)
    fn cell(&self, x: f32, y: f32) -> (u16, u16) {
        let col = (x * self.sx).max(0.0) as u16;
        let row = (y * self.sy / 2.0).max(0.0) as u16;
        (col, row)
    }

    fn draw(&self, buf: &mut PixelBuf, cmds: &[DrawCmd], overlays: &mut Vec<TextOverlay>) {
        for cmd in cmds {
            match cmd {
                DrawCmd::LaneStrip { y, height, terrain } => {
                    self.lane_strip(buf, *y, *height, *terrain)
                }
                DrawCmd::Obstacle {
                    kind,
                    rect,
                    color,
                    accent,
                    moving_right,
                } => self.obstacle(buf, *kind, rect, *color, *accent, *moving_right),
                DrawCmd::Egg { pos, speckles } => {
                    let body = Rect::new(pos.x, pos.y, EGG_WIDTH, EGG_HEIGHT);
                    self.ellipse(buf, &body, EGG_SHELL);
                    for s in speckles {
                        buf.fill_rect(self.px(s.x), self.py(s.y), 1, 1, EGG_SPECKLE);
                    }
                }
                DrawCmd::Player { rect, facing } => self.chicken(buf, rect, *facing),
                DrawCmd::Particle { pos, size, color } => {
                    let half = size / 2.0;
                    let r = Rect::new(pos.x - half, pos.y - half, *size, *size);
                    self.rect(buf, &r, *color);
                }
                DrawCmd::DangerBand { intensity } => {
                    let top = self.py(WORLD_HEIGHT - DANGER_BAND);
                    buf.blend_rect(
                        0,
                        top,
                        buf.w as i32,
                        buf.h as i32 - top,
                        DANGER,
                        0.25 * intensity,
                    );
                }
                DrawCmd::ScoreBar {
                    score,
                    level,
                    high_score,
                } => overlays.push(TextOverlay {
                    col: 1,
                    row: 0,
                    color: [255, 255, 255],
                    text: format!("SCORE {score}  LEVEL {level}  BEST {high_score}"),
                }),
                DrawCmd::Letter { ch, pos, color } => {
                    let (col, row) = self.cell(pos.x, pos.y);
                    overlays.push(TextOverlay {
                        col,
                        row,
                        color: *color,
                        text: ch.to_string(),
                    });
                }
                DrawCmd::Narrator { rect } => {
                    self.chicken(buf, rect, Facing::Right);
                }
                DrawCmd::JokeBubble { text, anchor } => {
                    let (col, row) = self.cell(anchor.x, anchor.y);
                    for (i, line) in text.lines().enumerate() {
                        overlays.push(TextOverlay {
                            col,
                            row: row + i as u16,
                            color: [255, 255, 255],
                            text: line.to_string(),
                        });
                    }
                }
                DrawCmd::RetryPrompt => {
                    let text = "PRESS SPACE TO TRY AGAIN".to_string();
                    let (_, rows) = self.cell(0.0, WORLD_HEIGHT);
                    let col = ((buf.w as i32 / 2) - text.len() as i32 / 2).max(0) as u16;
                    overlays.push(TextOverlay {
                        col,
                        row: rows.saturating_sub(3),
                        color: [255, 255, 120],
                        text,
                    });
                }
            }
        }
    }

    fn lane_strip(&self, buf: &mut PixelBuf, y: f32, height: f32, terrain: Terrain) {
        let top = self.py(y);
        let bottom = self.py(y + height);
        let h = (bottom - top).max(1);
        match terrain {
            Terrain::Grass => {
                // Checker tint so adjacent rows read as separate strips
                let alt = (y / height).rem_euclid(2.0) < 1.0;
                buf.fill_rect(0, top, buf.w as i32, h, if alt { GRASS } else { GRASS_ALT });
            }
            Terrain::Road => {
                buf.fill_rect(0, top, buf.w as i32, h, ROAD);
                // Dashed center line
                let mid = top + h / 2;
                let dash = (20.0 * self.sx) as i32;
                if dash > 0 {
                    let mut x = 0;
                    while x < buf.w as i32 {
                        buf.fill_rect(x, mid, dash, 1, ROAD_MARK);
                        x += dash * 2;
                    }
                }
            }
            Terrain::Rail => {
                buf.fill_rect(0, top, buf.w as i32, h, RAIL_BED);
                let tie = (10.0 * self.sx).max(1.0) as i32;
                if tie > 0 {
                    let mut x = 0;
                    while x < buf.w as i32 {
                        buf.fill_rect(x, top, tie / 2 + 1, h, RAIL_TIE);
                        x += tie * 3;
                    }
                }
                buf.fill_rect(0, top + h / 3, buf.w as i32, 1, RAIL_STEEL);
                buf.fill_rect(0, top + 2 * h / 3, buf.w as i32, 1, RAIL_STEEL);
            }
        }
    }

    fn obstacle(
        &self,
        buf: &mut PixelBuf,
        kind: ObstacleKind,
        rect: &Rect,
        color: Rgb,
        accent: Rgb,
        moving_right: bool,
    ) {
        self.rect(buf, rect, color);
        match kind {
            ObstacleKind::Car => {
                // Windshield on the leading third
                let w = rect.w / 3.0;
                let wx = if moving_right {
                    rect.right() - w - 5.0
                } else {
                    rect.x + 5.0
                };
                let windows = Rect::new(wx, rect.y + 8.0, w, rect.h - 16.0);
                self.rect(buf, &windows, WINDOW_TINT);
            }
            ObstacleKind::Truck => {
                // Cab at the front, trailer carries the body color
                let cab_w = 30.0_f32.min(rect.w / 3.0);
                let cx = if moving_right {
                    rect.right() - cab_w
                } else {
                    rect.x
                };
                let cab = Rect::new(cx, rect.y, cab_w, rect.h);
                self.rect(buf, &cab, accent);
            }
            ObstacleKind::Train => {
                // Warning stripe along the middle
                let stripe = Rect::new(rect.x, rect.y + rect.h / 2.0 - 3.0, rect.w, 6.0);
                self.rect(buf, &stripe, accent);
            }
        }
    }

    fn ellipse(&self, buf: &mut PixelBuf, r: &Rect, c: Rgb) {
        let x0 = self.px(r.x);
        let y0 = self.py(r.y);
        let w = ((r.w * self.sx) as i32).max(2);
        let h = ((r.h * self.sy) as i32).max(2);
        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        for dy in 0..h {
            for dx in 0..w {
                let nx = (dx as f32 + 0.5 - cx) / cx;
                let ny = (dy as f32 + 0.5 - cy) / cy;
                if nx * nx + ny * ny <= 1.0 {
                    buf.set(x0 + dx, y0 + dy, c);
                }
            }
        }
    }

    fn chicken(&self, buf: &mut PixelBuf, rect: &Rect, facing: Facing) {
        // Body
        let body = Rect::new(rect.x, rect.y + rect.h * 0.25, rect.w, rect.h * 0.75);
        self.rect(buf, &body, CHICKEN_BODY);
        // Head block on the facing side
        let head_w = rect.w * 0.4;
        let hx = match facing {
            Facing::Right => rect.right() - head_w,
            Facing::Left => rect.x,
        };
        let head = Rect::new(hx, rect.y, head_w, rect.h * 0.4);
        self.rect(buf, &head, CHICKEN_BODY);
        // Comb
        let comb = Rect::new(hx + head_w * 0.25, rect.y - rect.h * 0.1, head_w * 0.5, rect.h * 0.15);
        self.rect(buf, &comb, CHICKEN_COMB);
        // Beak points out of the head
        let beak_w = rect.w * 0.15;
        let bx = match facing {
            Facing::Right => rect.right(),
            Facing::Left => rect.x - beak_w,
        };
        let beak = Rect::new(bx, rect.y + rect.h * 0.15, beak_w, rect.h * 0.12);
        self.rect(buf, &beak, CHICKEN_BEAK);
    }
}

// ── Main loop ───────────────────────────────────────────────────────────────

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    env_logger::init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let mut session = Session::new(cfg, wall_clock_seed())?;
    let mut state = session.start_round();

    terminal::enable_raw_mode().context("enabling raw mode")?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
    let mut raster = Raster::new(buf.w, buf.h);

    let frame_dur = Duration::from_micros(1_000_000 / TICK_HZ as u64);
    let mut overlays: Vec<TextOverlay> = Vec::new();

    loop {
        let frame_start = Instant::now();
        let mut input = TickInput::default();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        cleanup(&mut out)?;
                        return Ok(());
                    }
                    KeyCode::Up | KeyCode::Char('w') => input.step = Some(StepDir::Up),
                    KeyCode::Down | KeyCode::Char('s') => input.step = Some(StepDir::Down),
                    KeyCode::Left | KeyCode::Char('a') => input.step = Some(StepDir::Left),
                    KeyCode::Right | KeyCode::Char('d') => input.step = Some(StepDir::Right),
                    KeyCode::Char(' ') | KeyCode::Enter => input.retry = true,
                    _ => {}
                },
                Event::Resize(c, r) => {
                    buf.resize(c as usize, r as usize * 2);
                    raster = Raster::new(buf.w, buf.h);
                }
                _ => {}
            }
        }

        tick(&mut state, &input);
        if state.round_over {
            session.finish_round(&state);
            state = session.start_round();
        }

        let cmds = build_draw_list(&state, session.high_score());
        overlays.clear();
        raster.draw(&mut buf, &cmds, &mut overlays);
        buf.render(&mut out)?;
        for overlay in &overlays {
            queue!(
                out,
                cursor::MoveTo(overlay.col, overlay.row),
                style::SetForegroundColor(CColor::Rgb {
                    r: overlay.color[0],
                    g: overlay.color[1],
                    b: overlay.color[2]
                }),
                style::Print(&overlay.text),
            )?;
        }
        queue!(out, style::ResetColor)?;
        out.flush()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
