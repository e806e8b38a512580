use std::f32::consts::{FRAC_PI_2, PI};

use raylib::prelude::*;

use aviary::{
    chart::{Point, StatsChart},
    config::{ConfigWatcher, ConsoleConfig},
    render::{Progress, Rgba, Surface},
    FlockEngine, Outcome, RenderLoop, Session, Terminal,
};

const BACKGROUND: Color = Color::new(20, 20, 24, 255);
const TEXT: Color = Color::new(220, 220, 210, 255);
const MIN_COLOR: Color = Color::new(255, 99, 132, 255);
const AVG_COLOR: Color = Color::new(54, 162, 235, 255);
const MAX_COLOR: Color = Color::new(75, 192, 128, 255);
const PADDING: i32 = 10;

fn main() {
    pretty_env_logger::init();
    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = ConsoleConfig::path();
    let init_config = ConsoleConfig::load(&config_path)?;
    log::info!("Starting with config from {}", config_path.display());

    let (mut rl, thread) = raylib::init()
        .log_level(raylib::consts::TraceLogLevel::LOG_WARNING)
        .size(init_config.window.width, init_config.window.height)
        .resizable()
        .title("Aviary")
        .vsync()
        .build();
    rl.set_target_fps(init_config.target_fps);
    // Escape clears the input line instead of closing the window.
    rl.set_exit_key(None);

    // Hot reload is optional; without a file on disk there is nothing to watch.
    let watcher = match ConfigWatcher::watch(&config_path, init_config) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            log::warn!("Config hot reload disabled: {}", err);
            None
        }
    };

    let engine = match init_config.seed {
        Some(seed) => FlockEngine::seeded(seed),
        None => FlockEngine::from_entropy(),
    };
    let mut session = Session::new(engine)?;
    session.set_max_speedup(init_config.speed.max);
    session.set_speedup(init_config.speed.initial);

    let mut font_size = init_config.terminal.font_size;
    let layout = Layout::new(init_config.window.width, init_config.window.height);
    let mut terminal = Terminal::new(init_config.terminal.scrollback, layout.columns(font_size));
    terminal.print_banner(&session.default_config());

    let mut render = RenderLoop::new();
    while !rl.window_should_close() {
        if let Some(config) = watcher.as_ref().and_then(ConfigWatcher::latest) {
            rl.set_target_fps(config.target_fps);
            session.set_max_speedup(config.speed.max);
            font_size = config.terminal.font_size;
        }

        let layout = Layout::new(rl.get_screen_width(), rl.get_screen_height());
        handle_input(&mut rl, &mut session, &mut terminal, &mut render, &layout, font_size);

        let fps = rl.get_fps().to_string();
        let mut d = rl.begin_drawing(&thread);
        d.clear_background(BACKGROUND);

        let mut surface = RaylibSurface::new(&mut d, &layout);
        render.tick(&mut session, &mut surface);

        draw_terminal(&mut d, &terminal, &layout, font_size);
        draw_chart(&mut d, render.chart(), &layout);
        draw_progress(&mut d, render.progress(), &layout);

        let mut speed = format!("{}x / {}x", session.speedup(), session.max_speedup());
        if !session.is_active() {
            speed.push_str(" (paused)");
        }
        d.draw_text(&speed, PADDING, PADDING, 20, TEXT.alpha(0.8));
        d.draw_text(&fps, layout.width - 35, PADDING, 20, Color::LINEN.alpha(0.5));
    }

    log::info!("Window closed after {} frames", render.frames());
    Ok(())
}

fn handle_input(
    rl: &mut RaylibHandle,
    session: &mut Session<FlockEngine>,
    terminal: &mut Terminal,
    render: &mut RenderLoop,
    layout: &Layout,
    font_size: i32,
) {
    use raylib::consts::KeyboardKey::*;

    while let Some(c) = rl.get_char_pressed() {
        terminal.push_char(c);
    }
    if rl.is_key_pressed(KEY_BACKSPACE) {
        terminal.backspace();
    }
    if rl.is_key_pressed(KEY_ESCAPE) {
        terminal.clear_input();
    }
    if rl.is_key_pressed(KEY_ENTER) || rl.is_key_pressed(KEY_KP_ENTER) {
        terminal.submit(session);
    }

    let page = layout.rows(font_size).max(1);
    if rl.is_key_pressed(KEY_PAGE_UP) {
        terminal.scroll_up(page);
    }
    if rl.is_key_pressed(KEY_PAGE_DOWN) {
        terminal.scroll_down(page);
    }

    let speedup = session.speedup();
    let step = (speedup / 10).max(1);
    if rl.is_key_pressed(KEY_UP) {
        session.set_speedup(speedup.saturating_add(step));
    }
    if rl.is_key_pressed(KEY_DOWN) {
        session.set_speedup(speedup.saturating_sub(step));
    }

    // The train button: one generation, straight onto the chart.
    if rl.is_key_pressed(KEY_F5) {
        let summaries = session.train(1);
        for stats in &summaries {
            render.record_generation(stats);
        }
        terminal.println("");
        for line in Outcome::Trained(summaries).lines() {
            terminal.println(&line);
        }
    }
}

/// Screen regions: world on the left, terminal on the right, chart and
/// progress bar along the bottom.
struct Layout {
    width: i32,
    side: i32,
    chart_top: i32,
    chart_height: i32,
    progress_top: i32,
}

impl Layout {
    const PROGRESS_HEIGHT: i32 = 24;

    fn new(width: i32, height: i32) -> Self {
        let chart_height = (height / 4).max(120);
        let bottom = chart_height + Self::PROGRESS_HEIGHT;
        let side = (height - bottom).min(width / 2).max(1);
        Self {
            width,
            side,
            chart_top: height - bottom,
            chart_height,
            progress_top: height - Self::PROGRESS_HEIGHT,
        }
    }

    fn terminal_left(&self) -> i32 {
        self.side + PADDING
    }

    fn columns(&self, font_size: i32) -> usize {
        let width = (self.width - self.terminal_left() - PADDING).max(0) as f32;
        (width / (font_size.max(1) as f32 * 0.6)) as usize
    }

    /// Terminal rows above the input line.
    fn rows(&self, font_size: i32) -> usize {
        let line = font_size.max(1) + 2;
        ((self.chart_top - PADDING * 2) / line - 1).max(0) as usize
    }
}

struct RaylibSurface<'a, 'b> {
    d: &'a mut RaylibDrawHandle<'b>,
    side: f32,
}

impl<'a, 'b> RaylibSurface<'a, 'b> {
    fn new(d: &'a mut RaylibDrawHandle<'b>, layout: &Layout) -> Self {
        Self {
            d,
            side: layout.side as f32,
        }
    }

    fn scale_point(&self, x: f32, y: f32) -> Vector2 {
        Vector2::new(x * self.side, y * self.side)
    }
}

fn color(c: Rgba) -> Color {
    Color::new(c.r, c.g, c.b, (c.a * 255.0).round() as u8)
}

impl Surface for RaylibSurface<'_, '_> {
    fn clear(&mut self) {
        let side = self.side as i32;
        self.d.draw_rectangle(0, 0, side, side, Color::BLACK);
    }

    fn draw_circle(&mut self, x: f32, y: f32, radius: f32, c: Rgba) {
        let center = self.scale_point(x, y);
        self.d
            .draw_circle_v(center, (radius * self.side).max(1.0), color(c));
    }

    fn draw_triangle(&mut self, x: f32, y: f32, size: f32, rotation: f32, c: Rgba) {
        let corner = |angle: f32, len: f32| {
            self.scale_point(x - angle.sin() * len, y + angle.cos() * len)
        };
        let nose = corner(rotation, size * 1.5);
        let left = corner(rotation + 2.0 / 3.0 * PI, size);
        let right = corner(rotation + 4.0 / 3.0 * PI, size);
        self.d.draw_triangle_lines(nose, left, right, color(c));
    }

    fn draw_arc(&mut self, x: f32, y: f32, radius: f32, from: f32, to: f32, c: Rgba) {
        let center = self.scale_point(x, y);
        let outer = radius * self.side;
        // Heading zero points down the screen; raylib measures from +x.
        self.d.draw_ring(
            center,
            outer * 0.8,
            outer,
            (from + FRAC_PI_2).to_degrees(),
            (to + FRAC_PI_2).to_degrees(),
            8,
            color(c),
        );
    }
}

fn draw_terminal(d: &mut RaylibDrawHandle, terminal: &Terminal, layout: &Layout, font_size: i32) {
    let left = layout.terminal_left();
    let line = font_size + 2;
    let mut y = PADDING;
    for text in terminal.visible(layout.rows(font_size)) {
        d.draw_text(text, left, y, font_size, TEXT);
        y += line;
    }
    let prompt = format!("$ {}_", terminal.input());
    d.draw_text(&prompt, left, layout.chart_top - PADDING - line, font_size, Color::GOLD);
}

fn draw_chart(d: &mut RaylibDrawHandle, chart: &StatsChart, layout: &Layout) {
    let top = layout.chart_top as f32 + PADDING as f32;
    let left = 40.0;
    let width = (layout.width as f32 - left - PADDING as f32).max(1.0);
    let height = (layout.chart_height as f32 - 2.0 * PADDING as f32).max(1.0);

    let bounds = chart.x_bounds();
    let span = (bounds.max - bounds.min).max(1) as f32;
    let y_max = chart.y_max();
    let project = |p: &Point| {
        Vector2::new(
            left + (p.index - bounds.min) as f32 / span * width,
            top + height - p.value / y_max * height,
        )
    };

    d.draw_rectangle_lines(
        left as i32,
        top as i32,
        width as i32,
        height as i32,
        TEXT.alpha(0.3),
    );
    for (series, c) in [
        (chart.min_series(), MIN_COLOR),
        (chart.avg_series(), AVG_COLOR),
        (chart.max_series(), MAX_COLOR),
    ] {
        let points: Vec<Vector2> = chart.visible(series).map(project).collect();
        for pair in points.windows(2) {
            d.draw_line_ex(pair[0], pair[1], 2.0, c);
        }
    }

    let label_y = (top + height) as i32 - 10;
    d.draw_text(&format!("{:.0}", y_max), PADDING, top as i32, 10, TEXT);
    d.draw_text(&bounds.min.to_string(), left as i32 + 2, label_y, 10, TEXT);
    d.draw_text(
        &bounds.max.to_string(),
        (left + width) as i32 - 30,
        label_y,
        10,
        TEXT,
    );
}

fn draw_progress(d: &mut RaylibDrawHandle, progress: Progress, layout: &Layout) {
    let top = layout.progress_top + 4;
    let height = Layout::PROGRESS_HEIGHT - 8;
    let width = layout.width - 2 * PADDING;
    let filled = (width as f32 * progress.fraction().clamp(0.0, 1.0)) as i32;
    d.draw_rectangle(PADDING, top, filled, height, AVG_COLOR.alpha(0.6));
    d.draw_rectangle_lines(PADDING, top, width, height, TEXT.alpha(0.3));
    d.draw_text(&progress.label(), PADDING + 4, top + 2, height - 4, TEXT);
}
