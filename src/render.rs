//! The per-frame advance/draw cycle.
//!
//! Advancing is gated by the pause flag and scaled by the speedup; drawing
//! happens every frame regardless, so a reset shows up even while paused.
//! Frames are pulled from a [`FrameSource`], which lets tests drive the loop
//! a fixed number of times without a window.

use crate::chart::StatsChart;
use crate::engine::{Config, Engine, Statistics, World};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

pub const FOOD_COLOR: Rgba = Rgba::rgb(0, 255, 128);
pub const ANIMAL_COLOR: Rgba = Rgba::rgb(255, 255, 255);
pub const VISION_COLOR: Rgba = Rgba::rgb(0, 255, 128);

/// Drawing primitives in world coordinates (the unit square). Angles are
/// radians; heading `r` points along `(-sin r, cos r)`.
pub trait Surface {
    fn clear(&mut self);
    fn draw_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn draw_triangle(&mut self, x: f32, y: f32, size: f32, rotation: f32, color: Rgba);
    fn draw_arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        angle_from: f32,
        angle_to: f32,
        color: Rgba,
    );
}

pub trait FrameSource {
    /// Wait for the next frame; `false` once there are no more.
    fn next_frame(&mut self) -> bool;
}

/// Yields a fixed number of frames back to back.
#[derive(Debug, Clone, Copy)]
pub struct FixedFrames(pub usize);

impl FrameSource for FixedFrames {
    fn next_frame(&mut self) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub age: usize,
    pub generation_length: usize,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        if self.generation_length == 0 {
            return 0.0;
        }
        self.age as f32 / self.generation_length as f32
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.age, self.generation_length)
    }
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    chart: StatsChart,
    progress: Progress,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self) -> &StatsChart {
        &self.chart
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Put a finished generation on the chart; a new one has just begun.
    pub fn record_generation(&mut self, stats: &Statistics) {
        if self.chart.record(stats) {
            self.progress = Progress {
                age: 0,
                generation_length: stats.generation_length,
            };
        }
    }

    /// Step the simulation `speedup` times if it is running. Returns how many
    /// generations finished.
    pub fn advance<E: Engine>(&mut self, session: &mut Session<E>) -> usize {
        if !session.is_active() {
            return 0;
        }

        let mut finished = 0;
        for _ in 0..session.speedup() {
            let stats = session.step();
            if stats.fitness().is_some() {
                self.record_generation(&stats);
                finished += 1;
            }
            self.progress = Progress {
                age: stats.age,
                generation_length: stats.generation_length,
            };
        }
        finished
    }

    pub fn draw<E: Engine, S: Surface>(&self, session: &Session<E>, surface: &mut S) {
        draw_world(session.config(), &session.world(), surface);
    }

    pub fn tick<E: Engine, S: Surface>(&mut self, session: &mut Session<E>, surface: &mut S) {
        self.advance(session);
        self.draw(session, surface);
        self.frames += 1;
    }

    /// Tick once per frame until the frame source runs dry.
    pub fn run<E, F, S>(&mut self, session: &mut Session<E>, frames: &mut F, surface: &mut S)
    where
        E: Engine,
        F: FrameSource,
        S: Surface,
    {
        while frames.next_frame() {
            self.tick(session, surface);
        }
        log::debug!("Frame source exhausted after {} frames", self.frames);
    }
}

pub fn draw_world<S: Surface>(config: &Config, world: &World, surface: &mut S) {
    surface.clear();

    for food in &world.foods {
        surface.draw_circle(food.x, food.y, config.food_size / 2.0, FOOD_COLOR);
    }

    let angle_per_cell = config.eye_fov_angle / config.eye_cells as f32;
    for animal in &world.animals {
        surface.draw_triangle(
            animal.x,
            animal.y,
            config.food_size,
            animal.rotation,
            ANIMAL_COLOR,
        );

        for (cell, &energy) in animal.vision.iter().enumerate() {
            let angle_from =
                (animal.rotation - config.eye_fov_angle / 2.0) + cell as f32 * angle_per_cell;
            surface.draw_arc(
                animal.x,
                animal.y,
                config.food_size * 2.5,
                angle_from,
                angle_from + angle_per_cell,
                VISION_COLOR.alpha(energy),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Bounds;
    use crate::engine::{Animal, FieldValue, Food, FlockEngine};
    use crate::patch::Override;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Clear,
        Circle { x: f32, y: f32, radius: f32 },
        Triangle { x: f32, y: f32, size: f32, rotation: f32 },
        Arc { from: f32, to: f32, alpha: f32 },
    }

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub calls: Vec<Call>,
    }

    impl Recorder {
        pub fn clears(&self) -> usize {
            self.calls.iter().filter(|c| **c == Call::Clear).count()
        }
    }

    impl Surface for Recorder {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }

        fn draw_circle(&mut self, x: f32, y: f32, radius: f32, _color: Rgba) {
            self.calls.push(Call::Circle { x, y, radius });
        }

        fn draw_triangle(&mut self, x: f32, y: f32, size: f32, rotation: f32, _color: Rgba) {
            self.calls.push(Call::Triangle {
                x,
                y,
                size,
                rotation,
            });
        }

        fn draw_arc(
            &mut self,
            _x: f32,
            _y: f32,
            _radius: f32,
            angle_from: f32,
            angle_to: f32,
            color: Rgba,
        ) {
            self.calls.push(Call::Arc {
                from: angle_from,
                to: angle_to,
                alpha: color.a,
            });
        }
    }

    fn session(generation_length: i64) -> Session<FlockEngine> {
        let mut session = Session::new(FlockEngine::seeded(3)).unwrap();
        session
            .reset(&[
                Override::Raw {
                    field: "sim_generation_length".to_string(),
                    value: FieldValue::Int(generation_length),
                },
                "a=5".parse().unwrap(),
                "f=5".parse().unwrap(),
            ])
            .unwrap();
        session
    }

    #[test]
    fn draws_foods_animals_and_vision_wedges() {
        let config = Config {
            food_size: 0.02,
            eye_cells: 2,
            eye_fov_angle: 1.0,
            ..Config::default()
        };
        let world = World {
            foods: vec![Food { x: 0.1, y: 0.2 }],
            animals: vec![Animal {
                x: 0.5,
                y: 0.5,
                rotation: 2.0,
                vision: vec![0.25, 1.5],
            }],
        };
        let mut surface = Recorder::default();
        draw_world(&config, &world, &mut surface);

        assert_eq!(
            surface.calls,
            vec![
                Call::Clear,
                Call::Circle {
                    x: 0.1,
                    y: 0.2,
                    radius: 0.01
                },
                Call::Triangle {
                    x: 0.5,
                    y: 0.5,
                    size: 0.02,
                    rotation: 2.0
                },
                Call::Arc {
                    from: 1.5,
                    to: 2.0,
                    alpha: 0.25
                },
                Call::Arc {
                    from: 2.0,
                    to: 2.5,
                    alpha: 1.0
                },
            ]
        );
    }

    #[test]
    fn advances_speedup_steps_per_tick() {
        let mut session = session(1000);
        session.set_speedup(7);
        let mut render = RenderLoop::new();
        let mut surface = Recorder::default();

        render.tick(&mut session, &mut surface);
        assert_eq!(render.progress(), Progress { age: 7, generation_length: 1000 });
        render.tick(&mut session, &mut surface);
        assert_eq!(render.progress().age, 14);
        assert_eq!(surface.clears(), 2);
    }

    #[test]
    fn paused_loop_still_draws() {
        let mut session = session(1000);
        session.toggle_pause();
        let mut render = RenderLoop::new();
        let mut surface = Recorder::default();

        render.run(&mut session, &mut FixedFrames(3), &mut surface);
        assert_eq!(render.frames(), 3);
        assert_eq!(surface.clears(), 3);
        assert_eq!(render.progress(), Progress::default());
        assert_eq!(session.step().age, 1);
    }

    #[test]
    fn pause_twice_resumes_advancing() {
        let mut session = session(1000);
        let mut render = RenderLoop::new();
        let mut surface = Recorder::default();
        session.toggle_pause();
        session.toggle_pause();
        render.tick(&mut session, &mut surface);
        assert_eq!(render.progress().age, 1);
    }

    #[test]
    fn generation_boundaries_feed_the_chart() {
        let mut session = session(4);
        session.set_speedup(10);
        let mut render = RenderLoop::new();
        let mut surface = Recorder::default();

        assert_eq!(render.advance(&mut session), 2);
        let chart = render.chart();
        assert_eq!(chart.labels(), &[0, 1, 2]);
        assert_eq!(chart.x_bounds().max, 2);
        // Ten steps with four-tick generations: two boundaries, then two more ticks.
        assert_eq!(render.progress(), Progress { age: 2, generation_length: 4 });

        render.draw(&session, &mut surface);
        assert_eq!(surface.clears(), 1);
    }

    #[test]
    fn chart_keeps_advancing_across_a_reset() {
        let mut session = session(1);
        let mut render = RenderLoop::new();
        session.set_speedup(60);
        assert_eq!(render.advance(&mut session), 60);

        session
            .reset(&[
                "i:sim_generation_length=1".parse().unwrap(),
                "a=5".parse().unwrap(),
            ])
            .unwrap();
        session.set_speedup(5);
        assert_eq!(render.advance(&mut session), 5);

        let chart = render.chart();
        assert_eq!(chart.labels()[61..], [61, 62, 63, 64, 65]);
        assert_eq!(chart.x_bounds(), Bounds { min: 15, max: 65 });
        let visible: Vec<usize> = chart.visible(chart.max_series()).map(|p| p.index).collect();
        assert!(visible.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(visible.first(), Some(&15));
    }

    #[test]
    fn empty_population_never_reaches_the_chart() {
        let mut session = session(2);
        session
            .reset(&[
                "a=0".parse().unwrap(),
                "i:sim_generation_length=2".parse().unwrap(),
            ])
            .unwrap();
        session.set_speedup(6);
        let mut render = RenderLoop::new();
        assert_eq!(render.advance(&mut session), 0);
        assert_eq!(render.chart().labels(), &[0]);
    }

    #[test]
    fn recording_resets_progress() {
        let mut render = RenderLoop::new();
        render.record_generation(&Statistics {
            generation: 1,
            generation_length: 30,
            age: 0,
            min: Some(0.0),
            avg: Some(1.0),
            max: Some(2.0),
        });
        assert_eq!(render.progress(), Progress { age: 0, generation_length: 30 });
        assert_eq!(render.progress().label(), "0/30");
    }

    #[test]
    fn fixed_frames_run_dry() {
        let mut frames = FixedFrames(2);
        assert!(frames.next_frame());
        assert!(frames.next_frame());
        assert!(!frames.next_frame());
    }
}
