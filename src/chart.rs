//! Per-generation fitness history with a sliding x-axis window.
//!
//! The x-axis is the chart's own event counter, not the engine's generation
//! ordinal, which starts over whenever the simulation is reset.

use crate::engine::Statistics;

/// How many events the x-axis spans once there is enough history.
pub const WINDOW: usize = 50;
/// The y-axis starts out showing at least this much fitness.
pub const SUGGESTED_Y_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Position on the x-axis; matches the event's label.
    pub index: usize,
    pub value: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    pub fn contains(&self, index: usize) -> bool {
        (self.min..=self.max).contains(&index)
    }
}

#[derive(Debug, Clone)]
pub struct StatsChart {
    min: Vec<Point>,
    avg: Vec<Point>,
    max: Vec<Point>,
    labels: Vec<usize>,
    next_label: usize,
    x: Bounds,
}

impl Default for StatsChart {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsChart {
    /// A chart holding the synthetic all-zero generation 0.
    pub fn new() -> Self {
        let mut chart = Self {
            min: Vec::new(),
            avg: Vec::new(),
            max: Vec::new(),
            labels: Vec::new(),
            next_label: 0,
            x: Bounds { min: 0, max: 0 },
        };
        chart.record(&Statistics {
            min: Some(0.0),
            avg: Some(0.0),
            max: Some(0.0),
            ..Statistics::default()
        });
        chart
    }

    /// Append a finished generation. Records without fitness are ignored.
    pub fn record(&mut self, stats: &Statistics) -> bool {
        let Some((min, avg, max)) = stats.fitness() else {
            return false;
        };
        let index = self.next_label;
        self.next_label += 1;

        self.labels.push(index);
        self.min.push(Point { index, value: min });
        self.avg.push(Point { index, value: avg });
        self.max.push(Point { index, value: max });

        self.x = Bounds {
            min: index.saturating_sub(WINDOW),
            max: index,
        };
        true
    }

    pub fn x_bounds(&self) -> Bounds {
        self.x
    }

    /// Zero up to the largest value in view, never below the suggested max.
    pub fn y_max(&self) -> f32 {
        self.visible(&self.max)
            .map(|p| p.value)
            .fold(SUGGESTED_Y_MAX, f32::max)
    }

    pub fn min_series(&self) -> &[Point] {
        &self.min
    }

    pub fn avg_series(&self) -> &[Point] {
        &self.avg
    }

    pub fn max_series(&self) -> &[Point] {
        &self.max
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Points of `series` inside the current x window.
    pub fn visible<'a>(&self, series: &'a [Point]) -> impl Iterator<Item = &'a Point> + 'a {
        let bounds = self.x;
        series.iter().filter(move |p| bounds.contains(p.index))
    }
}
