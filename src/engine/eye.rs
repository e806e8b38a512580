use std::f32::consts::{PI, TAU};

use super::{Config, Food};

#[derive(Debug, Clone)]
pub struct Eye {
    fov_range: f32,
    fov_angle: f32,
    cells: usize,
}

impl Eye {
    pub fn new(config: &Config) -> Self {
        Self {
            fov_range: config.eye_fov_range,
            fov_angle: config.eye_fov_angle,
            cells: config.eye_cells,
        }
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Energy seen by each cell, from the leftmost edge of the field of view
    /// to the rightmost one.
    pub fn process_vision(&self, x: f32, y: f32, rotation: f32, foods: &[Food]) -> Vec<f32> {
        let mut cells = vec![0.0; self.cells];

        for food in foods {
            let dx = food.x - x;
            let dy = food.y - y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist >= self.fov_range {
                continue;
            }

            // Heading `r` points along (-sin r, cos r).
            let angle = wrap_angle((-dx).atan2(dy) - rotation);
            if angle < -self.fov_angle / 2.0 || angle > self.fov_angle / 2.0 {
                continue;
            }

            let cell = (angle + self.fov_angle / 2.0) / self.fov_angle * self.cells as f32;
            let cell = (cell as usize).min(self.cells - 1);
            cells[cell] += (self.fov_range - dist) / self.fov_range;
        }

        cells
    }
}

fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
