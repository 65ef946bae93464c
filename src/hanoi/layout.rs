//! Screen geometry for the 1280x720 play field, used for playback
//! interpolation and confetti placement.

use serde::Serialize;

pub const WIDTH: f64 = 1280.0;
pub const HEIGHT: f64 = 720.0;
pub const DISK_HEIGHT: f64 = 25.0;
/// Apex of the arc a disk follows during solution playback.
pub const FLIGHT_APEX_Y: f64 = 150.0;

const BASE_LEFT: f64 = WIDTH * 0.1;
const BASE_WIDTH: f64 = WIDTH * 0.8;
const BASE_TOP: f64 = HEIGHT - 200.0;
const POLE_WIDTH: f64 = 20.0;
const POLE_HEIGHT: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

fn pole_center_x(tower: usize) -> f64 {
    let base_center = BASE_LEFT + BASE_WIDTH / 2.0;
    let left = match tower {
        0 => base_center / 2.0,
        1 => base_center,
        _ => base_center * 1.5,
    };
    left + POLE_WIDTH / 2.0
}

/// Centre of a tower's pole.
pub fn tower_anchor(tower: usize) -> Point {
    Point::new(pole_center_x(tower), BASE_TOP - POLE_HEIGHT / 2.0)
}

/// Resting centre of the disk at stack position `level` (0 = bottom).
pub fn disk_slot(tower: usize, level: usize) -> Point {
    Point::new(pole_center_x(tower), BASE_TOP - level as f64 * DISK_HEIGHT)
}

pub fn ease_out_quad(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_quad_endpoints() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert_eq!(ease_out_quad(0.5), 0.75);
    }

    #[test]
    fn towers_are_left_to_right() {
        let xs = (0..3).map(|t| tower_anchor(t).x).collect::<Vec<_>>();
        assert_eq!(xs, vec![330.0, 650.0, 970.0]);
        assert_eq!(disk_slot(1, 2).y, 470.0);
    }
}
