use rand::Rng;
use serde::Serialize;

use crate::hanoi::layout::Point;

pub type Rgb = (u8, u8, u8);

/// Disk colours, indexed by `size % len`.
pub const DISK_PALETTE: [Rgb; 6] = [
    (230, 57, 70),
    (241, 128, 45),
    (252, 192, 21),
    (168, 218, 220),
    (69, 123, 157),
    (29, 53, 87),
];

pub const CONFETTI_COUNT: usize = 150;
const LIFE_FRAMES: u32 = 100;
const START_SIZE: f64 = 5.0;
const MIN_SIZE: f64 = 1.0;
const SHRINK_PER_FRAME: f64 = 0.05;
const MAX_SPEED: f64 = 5.0;

pub fn disk_color(size: u32) -> Rgb {
    DISK_PALETTE[size as usize % DISK_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub position: Point,
    pub velocity: Point,
    pub color: Rgb,
    pub life: u32,
    pub size: f64,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(origin: Point, color: Rgb, rng: &mut R) -> Self {
        Self {
            position: origin,
            velocity: Point::new(
                rng.random_range(-MAX_SPEED..=MAX_SPEED),
                rng.random_range(-MAX_SPEED..=MAX_SPEED),
            ),
            color,
            life: LIFE_FRAMES,
            size: START_SIZE,
        }
    }

    pub fn update(&mut self) {
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self.life = self.life.saturating_sub(1);
        self.size = (self.size - SHRINK_PER_FRAME).max(MIN_SIZE);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfettiField {
    particles: Vec<Particle>,
}

impl ConfettiField {
    pub fn burst<R: Rng + ?Sized>(&mut self, origin: Point, count: usize, rng: &mut R) {
        for _ in 0..count {
            let color = DISK_PALETTE[rng.random_range(0..DISK_PALETTE.len())];
            self.particles.push(Particle::spawn(origin, color, rng));
        }
    }

    /// Advances one frame and drops dead particles.
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn burst_spawns_palette_coloured_particles() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ConfettiField::default();
        field.burst(Point::new(650.0, 370.0), CONFETTI_COUNT, &mut rng);
        assert_eq!(field.len(), 150);
        for p in field.particles() {
            assert!(DISK_PALETTE.contains(&p.color));
            assert!(p.velocity.x.abs() <= 5.0 && p.velocity.y.abs() <= 5.0);
            assert_eq!(p.life, 100);
        }
    }

    #[test]
    fn particles_shrink_and_expire() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = ConfettiField::default();
        field.burst(Point::new(0.0, 0.0), 3, &mut rng);

        for _ in 0..99 {
            field.update();
        }
        assert_eq!(field.len(), 3);
        let p = &field.particles()[0];
        assert_eq!(p.life, 1);
        assert!((p.size - 1.0).abs() < 1e-9);

        field.update();
        assert!(field.is_empty());
    }

    #[test]
    fn update_moves_by_velocity() {
        let mut particle = Particle {
            position: Point::new(10.0, 10.0),
            velocity: Point::new(2.0, -3.0),
            color: disk_color(1),
            life: 100,
            size: 5.0,
        };
        particle.update();
        assert_eq!(particle.position, Point::new(12.0, 7.0));
        assert_eq!(particle.life, 99);
        assert!((particle.size - 4.95).abs() < 1e-9);
    }
}
