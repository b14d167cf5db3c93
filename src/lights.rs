//! Point lights and their per-frame animation.
//!
//! [`LightRig`] owns the demo's sixteen lights: eight at fixed hand-placed
//! positions and eight orbiting the origin in the XZ plane. Positions are
//! recomputed every frame from the elapsed time; colors and attenuation
//! constants never change after startup.

use glam::Vec3;

/// A point light with linear/quadratic distance falloff.
#[derive(Clone, Copy, Debug)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub linear: f32,
    pub quadratic: f32,
}

impl Light {
    /// Distance at which this light's brightest channel falls below 5/256.
    ///
    /// Solves `maxChannel / (1 + linear*d + quadratic*d^2) = 5/256` for `d`.
    /// Uploaded to the lighting shader as a cutoff hint; the shader does not
    /// currently use it to skip work.
    pub fn attenuation_radius(&self) -> f32 {
        let max_channel = self.color.x.max(self.color.y).max(self.color.z);
        let discriminant =
            self.linear * self.linear - 4.0 * self.quadratic * (1.0 - (256.0 / 5.0) * max_channel);
        (-self.linear + discriminant.sqrt()) / (2.0 * self.quadratic)
    }
}

/// The eight static light positions, hand-placed around the model.
pub const FIXED_POSITIONS: [Vec3; 8] = [
    Vec3::new(-0.3, 0.31, 1.622),
    Vec3::new(-0.3, 0.31, 1.182),
    Vec3::new(-0.31, 0.31, 0.131),
    Vec3::new(-0.31, 0.31, -0.321),
    Vec3::new(0.1, 0.31, 1.622),
    Vec3::new(0.1, 0.31, 1.182),
    Vec3::new(0.121, 0.31, 0.131),
    Vec3::new(0.121, 0.31, -0.321),
];

const ORBIT_RADIUS: f32 = 1.5;
const ORBIT_SPEED: f32 = 0.5;
/// Phase spacing between consecutive orbiting lights, in radians.
const ORBIT_PHASE: f32 = 5.0;

/// Seed for the startup position jitter.
const JITTER_SEED: u32 = 11;

/// The demo's full set of lights.
pub struct LightRig {
    lights: Vec<Light>,
}

impl LightRig {
    /// Build `count` lights sharing the given attenuation constants.
    ///
    /// Initial positions are jittered from a seeded generator and every
    /// color is the constant (0.4, 0.4, 1.0). The jitter only matters to
    /// anything that reads the rig before the first
    /// [`animate`](Self::animate) call overwrites it.
    pub fn new(count: usize, linear: f32, quadratic: f32) -> Self {
        let mut state = JITTER_SEED;
        let lights = (0..count)
            .map(|_| Light {
                position: Vec3::new(
                    jitter(&mut state) * 3.0,
                    jitter(&mut state) * 2.1,
                    jitter(&mut state) * 2.1,
                ),
                color: Vec3::new(0.4, 0.4, 1.0),
                linear,
                quadratic,
            })
            .collect();
        Self { lights }
    }

    /// Move every light to its position at elapsed time `t`.
    pub fn animate(&mut self, t: f32) {
        for (i, light) in self.lights.iter_mut().enumerate() {
            light.position = Self::position_at(i, t);
        }
    }

    /// Deterministic position of light `index` at time `t`.
    ///
    /// The first eight lights sit at [`FIXED_POSITIONS`] regardless of `t`;
    /// the rest trace a circle of radius [`ORBIT_RADIUS`] in the XZ plane
    /// at the height of the first fixed light.
    pub fn position_at(index: usize, t: f32) -> Vec3 {
        if index < FIXED_POSITIONS.len() {
            return FIXED_POSITIONS[index];
        }
        let theta = ORBIT_SPEED * t + (index - FIXED_POSITIONS.len()) as f32 * ORBIT_PHASE;
        Vec3::new(
            theta.cos() * ORBIT_RADIUS,
            FIXED_POSITIONS[0].y,
            theta.sin() * ORBIT_RADIUS,
        )
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

/// Small xorshift step mapped into `[0, 99/87]`.
fn jitter(state: &mut u32) -> f32 {
    *state ^= *state << 13;
    *state ^= *state >> 17;
    *state ^= *state << 5;
    (*state % 100) as f32 / 87.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_lights_ignore_time() {
        for i in 0..FIXED_POSITIONS.len() {
            for t in [0.0, 1.5, 1000.0, -3.0] {
                assert_eq!(LightRig::position_at(i, t), FIXED_POSITIONS[i]);
            }
        }
    }

    #[test]
    fn orbiting_lights_stay_on_the_circle() {
        for i in 8..16 {
            for t in [0.0, 0.37, 12.9, 4096.0] {
                let pos = LightRig::position_at(i, t);
                assert_eq!(pos.y, FIXED_POSITIONS[0].y);
                let r2 = pos.x * pos.x + pos.z * pos.z;
                assert!(
                    (r2 - 2.25).abs() < 1e-4,
                    "light {i} at t={t}: x^2+z^2 = {r2}"
                );
            }
        }
    }

    #[test]
    fn orbiting_lights_are_phase_separated() {
        let a = LightRig::position_at(8, 1.0);
        let b = LightRig::position_at(9, 1.0);
        assert!((a - b).length() > 0.1);
    }

    #[test]
    fn attenuation_radius_matches_the_falloff_formula() {
        let light = Light {
            position: Vec3::ZERO,
            color: Vec3::new(0.4, 0.4, 1.0),
            linear: 2.0,
            quadratic: 3.0,
        };
        // (-2 + sqrt(4 - 12 * (1 - 51.2))) / 6
        assert!((light.attenuation_radius() - 3.770_87).abs() < 1e-3);
    }

    #[test]
    fn rig_construction_is_deterministic() {
        let a = LightRig::new(16, 2.0, 3.0);
        let b = LightRig::new(16, 2.0, 3.0);
        assert_eq!(a.len(), 16);
        for (la, lb) in a.lights().iter().zip(b.lights()) {
            assert_eq!(la.position, lb.position);
            assert_eq!(la.color, Vec3::new(0.4, 0.4, 1.0));
        }
    }

    #[test]
    fn animate_overwrites_the_startup_jitter() {
        let mut rig = LightRig::new(16, 2.0, 3.0);
        rig.animate(0.0);
        for (i, light) in rig.lights().iter().enumerate() {
            assert_eq!(light.position, LightRig::position_at(i, 0.0));
        }
    }
}
