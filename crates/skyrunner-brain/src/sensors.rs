//! Ray-cast sensing of the obstacle field.
//!
//! A ship perceives the field through six rays fanning out ahead of it. Each ray
//! marches forward in [`RAY_STEP`] increments up to [`RAY_RANGE`] and reports the
//! horizontal distance of the first sample inside an obstacle. Rays that leave the
//! field vertically, or find nothing in range, report [`NO_CONTACT`].

use skyrunner_engine::{FIELD_HEIGHT, FieldSnapshot, ShipBody, Vec2};

/// Vertical rise per unit of horizontal distance for each ray, top to bottom.
pub const RAY_SLOPES: [f64; 6] = [2.0, 1.0, 0.5, -0.5, -1.0, -2.0];

pub const RAY_STEP: u32 = 3;
pub const RAY_RANGE: u32 = 900;

/// Distance reported by a ray that hit nothing.
pub const NO_CONTACT: f64 = 9001.0;

/// Number of values produced by [`sense`]: height, velocity and one per ray.
pub const INPUT_WIDTH: usize = 2 + RAY_SLOPES.len();

/// Builds the network input vector for `ship` in the given field state.
#[must_use]
pub fn sense(ship: &ShipBody, field: &FieldSnapshot) -> [f64; INPUT_WIDTH] {
    let mut inputs = [0.0; INPUT_WIDTH];
    inputs[0] = ship.height();
    inputs[1] = ship.velocity();
    let origin = ship.position();
    for (input, slope) in inputs[2..].iter_mut().zip(RAY_SLOPES) {
        *input = ray_distance(origin, slope, field);
    }
    inputs
}

/// Marches a ray from `origin` and returns the distance of the first obstacle hit.
#[must_use]
pub fn ray_distance(origin: Vec2, slope: f64, field: &FieldSnapshot) -> f64 {
    for step in (RAY_STEP..=RAY_RANGE).step_by(RAY_STEP as usize) {
        let distance = f64::from(step);
        let sample = Vec2::new(origin.x + distance, origin.y + slope * distance);
        if !(0.0..=FIELD_HEIGHT).contains(&sample.y) {
            return NO_CONTACT;
        }
        if field.point_in_any(sample) {
            return distance;
        }
    }
    NO_CONTACT
}
