use serde::{Deserialize, Serialize};

/// Speed and heading request produced by one decision cycle.
///
/// `heading_delta` is in degrees, negative turns left. Zero means go straight.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleState {
    pub speed: f32,
    pub heading_delta: f32,
}

impl VehicleState {
    /// Drive at `speed`, go straight.
    pub fn cruising(speed: f32) -> Self {
        Self {
            speed,
            heading_delta: 0.0,
        }
    }

    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_heading_delta(mut self, heading_delta: f32) -> Self {
        self.heading_delta = heading_delta;
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.speed == 0.0
    }

    /// Keeps `speed` within `[0, speed_limit]`. NaN speeds collapse to a stop.
    pub fn clamped(mut self, speed_limit: f32) -> Self {
        let limit = if speed_limit.is_finite() {
            speed_limit.max(0.0)
        } else {
            0.0
        };
        self.speed = if self.speed.is_nan() {
            0.0
        } else {
            self.speed.clamp(0.0, limit)
        };
        self
    }
}
