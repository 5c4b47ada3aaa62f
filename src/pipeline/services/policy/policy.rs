use crate::pipeline::types::{Detection, VehicleState};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Effect a close-by detection has on the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Red light, pedestrian, obstacle.
    Stop,
    /// Green light.
    Continue,
    TurnLeft,
    TurnRight,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Stop => "stop",
            Policy::Continue => "continue",
            Policy::TurnLeft => "turn_left",
            Policy::TurnRight => "turn_right",
        }
    }

    /// Returns the state after reacting to `detection`.
    pub fn apply(
        self,
        state: VehicleState,
        detection: &Detection,
        turn_angle: f32,
    ) -> VehicleState {
        match self {
            Policy::Stop => {
                debug!("{}: stopping car", detection.class_id);
                state.with_speed(0.0)
            }
            Policy::Continue => {
                debug!("{}: make no changes", detection.class_id);
                state
            }
            Policy::TurnLeft => {
                debug!("{}: car turning left", detection.class_id);
                state.with_heading_delta(-turn_angle)
            }
            Policy::TurnRight => {
                debug!("{}: car turning right", detection.class_id);
                state.with_heading_delta(turn_angle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::BoundingBox;

    const TURN_ANGLE: f32 = 90.0;

    fn detection() -> Detection {
        Detection::new(1, BoundingBox::from_corners(0.0, 0.0, 20.0, 30.0), 0.8)
    }

    fn sample_states() -> Vec<VehicleState> {
        vec![
            VehicleState::stopped(),
            VehicleState::cruising(40.0),
            VehicleState::cruising(12.5).with_heading_delta(-90.0),
            VehicleState::cruising(3.0).with_heading_delta(45.0),
        ]
    }

    #[test]
    fn test_continue_is_identity() {
        for state in sample_states() {
            assert_eq!(Policy::Continue.apply(state, &detection(), TURN_ANGLE), state);
        }
    }

    #[test]
    fn test_stop_always_zeroes_speed() {
        for state in sample_states() {
            let next = Policy::Stop.apply(state, &detection(), TURN_ANGLE);
            assert_eq!(next.speed, 0.0);
            assert_eq!(next.heading_delta, state.heading_delta);
        }
    }

    #[test]
    fn test_turns_set_heading_and_keep_speed() {
        let state = VehicleState::cruising(40.0);

        let left = Policy::TurnLeft.apply(state, &detection(), TURN_ANGLE);
        assert_eq!(left, VehicleState::cruising(40.0).with_heading_delta(-90.0));

        let right = Policy::TurnRight.apply(state, &detection(), TURN_ANGLE);
        assert_eq!(right, VehicleState::cruising(40.0).with_heading_delta(90.0));
    }

    #[test]
    fn test_turn_overwrites_previous_heading() {
        let state = VehicleState::cruising(40.0).with_heading_delta(-90.0);
        let next = Policy::TurnRight.apply(state, &detection(), TURN_ANGLE);
        assert_eq!(next.heading_delta, 90.0);
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: Policy = serde_json::from_str("\"turn_left\"").unwrap();
        assert_eq!(policy, Policy::TurnLeft);
        assert_eq!(policy.as_str(), "turn_left");
    }
}
