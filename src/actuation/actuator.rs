use crate::error::ActuationError;
use crate::pipeline::types::VehicleState;

/// Turns a committed vehicle state into motor and servo commands.
pub trait Actuator: Send {
    fn apply(&mut self, state: &VehicleState) -> Result<(), ActuationError>;
    fn name(&self) -> &'static str;
}

/// Logs each command as a JSON line instead of driving hardware.
#[derive(Debug, Clone, Default)]
pub struct LoggingActuator {
    last: Option<VehicleState>,
}

impl LoggingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<VehicleState> {
        self.last
    }
}

impl Actuator for LoggingActuator {
    fn apply(&mut self, state: &VehicleState) -> Result<(), ActuationError> {
        let command =
            serde_json::to_string(state).map_err(|e| ActuationError::Rejected(e.to_string()))?;
        if self.last.as_ref() != Some(state) {
            tracing::info!(command = %command, "Vehicle command changed");
        } else {
            tracing::trace!(command = %command, "Vehicle command unchanged");
        }
        self.last = Some(*state);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LoggingActuator"
    }
}
