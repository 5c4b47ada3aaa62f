use super::Actuator;
use crate::error::ActuationError;
use crate::pipeline::types::VehicleState;
use tokio::sync::watch;

/// Hands each committed state to subscribers as an immutable snapshot.
///
/// Subscribers always see the latest state; intermediate ones may be skipped.
#[derive(Debug)]
pub struct StatePublisher {
    state_tx: watch::Sender<VehicleState>,
}

impl StatePublisher {
    pub fn new(initial: VehicleState) -> (Self, watch::Receiver<VehicleState>) {
        let (state_tx, state_rx) = watch::channel(initial);
        (Self { state_tx }, state_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<VehicleState> {
        self.state_tx.subscribe()
    }

    pub fn latest(&self) -> VehicleState {
        *self.state_tx.borrow()
    }
}

impl Actuator for StatePublisher {
    fn apply(&mut self, state: &VehicleState) -> Result<(), ActuationError> {
        self.state_tx
            .send(*state)
            .map_err(|_| ActuationError::Disconnected)
    }

    fn name(&self) -> &'static str {
        "StatePublisher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_latest_state() {
        let (mut publisher, mut state_rx) = StatePublisher::new(VehicleState::stopped());
        assert_eq!(*state_rx.borrow(), VehicleState::stopped());

        publisher.apply(&VehicleState::cruising(40.0)).unwrap();
        state_rx.changed().await.unwrap();
        assert_eq!(*state_rx.borrow_and_update(), VehicleState::cruising(40.0));
        assert_eq!(publisher.latest(), VehicleState::cruising(40.0));
    }

    #[test]
    fn test_disconnected_when_no_subscribers() {
        let (mut publisher, state_rx) = StatePublisher::new(VehicleState::stopped());
        drop(state_rx);
        assert!(matches!(
            publisher.apply(&VehicleState::cruising(40.0)),
            Err(ActuationError::Disconnected)
        ));
    }
}
