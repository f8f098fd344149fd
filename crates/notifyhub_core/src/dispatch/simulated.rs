//! Simulated remote delivery service for environments without a backend.

use super::{DispatchError, DispatchOutcome, NotificationDispatcher, SendNotificationRequest};
use log::{info, warn};
use std::time::Duration;

const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Notification service is temporarily unavailable. Please try again.";

/// Sleeps for a fixed delay, then fails with `failure_rate` probability.
#[derive(Debug, Clone)]
pub struct SimulatedRemoteDispatcher {
    delay: Duration,
    failure_rate: f64,
}

impl SimulatedRemoteDispatcher {
    /// `failure_rate` is clamped into `0.0..=1.0`.
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        Self {
            delay,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl NotificationDispatcher for SimulatedRemoteDispatcher {
    fn send(&self, request: &SendNotificationRequest) -> Result<DispatchOutcome, DispatchError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        if rand::random::<f64>() < self.failure_rate {
            warn!(
                "event=notification_send module=dispatch status=error strategy=simulated error_code=service_unavailable delay_ms={}",
                self.delay.as_millis()
            );
            return Err(DispatchError::ServiceUnavailable(
                SERVICE_UNAVAILABLE_MESSAGE.to_string(),
            ));
        }

        info!(
            "event=notification_send module=dispatch status=ok strategy=simulated to_count={} cc_count={} group_count={} delay_ms={}",
            request.to.len(),
            request.cc.len(),
            request.selected_group_ids.len(),
            self.delay.as_millis()
        );
        Ok(DispatchOutcome::AcceptedByService)
    }
}
