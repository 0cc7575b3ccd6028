//! Admission control for in-flight pulls

use tracing::{debug, warn};

/// Caps the number of report requests in flight at once
#[derive(Debug)]
pub struct AdmissionController {
    max_in_flight: usize,
    in_flight: usize,
    peak_in_flight: usize,
}

impl AdmissionController {
    /// Create a controller; the limit never changes afterwards
    pub fn new(max_in_flight: usize) -> Self {
        debug!(%max_in_flight, "AdmissionController::new: called");
        Self {
            max_in_flight,
            in_flight: 0,
            peak_in_flight: 0,
        }
    }

    /// Take one unit of capacity if any is left
    pub fn try_acquire(&mut self) -> bool {
        if self.in_flight >= self.max_in_flight {
            return false;
        }
        self.in_flight += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.in_flight);
        true
    }

    /// Return one unit of capacity taken by `try_acquire`
    pub fn release(&mut self) {
        debug_assert!(self.in_flight > 0, "release without matching acquire");
        if self.in_flight == 0 {
            warn!("AdmissionController::release: called with nothing in flight");
            return;
        }
        self.in_flight -= 1;
    }

    pub fn has_capacity(&self) -> bool {
        self.in_flight < self.max_in_flight
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_up_to_limit() {
        let mut admission = AdmissionController::new(2);

        assert!(admission.try_acquire());
        assert!(admission.try_acquire());
        assert!(!admission.try_acquire());
        assert_eq!(admission.in_flight(), 2);
        assert!(!admission.has_capacity());
    }

    #[test]
    fn test_failed_acquire_has_no_effect() {
        let mut admission = AdmissionController::new(1);
        assert!(admission.try_acquire());

        assert!(!admission.try_acquire());
        assert!(!admission.try_acquire());
        assert_eq!(admission.in_flight(), 1);
    }

    #[test]
    fn test_release_frees_capacity() {
        let mut admission = AdmissionController::new(1);
        admission.try_acquire();
        admission.release();

        assert_eq!(admission.in_flight(), 0);
        assert!(admission.has_capacity());
        assert!(admission.try_acquire());
    }

    #[test]
    fn test_peak_tracking() {
        let mut admission = AdmissionController::new(3);
        admission.try_acquire();
        admission.try_acquire();
        admission.release();
        admission.try_acquire();

        assert_eq!(admission.peak_in_flight(), 2);
        assert_eq!(admission.max_in_flight(), 3);
    }
}
