/// Single-shot, cancel-replaced timers
///
/// Arming a timer again invalidates the previous arm, so at most one
/// firing is ever honoured. The waiting itself happens in an iced task
/// built from [`wait`]; the timer only decides whether a fired token
/// still counts.
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

#[derive(Debug, Default, Clone)]
pub struct Timer {
    generation: u64,
    armed: bool,
}

impl Timer {
    /// Start (or restart) the timer
    pub fn arm(&mut self) -> TimerToken {
        self.generation += 1;
        self.armed = true;
        TimerToken(self.generation)
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    /// Accept a fired token if it belongs to the latest arm
    pub fn fire(&mut self, token: TimerToken) -> bool {
        if self.armed && token.0 == self.generation {
            self.armed = false;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Sleep, then hand the token back
pub async fn wait(delay: Duration, token: TimerToken) -> TimerToken {
    tokio::time::sleep(delay).await;
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_invalidates_previous() {
        let mut timer = Timer::default();
        let first = timer.arm();
        let second = timer.arm();
        assert!(!timer.fire(first));
        assert!(timer.fire(second));
        assert!(!timer.fire(second));
    }

    #[test]
    fn test_cancel() {
        let mut timer = Timer::default();
        let token = timer.arm();
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire(token));
    }

    #[tokio::test]
    async fn test_wait_returns_token() {
        let mut timer = Timer::default();
        let token = timer.arm();
        let fired = wait(Duration::from_millis(1), token).await;
        assert!(timer.fire(fired));
    }
}
