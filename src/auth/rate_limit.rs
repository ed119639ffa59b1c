//! Per-address throttling of failed logins. Each failure against a
//! directory-managed account costs an LDAP bind, so repeated guessing is
//! cut off before the directory is contacted.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const MAX_FAILURES: usize = 5;
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

pub struct LoginThrottle {
    max_failures: usize,
    window: Duration,
    failures: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl LoginThrottle {
    pub fn new(max_failures: usize, window: Duration) -> Self {
        Self {
            max_failures,
            window,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// True once `ip` has used up its failures within the window.
    /// Expired entries of `ip` are dropped on the way.
    pub fn is_blocked(&self, ip: IpAddr) -> bool {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let Some(times) = map.get_mut(&ip) else {
            return false;
        };
        let window = self.window;
        times.retain(|t| t.elapsed() < window);
        if times.is_empty() {
            map.remove(&ip);
            return false;
        }
        times.len() >= self.max_failures
    }

    /// Count a failure for `ip`. Addresses whose failures have all expired
    /// are swept out so the map only holds clients still inside the window.
    pub fn record_failure(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let window = self.window;
        map.retain(|_, times| {
            times.retain(|t| t.elapsed() < window);
            !times.is_empty()
        });
        map.entry(ip).or_default().push(Instant::now());
    }

    /// Forget the failures of `ip` after a successful login.
    pub fn clear(&self, ip: IpAddr) {
        let mut map = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&ip);
    }
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new(MAX_FAILURES, WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 8));

    #[test]
    fn test_blocks_after_max_failures() {
        let throttle = LoginThrottle::new(3, WINDOW);
        for _ in 0..2 {
            throttle.record_failure(CLIENT);
        }
        assert!(!throttle.is_blocked(CLIENT));
        throttle.record_failure(CLIENT);
        assert!(throttle.is_blocked(CLIENT));
        assert!(!throttle.is_blocked(OTHER));
    }

    #[test]
    fn test_clear_unblocks() {
        let throttle = LoginThrottle::new(1, WINDOW);
        throttle.record_failure(CLIENT);
        assert!(throttle.is_blocked(CLIENT));
        throttle.clear(CLIENT);
        assert!(!throttle.is_blocked(CLIENT));
    }

    #[test]
    fn test_failures_expire() {
        let throttle = LoginThrottle::new(1, Duration::ZERO);
        throttle.record_failure(CLIENT);
        assert!(!throttle.is_blocked(CLIENT));
    }

    #[test]
    fn test_expired_addresses_are_swept() {
        let throttle = LoginThrottle::new(1, Duration::ZERO);
        for last in 1..=50u8 {
            throttle.record_failure(IpAddr::V4(Ipv4Addr::new(10, 1, 0, last)));
        }
        throttle.record_failure(CLIENT);

        let map = throttle.failures.lock().expect("throttle lock");
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&CLIENT));
    }

    #[test]
    fn test_sweep_keeps_live_failures() {
        let throttle = LoginThrottle::new(2, WINDOW);
        throttle.record_failure(CLIENT);
        throttle.record_failure(OTHER);
        throttle.record_failure(CLIENT);
        assert!(throttle.is_blocked(CLIENT));
        assert!(!throttle.is_blocked(OTHER));
    }
}
