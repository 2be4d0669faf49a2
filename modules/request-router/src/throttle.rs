//! Request throttling ahead of dispatch.
//!
//! A keyed governor limiter bounds request rate independently of tenant
//! resolution, so floods (including repeated probe traffic) are rejected
//! before any directory lookup. Keys shard the state: probes and unmatched
//! paths share the global key, gated routes get their own buckets.

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use http::Method;
use thiserror::Error;

/// Throttle bucket key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThrottleKey {
    Global,
    Route(Method, String),
}

/// Rate quota configuration.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
    /// Sustained requests per second per key.
    pub rps: u32,
    /// Burst allowance per key.
    pub burst: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { rps: 100, burst: 200 }
    }
}

/// The request was rejected by the throttle. Terminal; callers that issue
/// rapid repeated requests must pace themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request rate limit exceeded")]
pub struct Throttled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("throttle quota must be non-zero (rps={rps}, burst={burst})")]
pub struct InvalidQuota {
    pub rps: u32,
    pub burst: u32,
}

pub struct RequestThrottle {
    limiter: DefaultKeyedRateLimiter<ThrottleKey>,
}

impl RequestThrottle {
    /// # Errors
    ///
    /// Returns `InvalidQuota` if either quota component is zero.
    pub fn new(config: ThrottleConfig) -> Result<Self, InvalidQuota> {
        let invalid = InvalidQuota {
            rps: config.rps,
            burst: config.burst,
        };
        let rps = NonZeroU32::new(config.rps).ok_or(invalid)?;
        let burst = NonZeroU32::new(config.burst).ok_or(invalid)?;
        Ok(Self {
            limiter: RateLimiter::keyed(Quota::per_second(rps).allow_burst(burst)),
        })
    }

    /// Admit or reject one request for `key`. Counting is per key; there is
    /// no coalescing of bursts.
    ///
    /// # Errors
    ///
    /// Returns `Throttled` when the key's bucket is exhausted.
    pub fn admit(&self, key: &ThrottleKey) -> Result<(), Throttled> {
        self.limiter.check_key(key).map_err(|_| Throttled)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn admits_within_quota() {
        let throttle = RequestThrottle::new(ThrottleConfig { rps: 10, burst: 10 }).unwrap();
        for _ in 0..10 {
            throttle.admit(&ThrottleKey::Global).unwrap();
        }
    }

    #[test]
    fn rejects_beyond_burst() {
        let throttle = RequestThrottle::new(ThrottleConfig { rps: 1, burst: 2 }).unwrap();
        throttle.admit(&ThrottleKey::Global).unwrap();
        throttle.admit(&ThrottleKey::Global).unwrap();
        assert_eq!(throttle.admit(&ThrottleKey::Global), Err(Throttled));
    }

    #[test]
    fn keys_are_independent() {
        let throttle = RequestThrottle::new(ThrottleConfig { rps: 1, burst: 1 }).unwrap();
        throttle.admit(&ThrottleKey::Global).unwrap();
        assert_eq!(throttle.admit(&ThrottleKey::Global), Err(Throttled));

        let other = ThrottleKey::Route(Method::POST, "/recipe/signup".to_owned());
        throttle.admit(&other).unwrap();
    }

    #[test]
    fn zero_quota_is_rejected() {
        assert!(RequestThrottle::new(ThrottleConfig { rps: 0, burst: 1 }).is_err());
        assert!(RequestThrottle::new(ThrottleConfig { rps: 1, burst: 0 }).is_err());
    }
}
