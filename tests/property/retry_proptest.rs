//! Property-based tests for the retry policy
//!
//! Uses proptest to check the backoff shape over arbitrary policies
//! and attempt counts.

use std::time::Duration;

use deskchat::RetryPolicy;
use proptest::prelude::*;

fn policy(base_secs: u64, extra_secs: u64) -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_secs(base_secs),
        max_delay: Duration::from_secs(base_secs + extra_secs),
        max_attempts: 5,
    }
}

proptest! {
    #[test]
    fn test_backoff_is_monotonic(
        base_secs in 0u64..10,
        extra_secs in 0u64..600,
        attempt in 1u32..64,
    ) {
        let policy = policy(base_secs, extra_secs);
        prop_assert!(policy.backoff(attempt) <= policy.backoff(attempt + 1));
    }

    #[test]
    fn test_backoff_never_exceeds_cap(
        base_secs in 0u64..10,
        extra_secs in 0u64..600,
        attempt in 1u32..1000,
    ) {
        let policy = policy(base_secs, extra_secs);
        prop_assert!(policy.backoff(attempt) <= policy.max_delay);
    }

    #[test]
    fn test_first_retry_waits_the_base_delay(
        base_secs in 0u64..10,
        extra_secs in 1u64..600,
    ) {
        let policy = policy(base_secs, extra_secs);
        prop_assert_eq!(policy.backoff(1), policy.base_delay);
    }
}
