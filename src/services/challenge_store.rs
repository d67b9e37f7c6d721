//! In-process table of live OTP challenges, keyed by registrant email.
//!
//! At most one live challenge exists per identity; issuing a new one replaces
//! the old. Challenges are never persisted, so a restart drops any in-flight
//! codes and the registrant simply requests a new one.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A stored (code, expiry) pair for one identity's in-flight OTP attempt.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a verification attempt, decided atomically under the table lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the challenge has been consumed.
    Consumed,
    /// No live challenge for this identity.
    NoChallenge,
    /// Challenge past expiry; it has been discarded.
    Expired,
    /// Wrong code; the challenge is retained so retries remain possible
    /// until expiry.
    Mismatch,
}

#[derive(Default)]
pub struct ChallengeStore {
    entries: Mutex<HashMap<String, Challenge>>,
}

impl ChallengeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // No invariant spans entries, so a poisoned lock is still usable.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Challenge>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a challenge for the identity, replacing any prior one.
    pub fn put(&self, email: &str, challenge: Challenge) {
        self.entries().insert(email.to_lowercase(), challenge);
    }

    /// Checks a submitted code against the stored challenge and applies the
    /// lifecycle side effects in one critical section, so a concurrent
    /// re-issue cannot interleave with the read-check-delete sequence.
    pub fn verify_and_consume(&self, email: &str, code: &str, now: DateTime<Utc>) -> VerifyOutcome {
        let key = email.to_lowercase();
        let mut entries = self.entries();

        let Some(challenge) = entries.get(&key) else {
            return VerifyOutcome::NoChallenge;
        };

        if now > challenge.expires_at {
            entries.remove(&key);
            return VerifyOutcome::Expired;
        }

        if challenge.code != code {
            return VerifyOutcome::Mismatch;
        }

        entries.remove(&key);
        VerifyOutcome::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn challenge(code: &str, ttl_secs: i64) -> Challenge {
        Challenge {
            code: code.to_string(),
            expires_at: Utc::now() + Duration::seconds(ttl_secs),
        }
    }

    #[test]
    fn consume_is_single_use() {
        let store = ChallengeStore::new();
        store.put("a@example.com", challenge("123456", 600));

        assert_eq!(
            store.verify_and_consume("a@example.com", "123456", Utc::now()),
            VerifyOutcome::Consumed
        );
        assert_eq!(
            store.verify_and_consume("a@example.com", "123456", Utc::now()),
            VerifyOutcome::NoChallenge
        );
    }

    #[test]
    fn mismatch_retains_challenge() {
        let store = ChallengeStore::new();
        store.put("a@example.com", challenge("123456", 600));

        for _ in 0..3 {
            assert_eq!(
                store.verify_and_consume("a@example.com", "000000", Utc::now()),
                VerifyOutcome::Mismatch
            );
        }

        assert_eq!(
            store.verify_and_consume("a@example.com", "123456", Utc::now()),
            VerifyOutcome::Consumed
        );
    }

    #[test]
    fn expired_challenge_is_discarded() {
        let store = ChallengeStore::new();
        let expires_at = Utc::now();
        store.put(
            "a@example.com",
            Challenge {
                code: "123456".to_string(),
                expires_at,
            },
        );

        // Exactly at expiry is still acceptable; one second past is not.
        assert_eq!(
            store.verify_and_consume("a@example.com", "123456", expires_at + Duration::seconds(1)),
            VerifyOutcome::Expired
        );
        // The expiry observation deleted it.
        assert_eq!(
            store.verify_and_consume("a@example.com", "123456", Utc::now()),
            VerifyOutcome::NoChallenge
        );
    }

    #[test]
    fn accepted_at_exact_expiry_instant() {
        let store = ChallengeStore::new();
        let expires_at = Utc::now();
        store.put(
            "a@example.com",
            Challenge {
                code: "123456".to_string(),
                expires_at,
            },
        );

        assert_eq!(
            store.verify_and_consume("a@example.com", "123456", expires_at),
            VerifyOutcome::Consumed
        );
    }

    #[test]
    fn newer_challenge_supersedes_older() {
        let store = ChallengeStore::new();
        store.put("a@example.com", challenge("111111", 600));
        store.put("a@example.com", challenge("222222", 600));

        assert_eq!(
            store.verify_and_consume("a@example.com", "111111", Utc::now()),
            VerifyOutcome::Mismatch
        );
        assert_eq!(
            store.verify_and_consume("a@example.com", "222222", Utc::now()),
            VerifyOutcome::Consumed
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        let store = ChallengeStore::new();
        store.put("Alice@Example.com", challenge("123456", 600));

        assert_eq!(
            store.verify_and_consume("alice@example.com", "123456", Utc::now()),
            VerifyOutcome::Consumed
        );
    }
}
