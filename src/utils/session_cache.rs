use moka::future::Cache;
use std::time::Duration;

use crate::store::ClockOutState;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub session: String,
    pub date: String,
    pub employee_id: String,
}

impl SessionKey {
    pub fn new(session: &str, date: &str, employee_id: &str) -> Self {
        Self {
            session: session.to_string(),
            date: date.to_string(),
            employee_id: employee_id.to_string(),
        }
    }
}

/// Pending clock-out flows, per browser session.
///
/// Entries expire after the TTL, which drops an abandoned flow back to idle.
/// Only non-idle states are stored.
#[derive(Clone)]
pub struct SessionCache {
    states: Cache<SessionKey, ClockOutState>,
}

impl SessionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            states: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &SessionKey) -> ClockOutState {
        self.states.get(key).await.unwrap_or_default()
    }

    pub async fn put(&self, key: SessionKey, state: ClockOutState) {
        if state.is_idle() {
            self.states.invalidate(&key).await;
        } else {
            self.states.insert(key, state).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn unknown_session_is_idle() {
        let cache = SessionCache::new(Duration::from_secs(60));
        let key = SessionKey::new("s1", "01/01/2030", "1001");
        assert!(cache.get(&key).await.is_idle());
    }

    #[actix_web::test]
    async fn idle_clears_pending_state() {
        let cache = SessionCache::new(Duration::from_secs(60));
        let key = SessionKey::new("s1", "01/01/2030", "1001");
        let pending = ClockOutState::AwaitingManualEntry {
            date: "01/01/2030".into(),
            employee_id: "1001".into(),
        };

        cache.put(key.clone(), pending.clone()).await;
        assert_eq!(cache.get(&key).await, pending);
        // other sessions are unaffected
        assert!(cache.get(&SessionKey::new("s2", "01/01/2030", "1001")).await.is_idle());

        cache.put(key.clone(), ClockOutState::Idle).await;
        assert!(cache.get(&key).await.is_idle());
    }
}
