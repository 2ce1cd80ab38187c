use serde::Serialize;
use uuid::Uuid;

use crate::database::store::Storage;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether a candidate may start a test. Free tests are always open;
/// other tests are open unless premium gating is switched on.
#[derive(Clone)]
pub struct AccessService {
    storage: Storage,
    gate_premium_tests: bool,
}

impl AccessService {
    pub fn new(storage: Storage, gate_premium_tests: bool) -> Self {
        Self {
            storage,
            gate_premium_tests,
        }
    }

    /// Only store failures surface as errors; every access outcome is a decision.
    pub async fn check_access(&self, user_id: &str, test_id: Uuid) -> Result<AccessDecision> {
        let Some(test) = self.storage.exams.get_test(test_id).await? else {
            return Ok(AccessDecision::deny("Mock test not found"));
        };

        if test.is_free || !self.gate_premium_tests {
            return Ok(AccessDecision::allow());
        }

        tracing::info!(user_id, %test_id, "access denied to premium mock test");
        Ok(AccessDecision::deny(
            "This mock test requires an active subscription",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::section::Section;
    use crate::models::test::MockTest;
    use crate::services::fixtures::Fixture;

    fn premium_test(fx: &Fixture) -> MockTest {
        let test = MockTest {
            id: Uuid::new_v4(),
            is_free: false,
            test_number: 2,
            ..fx.test.clone()
        };
        fx.store.insert_test(test.clone()).unwrap();
        test
    }

    #[tokio::test]
    async fn free_test_is_open() {
        let fx = Fixture::new(&[Section::Speaking], 60);
        let decision = AccessService::new(fx.storage(), true)
            .check_access("user-1", fx.test.id)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::allow());
    }

    #[tokio::test]
    async fn missing_test_is_denied_with_reason() {
        let fx = Fixture::new(&[Section::Speaking], 60);
        let decision = AccessService::new(fx.storage(), false)
            .check_access("user-1", Uuid::new_v4())
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn premium_test_follows_gate_setting() {
        let fx = Fixture::new(&[Section::Speaking], 60);
        let premium = premium_test(&fx);

        let open = AccessService::new(fx.storage(), false)
            .check_access("user-1", premium.id)
            .await
            .unwrap();
        assert!(open.allowed);

        let gated = AccessService::new(fx.storage(), true)
            .check_access("user-1", premium.id)
            .await
            .unwrap();
        assert!(!gated.allowed);
        assert!(gated.reason.unwrap().contains("subscription"));
    }
}
