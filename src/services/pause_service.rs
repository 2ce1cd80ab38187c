use uuid::Uuid;

use crate::database::store::Storage;
use crate::error::{Error, Result};
use crate::models::test_attempt::{AttemptStatus, TestAttempt, TestAttemptUpdate};
use crate::services::session_service::SessionService;

/// Pausing is only allowed on the last question of a section and at most
/// `max_pauses` times per attempt.
#[derive(Clone)]
pub struct PauseService {
    storage: Storage,
    session_service: SessionService,
    max_pauses: i32,
}

impl PauseService {
    pub fn new(storage: Storage, max_pauses: i32) -> Self {
        Self {
            session_service: SessionService::new(storage.clone()),
            storage,
            max_pauses,
        }
    }

    pub fn max_pauses(&self) -> i32 {
        self.max_pauses
    }

    /// Freezes the countdown, banking the seconds left in
    /// `time_remaining_seconds`. Only a running attempt can be paused.
    pub async fn pause(&self, attempt_id: Uuid) -> Result<TestAttempt> {
        let session = self.session_service.compose(attempt_id).await?;
        session.ensure_in_progress()?;

        if session.pause_count >= self.max_pauses {
            tracing::warn!(
                %attempt_id,
                pause_count = session.pause_count,
                max = self.max_pauses,
                "pause rejected: limit reached"
            );
            return Err(Error::PauseLimitReached {
                max: self.max_pauses,
            });
        }

        if !session.is_at_section_boundary() {
            tracing::warn!(
                %attempt_id,
                index = session.current_question_index,
                section = %session.current_section,
                "pause rejected: not at a section boundary"
            );
            return Err(Error::NotAtSectionBoundary);
        }

        let paused = self
            .storage
            .exams
            .update_attempt(
                attempt_id,
                TestAttemptUpdate {
                    status: Some(AttemptStatus::Paused),
                    pause_count: Some(session.pause_count + 1),
                    time_remaining_seconds: Some(session.time_remaining_seconds),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(
            %attempt_id,
            pause_count = paused.pause_count,
            time_remaining_seconds = paused.time_remaining_seconds,
            section = %paused.current_section,
            "mock test attempt paused"
        );
        Ok(paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_PAUSES;
    use crate::database::store::ExamStore;
    use crate::models::section::Section;
    use crate::services::attempt_service::AttemptService;
    use crate::services::fixtures::Fixture;

    async fn move_to(fx: &Fixture, attempt_id: Uuid, index: i32) {
        fx.store
            .update_attempt(
                attempt_id,
                TestAttemptUpdate {
                    current_question_index: Some(index),
                    current_section: Some(fx.questions[index as usize].section),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pauses_only_at_the_end_of_a_section() {
        let fx = Fixture::new(&[Section::Speaking, Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        let svc = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES);

        let err = svc.pause(attempt.id).await.unwrap_err();
        assert!(matches!(err, Error::NotAtSectionBoundary));
        let untouched = fx.store.get_attempt(attempt.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, AttemptStatus::InProgress);
        assert_eq!(untouched.pause_count, 0);

        move_to(&fx, attempt.id, 1).await;
        let paused = svc.pause(attempt.id).await.unwrap();
        assert_eq!(paused.status, AttemptStatus::Paused);
        assert_eq!(paused.pause_count, 1);
    }

    #[tokio::test]
    async fn last_question_of_the_test_is_a_boundary() {
        let fx = Fixture::new(&[Section::Reading, Section::Listening], 60);
        let attempt = fx.start("user-1").await;
        move_to(&fx, attempt.id, 1).await;

        let paused = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES)
            .pause(attempt.id)
            .await
            .unwrap();
        assert_eq!(paused.pause_count, 1);
    }

    #[tokio::test]
    async fn third_pause_hits_the_limit() {
        let fx = Fixture::new(&[Section::Speaking, Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        move_to(&fx, attempt.id, 1).await;
        let svc = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES);

        let attempts = AttemptService::new(fx.storage());

        svc.pause(attempt.id).await.unwrap();
        attempts.resume(attempt.id).await.unwrap();
        let second = svc.pause(attempt.id).await.unwrap();
        assert_eq!(second.pause_count, 2);
        attempts.resume(attempt.id).await.unwrap();

        let err = svc.pause(attempt.id).await.unwrap_err();
        assert!(matches!(err, Error::PauseLimitReached { max: 2 }));
        let stored = fx.store.get_attempt(attempt.id).await.unwrap().unwrap();
        assert_eq!(stored.pause_count, 2);
    }

    #[tokio::test]
    async fn repeated_pause_does_not_spend_another_pause() {
        let fx = Fixture::new(&[Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        let svc = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES);

        svc.pause(attempt.id).await.unwrap();
        let err = svc.pause(attempt.id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));

        let stored = fx.store.get_attempt(attempt.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AttemptStatus::Paused);
        assert_eq!(stored.pause_count, 1);
    }

    #[tokio::test]
    async fn pause_banks_the_remaining_time() {
        let fx = Fixture::new(&[Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        fx.store
            .update_attempt(
                attempt.id,
                TestAttemptUpdate {
                    resumed_at: Some(chrono::Utc::now() - chrono::Duration::minutes(15)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let paused = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES)
            .pause(attempt.id)
            .await
            .unwrap();
        assert!(paused.time_remaining_seconds <= 45 * 60);
        assert!(paused.time_remaining_seconds > 45 * 60 - 5);
    }

    #[tokio::test]
    async fn limit_is_checked_before_position() {
        let fx = Fixture::new(&[Section::Speaking, Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        fx.store
            .update_attempt(
                attempt.id,
                TestAttemptUpdate {
                    pause_count: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES)
            .pause(attempt.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PauseLimitReached { .. }));
    }

    #[tokio::test]
    async fn limit_follows_configuration() {
        let fx = Fixture::new(&[Section::Speaking, Section::Writing], 60);
        let attempt = fx.start("user-1").await;
        let svc = PauseService::new(fx.storage(), 0);
        assert_eq!(svc.max_pauses(), 0);

        let err = svc.pause(attempt.id).await.unwrap_err();
        assert!(matches!(err, Error::PauseLimitReached { max: 0 }));
    }

    #[tokio::test]
    async fn completed_attempt_cannot_pause() {
        let fx = Fixture::new(&[Section::Speaking], 60);
        let attempt = fx.start("user-1").await;
        AttemptService::new(fx.storage())
            .complete(attempt.id)
            .await
            .unwrap();

        let err = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES)
            .pause(attempt.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_attempt_is_not_found() {
        let fx = Fixture::new(&[Section::Speaking], 60);
        let err = PauseService::new(fx.storage(), DEFAULT_MAX_PAUSES)
            .pause(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
