//! Access attempt evaluation.

use crate::error::AccessError;
use crate::model::{
    AccessAttempt, AccessDecision, AccessLogEntry, AccessOutcome, Credential, EnrolledFingerprint,
};
use crate::store::CredentialStore;
use nexus_biometric::{FingerprintTemplate, MatcherConfig, MinutiaeMatcher, TemplateExtractor};
use nexus_core::{Clock, EmployeeId, RoomId};
use rootcause::Report;
use rootcause::prelude::ResultExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Access evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Append a log entry with no employee when a credential matches nobody.
    #[serde(default = "default_log_unresolved_attempts")]
    pub log_unresolved_attempts: bool,
}

fn default_log_unresolved_attempts() -> bool {
    true
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            log_unresolved_attempts: default_log_unresolved_attempts(),
        }
    }
}

/// Decides access attempts and records them in the access log.
#[derive(Clone)]
pub struct AccessEvaluator {
    store: Arc<dyn CredentialStore>,
    extractor: Arc<dyn TemplateExtractor>,
    matcher: MinutiaeMatcher,
    clock: Arc<dyn Clock>,
    config: AccessConfig,
}

impl AccessEvaluator {
    /// Creates an evaluator over `store`, matching fingerprints with `matcher`.
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        extractor: Arc<dyn TemplateExtractor>,
        matcher: MatcherConfig,
        clock: Arc<dyn Clock>,
        config: AccessConfig,
    ) -> Self {
        Self {
            store,
            extractor,
            matcher: MinutiaeMatcher::new(matcher),
            clock,
            config,
        }
    }

    /// Evaluates one attempt.
    ///
    /// Every attempt that resolves to an employee appends exactly one log
    /// entry, granted or not. Unresolved attempts are logged without an
    /// employee when `log_unresolved_attempts` is set.
    ///
    /// # Errors
    ///
    /// - `MalformedAttempt` if the credential selected by the attempt kind
    ///   is absent
    /// - `RoomNotFound` if the room does not exist
    /// - `InvalidBiometricData` if the presented fingerprint cannot be parsed
    ///   or carries more minutiae than the matcher admits
    /// - `StoreFailed` if the store could not be read or the log not written
    /// - `MatchingFailed` if the fingerprint scan task was aborted
    ///
    /// None of the client errors write a log entry.
    #[instrument(skip(self, attempt), fields(room_id = %attempt.room_id, kind = %attempt.kind))]
    pub async fn evaluate(
        &self,
        attempt: AccessAttempt,
    ) -> Result<AccessDecision, Report<AccessError>> {
        let credential = attempt.credential().map_err(Report::from)?;

        let room_id = attempt.room_id;
        if self
            .store
            .find_room(room_id)
            .await
            .context(AccessError::StoreFailed)?
            .is_none()
        {
            debug!("Attempt names an unknown room");
            return Err(AccessError::RoomNotFound { room_id }.into());
        }

        let employee_id = match credential {
            Credential::Pin(pin) => self.identify_by_pin(pin).await?,
            Credential::Fingerprint(raw) => self.identify_by_fingerprint(raw).await?,
        };

        let Some(employee_id) = employee_id else {
            info!("Credential not recognized");
            if self.config.log_unresolved_attempts {
                self.record(None, room_id, false).await?;
            }
            return Ok(AccessDecision {
                outcome: AccessOutcome::Unrecognized,
                employee_id: None,
            });
        };

        let granted = self
            .store
            .has_room_access(employee_id, room_id)
            .await
            .context(AccessError::StoreFailed)?;
        self.record(Some(employee_id), room_id, granted).await?;

        let outcome = if granted {
            AccessOutcome::Granted
        } else {
            AccessOutcome::Forbidden
        };
        info!(employee_id = %employee_id, outcome = ?outcome, "Access attempt evaluated");

        Ok(AccessDecision {
            outcome,
            employee_id: Some(employee_id),
        })
    }

    /// A PIN identifies an employee only if exactly one employee holds it.
    async fn identify_by_pin(&self, pin: &str) -> Result<Option<EmployeeId>, Report<AccessError>> {
        let matches = self
            .store
            .find_employees_by_pin(pin)
            .await
            .context(AccessError::StoreFailed)?;
        match matches.as_slice() {
            [employee_id] => Ok(Some(*employee_id)),
            [] => Ok(None),
            shared => {
                warn!(holders = shared.len(), "PIN code shared by several employees");
                Ok(None)
            }
        }
    }

    /// First enrolled employee, in ascending id order, whose template
    /// matches the presented one.
    ///
    /// Extraction and scoring of the enrolled templates run on the blocking
    /// pool so a long scan does not hold a runtime worker.
    async fn identify_by_fingerprint(
        &self,
        raw: &[u8],
    ) -> Result<Option<EmployeeId>, Report<AccessError>> {
        let candidate = self
            .extractor
            .extract(raw)
            .context(AccessError::InvalidBiometricData)?;
        self.matcher
            .admit(&candidate)
            .context(AccessError::InvalidBiometricData)?;

        let enrolled = self
            .store
            .enrolled_fingerprints()
            .await
            .context(AccessError::StoreFailed)?;

        let extractor = Arc::clone(&self.extractor);
        let matcher = self.matcher.clone();
        tokio::task::spawn_blocking(move || {
            first_match(extractor.as_ref(), &matcher, &candidate, enrolled)
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Fingerprint scan did not complete");
            Report::from(AccessError::MatchingFailed)
        })
    }

    async fn record(
        &self,
        employee_id: Option<EmployeeId>,
        room_id: RoomId,
        access_granted: bool,
    ) -> Result<(), Report<AccessError>> {
        let entry = AccessLogEntry {
            employee_id,
            room_id,
            access_time: self.clock.now(),
            access_granted,
        };
        self.store
            .append_access_log(&entry)
            .await
            .context(AccessError::StoreFailed)?;
        Ok(())
    }
}

fn first_match(
    extractor: &dyn TemplateExtractor,
    matcher: &MinutiaeMatcher,
    candidate: &FingerprintTemplate,
    enrolled: Vec<EnrolledFingerprint>,
) -> Option<EmployeeId> {
    for fingerprint in enrolled {
        let stored = match extractor.extract(&fingerprint.template) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(
                    employee_id = %fingerprint.employee_id,
                    error = %err,
                    "Skipping unreadable enrolled fingerprint"
                );
                continue;
            }
        };
        let score = matcher.score(candidate, &stored);
        if matcher.is_match(score) {
            debug!(
                employee_id = %fingerprint.employee_id,
                score = %score,
                "Fingerprint matched"
            );
            return Some(fingerprint.employee_id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::model::AttemptKind;
    use chrono::Utc;
    use nexus_biometric::{BiometricError, Minutia, MinutiaKind, MinutiaeRecordExtractor};
    use nexus_core::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ROOM: RoomId = RoomId::new(10);

    fn evaluator_with(store: Arc<InMemoryStore>, config: AccessConfig) -> AccessEvaluator {
        AccessEvaluator::new(
            store,
            Arc::new(MinutiaeRecordExtractor),
            MatcherConfig::default(),
            Arc::new(ManualClock::new(Utc::now())),
            config,
        )
    }

    fn evaluator(store: Arc<InMemoryStore>) -> AccessEvaluator {
        evaluator_with(store, AccessConfig::default())
    }

    fn seeded() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store.add_employee(EmployeeId::new(1), "Ada", Some("1234"), None);
        store.add_room(ROOM, "Lab", "Clean room");
        store
    }

    fn template(offset: u16) -> Vec<u8> {
        let minutiae = (0..12u16)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    MinutiaKind::RidgeEnding
                } else {
                    MinutiaKind::Bifurcation
                };
                Minutia::new(
                    20 + offset + (i * 37) % 200,
                    30 + (i * 53) % 180,
                    (i * 30) % 360,
                    kind,
                )
            })
            .collect();
        FingerprintTemplate::new(300, 300, minutiae)
            .expect("valid template")
            .to_record_bytes()
    }

    fn other_template() -> Vec<u8> {
        let minutiae = vec![
            Minutia::new(5, 290, 90, MinutiaKind::Other),
            Minutia::new(290, 5, 270, MinutiaKind::Other),
        ];
        FingerprintTemplate::new(300, 300, minutiae)
            .expect("valid template")
            .to_record_bytes()
    }

    #[tokio::test]
    async fn known_pin_without_grant_is_forbidden_and_logged() {
        let store = seeded();
        let decision = evaluator(store.clone())
            .evaluate(AccessAttempt::pin(ROOM, "1234"))
            .await
            .expect("decision");

        assert_eq!(decision.outcome, AccessOutcome::Forbidden);
        assert_eq!(decision.employee_id, Some(EmployeeId::new(1)));

        let logs = store.access_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].entry.employee_id, Some(EmployeeId::new(1)));
        assert_eq!(logs[0].entry.room_id, ROOM);
        assert!(!logs[0].entry.access_granted);
    }

    #[tokio::test]
    async fn known_pin_with_grant_is_granted_and_logged() {
        let store = seeded();
        store.grant_room_access(EmployeeId::new(1), ROOM);

        let decision = evaluator(store.clone())
            .evaluate(AccessAttempt::pin(ROOM, "1234"))
            .await
            .expect("decision");

        assert!(decision.granted());
        let logs = store.access_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].entry.access_granted);
    }

    #[tokio::test]
    async fn log_timestamp_comes_from_clock() {
        let store = seeded();
        let now = Utc::now();
        let evaluator = AccessEvaluator::new(
            store.clone(),
            Arc::new(MinutiaeRecordExtractor),
            MatcherConfig::default(),
            Arc::new(ManualClock::new(now)),
            AccessConfig::default(),
        );

        evaluator
            .evaluate(AccessAttempt::pin(ROOM, "1234"))
            .await
            .expect("decision");
        assert_eq!(store.access_logs()[0].entry.access_time, now);
    }

    #[tokio::test]
    async fn unknown_room_is_an_error_without_log() {
        let store = seeded();
        let err = evaluator(store.clone())
            .evaluate(AccessAttempt::pin(RoomId::new(999), "1234"))
            .await
            .expect_err("unknown room");

        assert_eq!(
            err.current_context(),
            &AccessError::RoomNotFound {
                room_id: RoomId::new(999)
            }
        );
        assert!(store.access_logs().is_empty());
    }

    #[tokio::test]
    async fn attempt_without_credential_is_malformed_without_log() {
        let store = seeded();
        let attempt = AccessAttempt {
            room_id: ROOM,
            kind: AttemptKind::PinCode,
            pin_code: None,
            raw_fingerprint: None,
        };
        let err = evaluator(store.clone())
            .evaluate(attempt)
            .await
            .expect_err("malformed");

        assert!(matches!(
            err.current_context(),
            AccessError::MalformedAttempt { .. }
        ));
        assert!(store.access_logs().is_empty());
    }

    #[tokio::test]
    async fn repeated_attempts_are_each_logged() {
        let store = seeded();
        let evaluator = evaluator(store.clone());
        for _ in 0..2 {
            evaluator
                .evaluate(AccessAttempt::pin(ROOM, "1234"))
                .await
                .expect("decision");
        }
        assert_eq!(store.access_logs().len(), 2);
    }

    #[tokio::test]
    async fn unknown_pin_is_unrecognized_and_logged_without_employee() {
        let store = seeded();
        let decision = evaluator(store.clone())
            .evaluate(AccessAttempt::pin(ROOM, "0000"))
            .await
            .expect("decision");

        assert_eq!(decision.outcome, AccessOutcome::Unrecognized);
        assert_eq!(decision.employee_id, None);
        let logs = store.access_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].entry.employee_id, None);
        assert!(!logs[0].entry.access_granted);
    }

    #[tokio::test]
    async fn unresolved_logging_can_be_disabled() {
        let store = seeded();
        let config = AccessConfig {
            log_unresolved_attempts: false,
        };
        let decision = evaluator_with(store.clone(), config)
            .evaluate(AccessAttempt::pin(ROOM, "0000"))
            .await
            .expect("decision");

        assert_eq!(decision.outcome, AccessOutcome::Unrecognized);
        assert!(store.access_logs().is_empty());
    }

    #[tokio::test]
    async fn shared_pin_is_unrecognized() {
        let store = seeded();
        store.add_employee(EmployeeId::new(2), "Grace", Some("1234"), None);
        store.grant_room_access(EmployeeId::new(1), ROOM);

        let decision = evaluator(store.clone())
            .evaluate(AccessAttempt::pin(ROOM, "1234"))
            .await
            .expect("decision");

        assert_eq!(decision.outcome, AccessOutcome::Unrecognized);
    }

    #[tokio::test]
    async fn pin_match_is_exact() {
        let store = seeded();
        let decision = evaluator(store)
            .evaluate(AccessAttempt::pin(ROOM, "1234 "))
            .await
            .expect("decision");
        assert_eq!(decision.outcome, AccessOutcome::Unrecognized);
    }

    #[tokio::test]
    async fn matching_fingerprint_is_granted() {
        let store = seeded();
        store.add_employee(EmployeeId::new(2), "Grace", None, Some(template(0)));
        store.grant_room_access(EmployeeId::new(2), ROOM);

        let decision = evaluator(store.clone())
            .evaluate(AccessAttempt::fingerprint(ROOM, template(4)))
            .await
            .expect("decision");

        assert_eq!(decision.outcome, AccessOutcome::Granted);
        assert_eq!(decision.employee_id, Some(EmployeeId::new(2)));
        assert_eq!(store.access_logs().len(), 1);
    }

    #[tokio::test]
    async fn first_matching_employee_wins() {
        let store = seeded();
        store.add_employee(EmployeeId::new(7), "Later", None, Some(template(0)));
        store.add_employee(EmployeeId::new(3), "Earlier", None, Some(template(0)));

        let decision = evaluator(store)
            .evaluate(AccessAttempt::fingerprint(ROOM, template(0)))
            .await
            .expect("decision");

        assert_eq!(decision.employee_id, Some(EmployeeId::new(3)));
        assert_eq!(decision.outcome, AccessOutcome::Forbidden);
    }

    #[tokio::test]
    async fn unmatched_fingerprint_is_unrecognized() {
        let store = seeded();
        store.add_employee(EmployeeId::new(2), "Grace", None, Some(other_template()));

        let decision = evaluator(store.clone())
            .evaluate(AccessAttempt::fingerprint(ROOM, template(0)))
            .await
            .expect("decision");

        assert_eq!(decision.outcome, AccessOutcome::Unrecognized);
        assert_eq!(store.access_logs().len(), 1);
    }

    #[tokio::test]
    async fn unreadable_enrolled_template_is_skipped() {
        let store = seeded();
        store.add_employee(EmployeeId::new(2), "Broken", None, Some(vec![0xde, 0xad]));
        store.add_employee(EmployeeId::new(3), "Grace", None, Some(template(0)));

        let decision = evaluator(store)
            .evaluate(AccessAttempt::fingerprint(ROOM, template(0)))
            .await
            .expect("decision");

        assert_eq!(decision.employee_id, Some(EmployeeId::new(3)));
    }

    #[tokio::test]
    async fn invalid_fingerprint_data_is_an_error_without_log() {
        let store = seeded();
        let err = evaluator(store.clone())
            .evaluate(AccessAttempt::fingerprint(ROOM, b"not a template".to_vec()))
            .await
            .expect_err("invalid data");

        assert_eq!(err.current_context(), &AccessError::InvalidBiometricData);
        assert!(store.access_logs().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let store = seeded();
        store.set_unavailable(true);

        let err = evaluator(store.clone())
            .evaluate(AccessAttempt::pin(ROOM, "1234"))
            .await
            .expect_err("store failure");

        assert_eq!(err.current_context(), &AccessError::StoreFailed);
        store.set_unavailable(false);
        assert!(store.access_logs().is_empty());
    }

    #[tokio::test]
    async fn oversized_fingerprint_is_rejected_without_log() {
        let store = seeded();
        store.add_employee(EmployeeId::new(2), "Grace", None, Some(template(0)));
        let minutiae = (0..200u16)
            .map(|i| Minutia::new(i, i, 0, MinutiaKind::RidgeEnding))
            .collect();
        let raw = FingerprintTemplate::new(300, 300, minutiae)
            .expect("valid template")
            .to_record_bytes();

        let err = evaluator(store.clone())
            .evaluate(AccessAttempt::fingerprint(ROOM, raw))
            .await
            .expect_err("oversized template");

        assert_eq!(err.current_context(), &AccessError::InvalidBiometricData);
        assert!(store.access_logs().is_empty());
    }

    /// Sleeps on every extraction after the first, which is the presented
    /// template.
    #[derive(Default)]
    struct SlowExtractor {
        calls: AtomicUsize,
    }

    impl TemplateExtractor for SlowExtractor {
        fn extract(&self, raw: &[u8]) -> Result<FingerprintTemplate, Report<BiometricError>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                std::thread::sleep(Duration::from_millis(200));
            }
            MinutiaeRecordExtractor.extract(raw)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn pin_attempt_completes_during_fingerprint_scan() {
        let store = seeded();
        for id in 2..7 {
            store.add_employee(EmployeeId::new(id), "Enrolled", None, Some(other_template()));
        }
        let evaluator = AccessEvaluator::new(
            store.clone(),
            Arc::new(SlowExtractor::default()),
            MatcherConfig::default(),
            Arc::new(ManualClock::new(Utc::now())),
            AccessConfig::default(),
        );

        let scan = tokio::spawn({
            let evaluator = evaluator.clone();
            async move {
                evaluator
                    .evaluate(AccessAttempt::fingerprint(ROOM, template(0)))
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let pin = tokio::spawn({
            let evaluator = evaluator.clone();
            async move { evaluator.evaluate(AccessAttempt::pin(ROOM, "1234")).await }
        });
        let decision = tokio::time::timeout(Duration::from_millis(500), pin)
            .await
            .expect("PIN attempt finished while the scan was running")
            .expect("task")
            .expect("decision");
        assert_eq!(decision.outcome, AccessOutcome::Forbidden);
        assert!(!scan.is_finished());

        let decision = scan.await.expect("task").expect("decision");
        assert_eq!(decision.outcome, AccessOutcome::Unrecognized);
        assert_eq!(store.access_logs().len(), 2);
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let config: AccessConfig = serde_json::from_str("{}").expect("config");
        assert!(config.log_unresolved_attempts);
    }
}
