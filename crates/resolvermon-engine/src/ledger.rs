use std::collections::HashMap;

use resolvermon_types::{
    config::EngineConfig,
    events::{EventKind, ResolverEvent},
    subject::Subject,
};

/// Per-subject outcome history, kept in order of first appearance.
#[derive(Debug, Clone)]
pub struct SubjectLedger {
    min_samples: u64,
    resolved_threshold: f64,
    subjects: Vec<Subject>,
    index: HashMap<String, usize>,
}

impl SubjectLedger {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_samples: config.min_samples,
            resolved_threshold: config.resolved_threshold,
            subjects: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Applies one event to its subject, creating the subject on first sight.
    pub fn apply_event(&mut self, event: &ResolverEvent) -> &Subject {
        let slot = self.slot_for(&event.subject);
        let min_samples = self.min_samples;
        let threshold = self.resolved_threshold;
        let subject = &mut self.subjects[slot];

        match event.kind {
            EventKind::Hit => {
                subject.hits += 1;
                if event.angle.is_some() {
                    subject.last_angle = event.angle;
                }
            }
            EventKind::Miss => {
                subject.misses += 1;
                if event.angle.is_some() {
                    subject.last_angle = event.angle;
                }
            }
            EventKind::ResolverChange => {
                if let Some(mode) = &event.resolve_type {
                    subject.resolve_type = Some(mode.clone());
                }
            }
            // Detection flags are sticky for the whole session.
            EventKind::JitterDetected => subject.is_jitter = true,
            EventKind::BreakerDetected => subject.is_breaker = true,
        }
        if event.side.is_some() {
            subject.last_side = event.side;
        }

        subject.resolved = subject.total_shots() >= min_samples
            && subject
                .accuracy()
                .map_or(false, |ratio| ratio >= threshold);
        subject
    }

    pub fn get(&self, name: &str) -> Option<&Subject> {
        self.index.get(name).map(|&slot| &self.subjects[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Owned copy of every subject, in first-appearance order.
    pub fn snapshot(&self) -> Vec<Subject> {
        self.subjects.clone()
    }

    fn slot_for(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.index.get(name) {
            return slot;
        }
        let slot = self.subjects.len();
        self.subjects.push(Subject::new(name));
        self.index.insert(name.to_string(), slot);
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvermon_types::events::RawEvent;

    fn event(raw: RawEvent) -> ResolverEvent {
        ResolverEvent::validate(raw).expect("valid event")
    }

    fn ledger() -> SubjectLedger {
        SubjectLedger::new(&EngineConfig::default())
    }

    #[test]
    fn creates_subjects_lazily_in_arrival_order() {
        let mut ledger = ledger();
        ledger.apply_event(&event(RawEvent::new("hit", "Enemy_02")));
        ledger.apply_event(&event(RawEvent::new("miss", "Enemy_01")));
        ledger.apply_event(&event(RawEvent::new("hit", "Enemy_02")));

        let names: Vec<_> = ledger.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Enemy_02", "Enemy_01"]);
        assert_eq!(ledger.get("Enemy_02").unwrap().hits, 2);
        assert_eq!(ledger.get("Enemy_01").unwrap().misses, 1);
    }

    #[test]
    fn angle_only_moves_when_reported() {
        let mut ledger = ledger();
        ledger.apply_event(&event(RawEvent::new("hit", "Enemy_01").angle(58.0)));
        ledger.apply_event(&event(RawEvent::new("miss", "Enemy_01")));
        assert_eq!(ledger.get("Enemy_01").unwrap().last_angle, Some(58.0));
        ledger.apply_event(&event(RawEvent::new("miss", "Enemy_01").angle(-35.5)));
        assert_eq!(ledger.get("Enemy_01").unwrap().last_angle, Some(-35.5));
    }

    #[test]
    fn resolver_change_without_mode_is_a_noop() {
        let mut ledger = ledger();
        ledger.apply_event(&event(
            RawEvent::new("resolver_change", "Enemy_02").detail("Switching to BRUTE mode"),
        ));
        assert_eq!(
            ledger.get("Enemy_02").unwrap().resolve_type.as_deref(),
            Some("BRUTE")
        );
        let subject = ledger
            .apply_event(&event(
                RawEvent::new("resolver_change", "Enemy_02").detail("resolver reset"),
            ))
            .clone();
        assert_eq!(subject.resolve_type.as_deref(), Some("BRUTE"));
    }

    #[test]
    fn flags_are_sticky() {
        let mut ledger = ledger();
        ledger.apply_event(&event(RawEvent::new("jitter_detected", "Enemy_01").side(1)));
        ledger.apply_event(&event(RawEvent::new("breaker_detected", "Enemy_01")));
        for _ in 0..20 {
            ledger.apply_event(&event(RawEvent::new("hit", "Enemy_01")));
        }
        let subject = ledger.get("Enemy_01").unwrap();
        assert!(subject.is_jitter);
        assert!(subject.is_breaker);
        assert_eq!(subject.last_side, Some(1));
        assert!(subject.resolved);
    }

    #[test]
    fn resolved_requires_samples_and_ratio() {
        let mut ledger = ledger();
        for _ in 0..3 {
            ledger.apply_event(&event(RawEvent::new("hit", "Enemy_03")));
        }
        ledger.apply_event(&event(RawEvent::new("miss", "Enemy_03")));
        assert!(!ledger.get("Enemy_03").unwrap().resolved);

        ledger.apply_event(&event(RawEvent::new("hit", "Enemy_03")));
        assert!(ledger.get("Enemy_03").unwrap().resolved);

        ledger.apply_event(&event(RawEvent::new("miss", "Enemy_03")));
        ledger.apply_event(&event(RawEvent::new("miss", "Enemy_03")));
        // 4 hits of 7 shots falls below 0.7.
        assert!(!ledger.get("Enemy_03").unwrap().resolved);
    }

    #[test]
    fn ratio_equal_to_threshold_counts_as_resolved() {
        let mut ledger = ledger();
        for _ in 0..7 {
            ledger.apply_event(&event(RawEvent::new("hit", "Enemy_01")));
        }
        for _ in 0..3 {
            ledger.apply_event(&event(RawEvent::new("miss", "Enemy_01")));
        }
        // 7 of 10 sits exactly on the default 0.7.
        assert!(ledger.get("Enemy_01").unwrap().resolved);
    }

    #[test]
    fn threshold_bounds() {
        let mut lenient = SubjectLedger::new(&EngineConfig {
            min_samples: 1,
            resolved_threshold: 0.0,
            ..EngineConfig::default()
        });
        lenient.apply_event(&event(RawEvent::new("miss", "Enemy_02")));
        assert!(lenient.get("Enemy_02").unwrap().resolved);

        let mut strict = SubjectLedger::new(&EngineConfig {
            resolved_threshold: 1.0,
            ..EngineConfig::default()
        });
        for _ in 0..5 {
            strict.apply_event(&event(RawEvent::new("hit", "Enemy_03")));
        }
        assert!(strict.get("Enemy_03").unwrap().resolved);
        strict.apply_event(&event(RawEvent::new("miss", "Enemy_03")));
        assert!(!strict.get("Enemy_03").unwrap().resolved);
    }

    #[test]
    fn only_the_named_subject_changes() {
        let mut ledger = ledger();
        ledger.apply_event(&event(RawEvent::new("hit", "Enemy_01")));
        let before = ledger.get("Enemy_01").cloned();
        ledger.apply_event(&event(RawEvent::new("jitter_detected", "Enemy_02")));
        assert_eq!(ledger.get("Enemy_01").cloned(), before);
    }
}
