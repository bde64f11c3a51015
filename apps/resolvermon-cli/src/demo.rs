use chrono::{DateTime, Duration, Utc};
use resolvermon_types::{
    events::RawEvent,
    subject::{RESOLVE_ANIM, RESOLVE_BRUTE},
};

struct Profile {
    name: &'static str,
    hits: u32,
    misses: u32,
    mode: &'static str,
    angle: f64,
    jitter: bool,
    breaker: bool,
}

const PROFILES: [Profile; 3] = [
    Profile {
        name: "Enemy_01",
        hits: 11,
        misses: 3,
        mode: RESOLVE_ANIM,
        angle: 58.0,
        jitter: true,
        breaker: false,
    },
    Profile {
        name: "Enemy_02",
        hits: 8,
        misses: 6,
        mode: RESOLVE_BRUTE,
        angle: 35.0,
        jitter: false,
        breaker: true,
    },
    Profile {
        name: "Enemy_03",
        hits: 14,
        misses: 2,
        mode: RESOLVE_ANIM,
        angle: 43.0,
        jitter: true,
        breaker: false,
    },
];

/// Three-opponent session ending with a short live timeline just before `now`.
pub fn session(now: DateTime<Utc>) -> Vec<RawEvent> {
    let mut at = now - Duration::minutes(3);
    let mut events = Vec::new();
    let mut push = |event: RawEvent, events: &mut Vec<RawEvent>| {
        at += Duration::seconds(1);
        events.push(event.at(at));
    };

    for profile in &PROFILES {
        push(
            RawEvent::new("resolver_change", profile.name)
                .detail(format!("Switching to {} mode", profile.mode)),
            &mut events,
        );
        if profile.jitter {
            push(
                RawEvent::new("jitter_detected", profile.name)
                    .detail("Jitter detected • Stored side: +")
                    .side(1),
                &mut events,
            );
        }
        if profile.breaker {
            push(
                RawEvent::new("breaker_detected", profile.name)
                    .detail("Pitch breaker detected • Safe point ON"),
                &mut events,
            );
        }
        for shot in 0..profile.hits + profile.misses {
            let kind = if shot < profile.misses { "miss" } else { "hit" };
            push(
                RawEvent::new(kind, profile.name)
                    .detail(format!(
                        "{}° angle • {} resolve",
                        profile.angle, profile.mode
                    ))
                    .angle(profile.angle),
                &mut events,
            );
        }
    }

    let timeline = [
        (
            5_000,
            RawEvent::new("hit", "Enemy_01")
                .detail("Head shot • 58° angle • ANIM resolve")
                .angle(58.0),
        ),
        (
            4_500,
            RawEvent::new("jitter_detected", "Enemy_02")
                .detail("Jitter detected • Stored side: +")
                .side(1),
        ),
        (
            3_800,
            RawEvent::new("miss", "Enemy_02").detail("Miss resolver • Switching to BRUTE mode"),
        ),
        (
            3_000,
            RawEvent::new("hit", "Enemy_03")
                .detail("Body shot • 43° angle • ANIM resolve")
                .angle(43.0),
        ),
        (
            2_200,
            RawEvent::new("breaker_detected", "Enemy_01")
                .detail("Pitch breaker detected • Safe point ON"),
        ),
    ];
    events.extend(
        timeline
            .into_iter()
            .map(|(ago_ms, event)| event.at(now - Duration::milliseconds(ago_ms))),
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolvermon_engine::{Aggregator, QuerySurface};
    use resolvermon_types::config::EngineConfig;

    #[test]
    fn demo_session_reproduces_reference_totals() {
        let now = Utc::now();
        let mut agg = Aggregator::new(EngineConfig::default()).unwrap();
        for event in session(now) {
            agg.ingest(event).unwrap();
        }

        let global = agg.global_stats();
        assert_eq!(global.total_hits, 35);
        assert_eq!(global.total_misses, 12);
        assert_eq!(global.accuracy_percent, 74);

        let resolved: Vec<bool> = agg.player_stats().iter().map(|p| p.subject.resolved).collect();
        assert_eq!(resolved, vec![true, false, true]);

        let shares = agg.resolve_type_distribution();
        assert_eq!(shares[0].resolve_type, RESOLVE_ANIM);
        assert_eq!(shares[0].percent, 67);

        let newest = &agg.recent_events(1)[0];
        assert_eq!(newest.subject, "Enemy_01");
        assert_eq!(newest.age_label(now), "2s ago");
    }
}
