use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{InvalidEventReason, Result};

/// Closed set of things the resolver can report about a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Hit,
    Miss,
    ResolverChange,
    JitterDetected,
    BreakerDetected,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Hit,
        EventKind::Miss,
        EventKind::ResolverChange,
        EventKind::JitterDetected,
        EventKind::BreakerDetected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Hit => "hit",
            EventKind::Miss => "miss",
            EventKind::ResolverChange => "resolver_change",
            EventKind::JitterDetected => "jitter_detected",
            EventKind::BreakerDetected => "breaker_detected",
        }
    }

    /// Only shot outcomes may report the angle the resolver predicted.
    pub fn carries_angle(self) -> bool {
        matches!(self, EventKind::Hit | EventKind::Miss)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = InvalidEventReason;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| InvalidEventReason::UnknownKind(value.to_string()))
    }
}

/// Event record as handed over by the instrumentation layer, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// Milliseconds since the Unix epoch. Missing timestamps are stamped on arrival.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(alias = "player")]
    pub subject: String,
    #[serde(default, alias = "details")]
    pub detail: String,
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub side: Option<i8>,
    #[serde(default)]
    pub resolve_type: Option<String>,
}

impl RawEvent {
    pub fn new(kind: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn angle(mut self, degrees: f64) -> Self {
        self.angle = Some(degrees);
        self
    }

    pub fn side(mut self, side: i8) -> Self {
        self.side = Some(side);
        self
    }

    pub fn resolve_type(mut self, resolve_type: impl Into<String>) -> Self {
        self.resolve_type = Some(resolve_type.into());
        self
    }
}

/// Validated, immutable resolver event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverEvent {
    pub id: Uuid,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub subject: String,
    pub detail: String,
    pub angle: Option<f64>,
    pub side: Option<i8>,
    /// New classification mode; only ever set on `ResolverChange` events.
    pub resolve_type: Option<String>,
}

impl ResolverEvent {
    /// Checks a raw record against the event model and assigns it a fresh id.
    pub fn validate(raw: RawEvent) -> Result<Self> {
        let kind: EventKind = raw.kind.parse()?;
        let subject = raw.subject.trim();
        if subject.is_empty() {
            return Err(InvalidEventReason::EmptySubject.into());
        }
        let subject = subject.to_string();
        if let Some(angle) = raw.angle {
            if !kind.carries_angle() {
                return Err(InvalidEventReason::UnexpectedAngle(kind).into());
            }
            if !angle.is_finite() {
                return Err(InvalidEventReason::NonFiniteAngle.into());
            }
        }

        let resolve_type = match kind {
            EventKind::ResolverChange => raw
                .resolve_type
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| extract_resolve_type(&raw.detail)),
            _ => None,
        };

        Ok(Self {
            id: Uuid::new_v4(),
            timestamp: raw.timestamp.unwrap_or_else(Utc::now),
            kind,
            subject,
            detail: raw.detail,
            angle: raw.angle,
            side: raw.side,
            resolve_type,
        })
    }

    /// Relative age such as `"42s ago"` or `"3m ago"`.
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let seconds = (now - self.timestamp).num_seconds().max(0);
        if seconds < 60 {
            format!("{seconds}s ago")
        } else {
            format!("{}m ago", seconds / 60)
        }
    }
}

/// Pulls a resolve mode out of free text like "Switching to BRUTE mode" or
/// "ANIM resolve". Mode phrases win over resolve phrases.
pub fn extract_resolve_type(detail: &str) -> Option<String> {
    let tokens: Vec<&str> = detail
        .split(|c: char| c.is_whitespace() || c == '•')
        .filter(|token| !token.is_empty())
        .collect();

    let find_before = |marker: &str| {
        tokens
            .windows(2)
            .find(|pair| pair[1].eq_ignore_ascii_case(marker) && is_mode_token(pair[0]))
            .map(|pair| pair[0].to_ascii_uppercase())
    };

    find_before("mode").or_else(|| find_before("resolve"))
}

fn is_mode_token(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !token.eq_ignore_ascii_case("to")
}
