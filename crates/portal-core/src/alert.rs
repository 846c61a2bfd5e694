//! Public events and emergency alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
  Info,
  Warning,
  Emergency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:  Uuid,
  pub tenant_id: Uuid,
  pub title:     String,
  pub body:      Option<String>,
  pub severity:  Severity,
  pub starts_at: DateTime<Utc>,
  pub ends_at:   Option<DateTime<Utc>>,
}

impl Event {
  /// An emergency whose window contains `now`.
  pub fn is_active_alert(&self, now: DateTime<Utc>) -> bool {
    self.severity == Severity::Emergency
      && self.starts_at <= now
      && self.ends_at.is_none_or(|end| now < end)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
  pub title:     String,
  pub body:      Option<String>,
  pub severity:  Severity,
  pub starts_at: Option<DateTime<Utc>>,
  pub ends_at:   Option<DateTime<Utc>>,
}

impl NewEvent {
  pub fn validated(self) -> Result<Self> {
    if self.title.trim().is_empty() {
      return Err(Error::validation("title", "must not be empty"));
    }
    if let (Some(start), Some(end)) = (self.starts_at, self.ends_at)
      && end <= start
    {
      return Err(Error::validation("ends_at", "must be after starts_at"));
    }
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn event(severity: Severity, ends_in: Option<i64>) -> Event {
    let now = Utc::now();
    Event {
      event_id: Uuid::new_v4(),
      tenant_id: Uuid::new_v4(),
      title: "Flood warning".into(),
      body: None,
      severity,
      starts_at: now - Duration::hours(1),
      ends_at: ends_in.map(|h| now + Duration::hours(h)),
    }
  }

  #[test]
  fn only_current_emergencies_are_alerts() {
    let now = Utc::now();
    assert!(event(Severity::Emergency, None).is_active_alert(now));
    assert!(event(Severity::Emergency, Some(2)).is_active_alert(now));
    assert!(!event(Severity::Emergency, Some(-1)).is_active_alert(now));
    assert!(!event(Severity::Warning, None).is_active_alert(now));
  }
}
