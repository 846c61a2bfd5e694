//! Open311-style services and service requests.
//!
//! A service request is a citizen report ("issue"). Submission is idempotent
//! per tenant: the idempotency key identifies the submission, and a repeat
//! returns the row created the first time.

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
pub enum RequestStatus {
  Open,
  Acknowledged,
  Closed,
}

impl RequestStatus {
  /// Staff may move a request freely until it is closed.
  pub fn check_transition(self, to: Self) -> Result<()> {
    match self {
      Self::Closed if to != Self::Closed => Err(Error::transition(self, to)),
      _ => Ok(()),
    }
  }
}

/// A category of issue a tenant accepts (pothole, streetlight, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
  pub service_id:   Uuid,
  pub tenant_id:    Uuid,
  pub service_code: String,
  pub service_name: String,
  pub description:  Option<String>,
  pub group:        Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
  pub service_code: String,
  pub service_name: String,
  pub description:  Option<String>,
  pub group:        Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub lat:     Option<f64>,
  pub long:    Option<f64>,
  pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub email:      Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub phone:      Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
  pub request_id:      Uuid,
  pub tenant_id:       Uuid,
  pub service_code:    String,
  pub description:     String,
  pub location:        Location,
  pub contact:         Contact,
  pub status:          RequestStatus,
  pub status_notes:    Option<String>,
  pub idempotency_key: String,
  pub requested_at:    DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceRequest {
  pub service_code:    String,
  pub description:     String,
  #[serde(flatten)]
  pub location:        Location,
  #[serde(flatten)]
  pub contact:         Contact,
  pub idempotency_key: String,
}

impl NewServiceRequest {
  pub fn validated(mut self) -> Result<Self> {
    self.service_code = self.service_code.trim().to_owned();
    self.idempotency_key = self.idempotency_key.trim().to_owned();
    if self.service_code.is_empty() {
      return Err(Error::validation("service_code", "must not be empty"));
    }
    if self.description.trim().is_empty() {
      return Err(Error::validation("description", "must not be empty"));
    }
    if self.idempotency_key.is_empty() {
      return Err(Error::validation("idempotency_key", "must not be empty"));
    }
    if let Some(lat) = self.location.lat
      && !(-90.0..=90.0).contains(&lat)
    {
      return Err(Error::validation("lat", "out of range"));
    }
    if let Some(long) = self.location.long
      && !(-180.0..=180.0).contains(&long)
    {
      return Err(Error::validation("long", "out of range"));
    }
    Ok(self)
  }
}

/// Outcome of an idempotent submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
  pub request: ServiceRequest,
  /// `false` when the idempotency key had already been used.
  pub created: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_request() -> NewServiceRequest {
    NewServiceRequest {
      service_code:    "pothole".into(),
      description:     "Large hole near the market".into(),
      location:        Location::default(),
      contact:         Contact::default(),
      idempotency_key: "key-1".into(),
    }
  }

  #[test]
  fn closed_is_terminal() {
    use RequestStatus::*;
    assert!(Open.check_transition(Acknowledged).is_ok());
    assert!(Acknowledged.check_transition(Open).is_ok());
    assert!(Acknowledged.check_transition(Closed).is_ok());
    assert!(Closed.check_transition(Open).is_err());
  }

  #[test]
  fn validation_rejects_blank_fields() {
    let mut r = new_request();
    r.description = "   ".into();
    assert!(r.validated().is_err());

    let mut r = new_request();
    r.idempotency_key = "".into();
    assert!(r.validated().is_err());
  }

  #[test]
  fn validation_checks_coordinates() {
    let mut r = new_request();
    r.location.lat = Some(18.23);
    r.location.long = Some(-72.53);
    assert!(r.clone().validated().is_ok());

    r.location.lat = Some(120.0);
    assert!(r.validated().is_err());
  }
}
