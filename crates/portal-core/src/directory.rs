//! Reference and directory data: communal sections, officials, facilities,
//! handbook articles and citizen facility suggestions.
//!
//! Everything here is tenant-scoped and follows a plain create/read/update
//! lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Communal sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunalSection {
  pub section_id: Uuid,
  pub tenant_id:  Uuid,
  pub name:       String,
  pub code:       String,
  pub population: Option<u32>,
  pub area_km2:   Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCommunalSection {
  pub name:       String,
  pub code:       String,
  pub population: Option<u32>,
  pub area_km2:   Option<f64>,
}

// ─── Officials ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Office {
  Mayor,
  DeputyMayor,
  Council,
  /// Conseil d'Administration de la Section Communale.
  Casec,
  /// Assemblée de la Section Communale.
  Asec,
  Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Official {
  pub official_id:   Uuid,
  pub tenant_id:     Uuid,
  pub name:          String,
  pub title:         String,
  pub office:        Office,
  pub section_id:    Option<Uuid>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub photo_url:     Option<String>,
  pub display_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOfficial {
  pub name:          String,
  pub title:         String,
  pub office:        Office,
  pub section_id:    Option<Uuid>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub photo_url:     Option<String>,
  #[serde(default)]
  pub display_order: i32,
}

// ─── Facilities ──────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FacilityStatus {
  Operational,
  LimitedServices,
  Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
  pub facility_id: Uuid,
  pub tenant_id:   Uuid,
  pub name:        String,
  pub category:    String,
  pub address:     Option<String>,
  pub lat:         Option<f64>,
  pub long:        Option<f64>,
  pub section_id:  Option<Uuid>,
  pub phone:       Option<String>,
  pub status:      FacilityStatus,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFacility {
  pub name:       String,
  pub category:   String,
  pub address:    Option<String>,
  pub lat:        Option<f64>,
  pub long:       Option<f64>,
  pub section_id: Option<Uuid>,
  pub phone:      Option<String>,
  pub status:     Option<FacilityStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacilityFilter {
  pub status:   Option<FacilityStatus>,
  pub category: Option<String>,
}

// ─── Handbook ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandbookArticle {
  pub article_id: Uuid,
  pub tenant_id:  Uuid,
  pub slug:       String,
  pub title:      String,
  pub category:   Option<String>,
  pub body:       String,
  pub published:  bool,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHandbookArticle {
  pub slug:      String,
  pub title:     String,
  pub category:  Option<String>,
  pub body:      String,
  #[serde(default)]
  pub published: bool,
}

impl NewHandbookArticle {
  pub fn validated(mut self) -> Result<Self> {
    self.slug = self.slug.trim().to_ascii_lowercase();
    if self.slug.is_empty()
      || !self.slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
      return Err(Error::validation("slug", "lowercase letters, digits and dashes only"));
    }
    if self.title.trim().is_empty() {
      return Err(Error::validation("title", "must not be empty"));
    }
    Ok(self)
  }
}

// ─── Facility suggestions ────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SuggestionStatus {
  Pending,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySuggestion {
  pub suggestion_id:   Uuid,
  pub tenant_id:       Uuid,
  pub name:            String,
  pub category:        String,
  pub address:         Option<String>,
  pub lat:             Option<f64>,
  pub long:            Option<f64>,
  pub submitter_email: Option<String>,
  pub status:          SuggestionStatus,
  /// Set when an approval created a facility.
  pub facility_id:     Option<Uuid>,
  pub created_at:      DateTime<Utc>,
  pub reviewed_at:     Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFacilitySuggestion {
  pub name:            String,
  pub category:        String,
  pub address:         Option<String>,
  pub lat:             Option<f64>,
  pub long:            Option<f64>,
  pub submitter_email: Option<String>,
}

impl NewFacilitySuggestion {
  pub fn validated(self) -> Result<Self> {
    if self.name.trim().is_empty() {
      return Err(Error::validation("name", "must not be empty"));
    }
    if self.category.trim().is_empty() {
      return Err(Error::validation("category", "must not be empty"));
    }
    Ok(self)
  }
}

/// What an admin decided about a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionDecision {
  Approve,
  Reject,
}
