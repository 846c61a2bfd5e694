//! Property-tax roll lookups.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::amount::Amount;

/// Which identifier the citizen typed.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaxSearchKind {
  /// Cadastral parcel number.
  Parcel,
  /// Numéro d'Identification Fiscale.
  Nif,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRecord {
  pub record_id:      Uuid,
  pub parcel_number:  String,
  pub nif:            String,
  pub owner_name:     String,
  pub address:        Option<String>,
  pub assessed_value: Amount,
  pub amount_due:     Amount,
  pub fiscal_year:    i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaxRecord {
  pub parcel_number:  String,
  pub nif:            String,
  pub owner_name:     String,
  pub address:        Option<String>,
  pub assessed_value: Amount,
  pub amount_due:     Amount,
  pub fiscal_year:    i32,
}

/// Canonical form used for NIF comparison: digits and letters only.
pub fn normalize_nif(nif: &str) -> String {
  nif
    .chars()
    .filter(char::is_ascii_alphanumeric)
    .collect::<String>()
    .to_ascii_uppercase()
}

/// Sample record served in local mode when nothing matches.
pub fn sample_record(kind: TaxSearchKind, query: &str) -> TaxRecord {
  let (parcel_number, nif) = match kind {
    TaxSearchKind::Parcel => (query.to_owned(), "000-000-000-0".to_owned()),
    TaxSearchKind::Nif => ("DEMO-0001".to_owned(), query.to_owned()),
  };
  TaxRecord {
    record_id: Uuid::nil(),
    parcel_number,
    nif,
    owner_name: "Sample Owner".to_owned(),
    address: Some("1 Rue de la Mairie".to_owned()),
    assessed_value: Amount::from_units(250_000),
    amount_due: Amount::from_units(2_500),
    fiscal_year: 2025,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nif_normalisation_ignores_separators() {
    assert_eq!(normalize_nif("003-124-567-8"), "0031245678");
    assert_eq!(normalize_nif(" 003 124 567 8 "), "0031245678");
  }

  #[test]
  fn search_kind_parses_lowercase() {
    assert_eq!("parcel".parse::<TaxSearchKind>().unwrap(), TaxSearchKind::Parcel);
    assert_eq!("nif".parse::<TaxSearchKind>().unwrap(), TaxSearchKind::Nif);
    assert!("owner".parse::<TaxSearchKind>().is_err());
  }

  #[test]
  fn sample_echoes_query() {
    let r = sample_record(TaxSearchKind::Parcel, "JAC-12-34");
    assert_eq!(r.parcel_number, "JAC-12-34");
  }
}
