// ============================================================================
// Structure : Account
// ============================================================================
// Un compte tel que renvoyé par le service de comptes (GET /comptes)
//
// Le serveur est propriétaire des données : le client ne fait que les lire
// et les formater pour l'affichage.
//
// CONCEPTS RUST :
// 1. #[serde(rename = "...")] : les champs JSON sont en français/camelCase
// 2. Option<T> : champs nullables côté serveur
// 3. #[serde(untagged)] : id et dateCreation peuvent être une chaîne ou un nombre
// ============================================================================

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Libellé affiché quand une valeur est absente
pub const MISSING_LABEL: &str = "N/A";

/// Libellé affiché quand la date de création ne peut pas être interprétée
pub const INVALID_DATE_LABEL: &str = "Date invalide";

/// Identifiant d'un compte : entier (clé JPA) ou chaîne (UUID, code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountId {
    Number(i64),
    Text(String),
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountId::Number(n) => write!(f, "{}", n),
            AccountId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        AccountId::Number(id)
    }
}

/// Date de création telle qu'envoyée par le backend
///
/// CONCEPT : Untagged enum
/// - Serde essaie chaque variant dans l'ordre
/// - Un nombre devient Timestamp (millisecondes epoch)
/// - Une chaîne devient Text ("2024-01-02", "2024-01-02T10:00:00", RFC 3339)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreationDate {
    Timestamp(i64),
    Text(String),
}

impl CreationDate {
    /// Convertit la valeur brute en date calendaire
    ///
    /// Les valeurs portant un fuseau (RFC 3339, epoch) sont ramenées à
    /// l'heure locale, les valeurs naïves sont prises telles quelles.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            CreationDate::Timestamp(millis) => DateTime::from_timestamp_millis(*millis)
                .map(|utc| utc.with_timezone(&Local).date_naive()),
            CreationDate::Text(raw) => parse_date_text(raw.trim()),
        }
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    // Offset sans ':' (ex: Jackson "2024-01-02T10:00:00.000+0000")
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Formate à deux décimales, les demis exacts arrondis vers la plus grande
/// valeur absolue (10.125 -> "10.13", -0.125 -> "-0.13")
///
/// CONCEPT : format! seul arrondit les demis au pair ("{:.2}" de 10.125
/// donne "10.12").
/// Un demi exact à deux décimales vaut j/8 avec j impair : la multiplication
/// par 8 est exacte en binaire, donc le test aussi.
pub fn format_two_decimals(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let eighths = magnitude * 8.0;

    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        // round() arrondit les demis en s'éloignant de zéro
        let cents = (magnitude * 100.0).round();
        format!("{}{}.{:02}", sign, (cents / 100.0).trunc(), (cents % 100.0) as u64)
    } else {
        format!("{}{:.2}", sign, magnitude)
    }
}

/// Un compte bancaire (lecture seule)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Identifiant unique, stable entre deux chargements (clé de ligne)
    pub id: AccountId,

    /// Solde du compte, peut être null côté serveur
    #[serde(rename = "solde", default)]
    pub balance: Option<f64>,

    /// Date de création
    #[serde(rename = "dateCreation", default)]
    pub creation_date: Option<CreationDate>,

    /// Type de compte (ex: "EPARGNE", "COURANT")
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

impl Account {
    /// Solde formaté à deux décimales, ou "N/A" si absent
    pub fn balance_label(&self) -> String {
        self.balance
            .map(format_two_decimals)
            .unwrap_or_else(|| MISSING_LABEL.to_string())
    }

    /// Date de création au format français JJ/MM/AAAA
    pub fn creation_date_label(&self) -> String {
        match &self.creation_date {
            None => MISSING_LABEL.to_string(),
            Some(raw) => raw
                .to_date()
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| INVALID_DATE_LABEL.to_string()),
        }
    }

    /// Type de compte, chaîne vide si absent
    pub fn type_label(&self) -> &str {
        self.account_type.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
