//! GSTIN validation against the public taxpayer registry.
//!
//! `validate_gst_online` never fails. A malformed GSTIN is rejected without a
//! lookup. A registry answer is reported as API-verified. Any transport
//! problem (timeout, refused connection, bad status, undecodable body, no
//! registry configured) degrades to format-only acceptance.

pub mod http;

pub use http::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::extraction::{
    clean_gst_number, gst_checksum_valid, gst_state_name, validate_gst_format,
};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No GST registry configured")]
    NotConfigured,

    #[error("Registry lookup timed out after {0}s")]
    Timeout(u64),

    #[error("Registry unreachable: {0}")]
    Connection(String),

    #[error("Registry returned HTTP {0}")]
    Status(u16),

    #[error("Registry response could not be decoded: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

/// Taxpayer record returned by a registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistryRecord {
    pub legal_name: Option<String>,
    pub trade_name: Option<String>,
    pub status: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub address: Option<String>,
}

impl RegistryRecord {
    /// Trade name when present, legal name otherwise.
    pub fn business_name(&self) -> Option<String> {
        self.trade_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.legal_name.clone())
    }

    /// Registrations without a status are taken as active.
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |s| s.trim().eq_ignore_ascii_case("active"))
    }
}

/// Registry lookup abstraction (allows mocking for tests)
pub trait GstRegistry: Send + Sync {
    /// `Ok(None)` means the registry answered and does not know the GSTIN.
    fn lookup(&self, gstin: &str) -> Result<Option<RegistryRecord>, RegistryError>;

    /// Whether lookups can ever reach a registry.
    fn is_online(&self) -> bool {
        true
    }
}

/// Registry used when no API key is configured: every lookup falls back.
pub struct OfflineRegistry;

impl GstRegistry for OfflineRegistry {
    fn lookup(&self, _gstin: &str) -> Result<Option<RegistryRecord>, RegistryError> {
        Err(RegistryError::NotConfigured)
    }

    fn is_online(&self) -> bool {
        false
    }
}

/// Outcome of checking the GSTIN on a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstValidation {
    /// `None` when no GSTIN was found on the bill.
    #[serde(default)]
    pub gst_number: Option<String>,
    pub valid: bool,
    #[serde(default)]
    pub format_valid: bool,
    pub api_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GstValidation {
    /// No GSTIN on the bill.
    pub fn not_found() -> Self {
        Self {
            gst_number: None,
            valid: false,
            format_valid: false,
            api_verified: false,
            business_name: None,
            status: None,
            registration_date: None,
            address: None,
            state: None,
            checksum_valid: None,
            error: Some("No GSTIN found on bill".to_string()),
        }
    }

    fn for_number(gstin: &str) -> Self {
        Self {
            gst_number: Some(gstin.to_string()),
            state: gst_state_name(gstin).map(str::to_string),
            checksum_valid: Some(gst_checksum_valid(gstin)),
            error: None,
            ..Self::not_found()
        }
    }

    fn format_invalid(gstin: &str) -> Self {
        Self {
            gst_number: Some(gstin.to_string()),
            error: Some("Invalid GSTIN format".to_string()),
            ..Self::not_found()
        }
    }

    fn format_only(gstin: &str) -> Self {
        Self {
            valid: true,
            format_valid: true,
            ..Self::for_number(gstin)
        }
    }

    fn unregistered(gstin: &str) -> Self {
        Self {
            format_valid: true,
            api_verified: true,
            error: Some("GSTIN not found in registry".to_string()),
            ..Self::for_number(gstin)
        }
    }

    fn verified(gstin: &str, record: RegistryRecord) -> Self {
        let valid = record.is_active();
        let error = (!valid).then(|| {
            format!(
                "GSTIN registration is {}",
                record.status.as_deref().unwrap_or("inactive")
            )
        });
        Self {
            valid,
            format_valid: true,
            api_verified: true,
            business_name: record.business_name(),
            status: record.status,
            registration_date: record.registration_date,
            address: record.address,
            error,
            ..Self::for_number(gstin)
        }
    }

    /// Whether a GSTIN was found on the bill at all.
    ///
    /// Validations posted by clients may omit the number; any positive
    /// check result implies one was found.
    pub fn found(&self) -> bool {
        self.gst_number.is_some() || self.valid || self.api_verified || self.format_valid
    }
}

/// Validate a GSTIN: format first, then the registry, falling back to
/// format-only acceptance when the registry cannot be reached.
pub fn validate_gst_online(registry: &dyn GstRegistry, gst_number: &str) -> GstValidation {
    let gstin = clean_gst_number(gst_number);
    if !validate_gst_format(&gstin) {
        tracing::info!("GSTIN failed format check, skipping registry lookup");
        return GstValidation::format_invalid(&gstin);
    }

    match registry.lookup(&gstin) {
        Ok(Some(record)) => {
            let validation = GstValidation::verified(&gstin, record);
            tracing::info!(
                valid = validation.valid,
                status = validation.status.as_deref().unwrap_or("unknown"),
                "GSTIN verified against registry"
            );
            validation
        }
        Ok(None) => {
            tracing::info!("GSTIN not present in registry");
            GstValidation::unregistered(&gstin)
        }
        Err(RegistryError::NotConfigured) => {
            tracing::debug!("No GST registry configured, accepting on format");
            GstValidation::format_only(&gstin)
        }
        Err(e) => {
            tracing::warn!(error = %e, "GST registry lookup failed, accepting on format");
            GstValidation::format_only(&gstin)
        }
    }
}

/// Mock registry for unit testing without network access.
pub struct MockGstRegistry {
    response: MockRegistryResponse,
}

enum MockRegistryResponse {
    Record(RegistryRecord),
    Unknown,
    Unavailable,
}

impl MockGstRegistry {
    pub fn with_record(record: RegistryRecord) -> Self {
        Self {
            response: MockRegistryResponse::Record(record),
        }
    }

    /// A registry that answers but knows no GSTIN.
    pub fn unknown() -> Self {
        Self {
            response: MockRegistryResponse::Unknown,
        }
    }

    /// A registry whose every lookup fails in transport.
    pub fn unavailable() -> Self {
        Self {
            response: MockRegistryResponse::Unavailable,
        }
    }
}

impl GstRegistry for MockGstRegistry {
    fn lookup(&self, _gstin: &str) -> Result<Option<RegistryRecord>, RegistryError> {
        match &self.response {
            MockRegistryResponse::Record(r) => Ok(Some(r.clone())),
            MockRegistryResponse::Unknown => Ok(None),
            MockRegistryResponse::Unavailable => {
                Err(RegistryError::Connection("mock registry unavailable".into()))
            }
        }
    }
}
