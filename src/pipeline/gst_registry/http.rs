use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{GstRegistry, RegistryError, RegistryRecord};

/// Date format the registry uses for `rgdt` (e.g. `01/07/2017`).
const REGISTRATION_DATE_FORMAT: &str = "%d/%m/%Y";

/// HTTP client for a GSTIN lookup service (`GET {base}/{api_key}/{gstin}`).
pub struct HttpGstRegistry {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpGstRegistry {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, RegistryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RegistryError::ClientSetup(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }
}

/// Response body of the lookup service.
#[derive(Deserialize)]
struct TaxpayerResponse {
    flag: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<TaxpayerData>,
}

#[derive(Deserialize)]
struct TaxpayerData {
    #[serde(default, rename = "tradeNam")]
    trade_name: Option<String>,
    #[serde(default, rename = "lgnm")]
    legal_name: Option<String>,
    #[serde(default, rename = "sts")]
    status: Option<String>,
    #[serde(default, rename = "rgdt")]
    registration_date: Option<String>,
    #[serde(default, rename = "pradr")]
    principal_address: Option<PrincipalAddress>,
}

#[derive(Deserialize)]
struct PrincipalAddress {
    #[serde(default)]
    adr: Option<String>,
}

impl From<TaxpayerData> for RegistryRecord {
    fn from(data: TaxpayerData) -> Self {
        let registration_date = data.registration_date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw.trim(), REGISTRATION_DATE_FORMAT)
                .map_err(|e| tracing::debug!(raw, error = %e, "Unparseable registration date"))
                .ok()
        });

        RegistryRecord {
            legal_name: data.legal_name,
            trade_name: data.trade_name,
            status: data.status,
            registration_date,
            address: data.principal_address.and_then(|a| a.adr),
        }
    }
}

impl GstRegistry for HttpGstRegistry {
    fn lookup(&self, gstin: &str) -> Result<Option<RegistryRecord>, RegistryError> {
        let url = format!("{}/{}/{}", self.base_url, self.api_key, gstin);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout(self.timeout_secs)
            } else {
                RegistryError::Connection(e.without_url().to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status(status.as_u16()));
        }

        let parsed: TaxpayerResponse = response
            .json()
            .map_err(|e| RegistryError::Decode(e.without_url().to_string()))?;

        if !parsed.flag {
            tracing::debug!(
                message = parsed.message.as_deref().unwrap_or(""),
                "Registry reports unknown GSTIN"
            );
            return Ok(None);
        }

        parsed
            .data
            .map(|d| Some(RegistryRecord::from(d)))
            .ok_or_else(|| RegistryError::Decode("flag set but no taxpayer data".into()))
    }
}
