use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{DeliveryConfig, LookupConfig};
use crate::error::LookupError;
use crate::utils::digits_only;

const HTTP_TIMEOUT_SECS: u64 = 10;
const CEP_LEN: usize = 8;

/// Address for a known CEP, as reported by the postal-code service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CepAddress {
    /// Eight digits, no separator.
    pub cep: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Outcome of a CEP lookup. An unknown-but-well-formed CEP is not an
/// error; the service answers 200 with an error marker instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CepLookup {
    Found(CepAddress),
    NotFound,
}

/// Client for the ViaCEP-style postal-code API.
#[derive(Debug, Clone)]
pub struct CepClient {
    client: Client,
    base_url: String,
}

impl CepClient {
    pub fn new(config: &LookupConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        CepClient {
            client,
            base_url: config.viacep_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Looks up an address by CEP. Accepts masked input ("85850-000");
    /// anything that does not hold exactly eight digits is rejected
    /// before any network call.
    pub async fn lookup(&self, cep: &str) -> Result<CepLookup, LookupError> {
        let digits = digits_only(cep);
        if digits.len() != CEP_LEN {
            return Err(LookupError::InvalidCep(cep.to_string()));
        }

        let url = format!("{}/ws/{}/json/", self.base_url, digits);
        debug!(cep = %digits, "Looking up CEP");

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(LookupError::Malformed(format!(
                "CEP service returned HTTP {}",
                status
            )));
        }

        let payload: ViaCepPayload = response
            .json()
            .await
            .map_err(|err| LookupError::Malformed(err.to_string()))?;

        if payload.is_not_found() {
            return Ok(CepLookup::NotFound);
        }

        Ok(CepLookup::Found(CepAddress {
            cep: digits,
            street: payload.logradouro,
            neighborhood: payload.bairro,
            city: payload.localidade,
            state: payload.uf,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepPayload {
    // The service reports unknown CEPs as `"erro": true`, and some
    // deployments as the string "true".
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepPayload {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(text)) => text.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Whether an address can be delivered to, and why not when it cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEligibility {
    pub eligible: bool,
    pub message: Option<String>,
}

impl ZoneEligibility {
    fn eligible() -> Self {
        ZoneEligibility {
            eligible: true,
            message: None,
        }
    }

    fn ineligible(message: String) -> Self {
        ZoneEligibility {
            eligible: false,
            message: Some(message),
        }
    }
}

/// The storefront's delivery area, expressed as CEP prefixes.
#[derive(Debug, Clone)]
pub struct DeliveryZone {
    city: String,
    state: String,
    cep_prefixes: Vec<String>,
}

impl DeliveryZone {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        DeliveryZone {
            city: config.city.clone(),
            state: config.state.clone(),
            cep_prefixes: config.cep_prefixes.clone(),
        }
    }

    /// Checks a CEP against the served area. An empty prefix list means
    /// no restriction.
    pub fn check(&self, cep: &str) -> ZoneEligibility {
        let digits = digits_only(cep);
        if digits.len() != CEP_LEN {
            return ZoneEligibility::ineligible("Enter a valid 8-digit CEP".to_string());
        }

        if self.cep_prefixes.is_empty()
            || self
                .cep_prefixes
                .iter()
                .any(|prefix| digits.starts_with(prefix.as_str()))
        {
            return ZoneEligibility::eligible();
        }

        ZoneEligibility::ineligible(format!(
            "Delivery is currently limited to {} - {}",
            self.city, self.state
        ))
    }
}
