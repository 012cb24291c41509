use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::utils::digits_only;

const HTTP_TIMEOUT_SECS: u64 = 10;
// Nominatim's usage policy rejects requests without an identifying agent.
const USER_AGENT: &str = concat!("pedido-core/", env!("CARGO_PKG_VERSION"));

/// Address fields recovered from coordinates. Every field is optional;
/// the geocoder reports whatever it knows about the point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseAddress {
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Normalized to bare digits when present.
    pub cep: Option<String>,
}

/// Client for a Nominatim-style reverse geocoder.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl GeocodeClient {
    pub fn new(config: &LookupConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        GeocodeClient {
            client,
            base_url: config.geocode_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves coordinates to the nearest known address.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<ReverseAddress, LookupError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(lat, lon, "Reverse geocoding");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(LookupError::Malformed(format!(
                "geocoder returned HTTP {}",
                status
            )));
        }

        let payload: NominatimPayload = response
            .json()
            .await
            .map_err(|err| LookupError::Malformed(err.to_string()))?;

        Ok(payload.into_address())
    }
}

#[derive(Debug, Default, Deserialize)]
struct NominatimPayload {
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl NominatimPayload {
    fn into_address(self) -> ReverseAddress {
        let address = self.address;
        ReverseAddress {
            street: address.road,
            // Urban OSM data tags the area as neighbourhood rather than suburb.
            neighborhood: address.suburb.or(address.neighbourhood),
            // Smaller places report town or village instead of city.
            city: address.city.or(address.town).or(address.village),
            state: address.state,
            cep: address.postcode.map(|raw| digits_only(&raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_a_city_payload() {
        let payload: NominatimPayload = serde_json::from_str(
            r#"{
                "address": {
                    "road": "Avenida Brasil",
                    "suburb": "Centro",
                    "city": "Foz do Iguaçu",
                    "state": "Paraná",
                    "postcode": "85851-000"
                }
            }"#,
        )
        .unwrap();

        let address = payload.into_address();

        assert_eq!(address.street.as_deref(), Some("Avenida Brasil"));
        assert_eq!(address.city.as_deref(), Some("Foz do Iguaçu"));
        assert_eq!(address.cep.as_deref(), Some("85851000"));
    }

    #[test]
    fn falls_back_to_town_then_village() {
        let town: NominatimPayload =
            serde_json::from_str(r#"{"address": {"town": "Santa Terezinha"}}"#).unwrap();
        assert_eq!(town.into_address().city.as_deref(), Some("Santa Terezinha"));

        let village: NominatimPayload =
            serde_json::from_str(r#"{"address": {"village": "São Miguel"}}"#).unwrap();
        assert_eq!(village.into_address().city.as_deref(), Some("São Miguel"));
    }

    #[test]
    fn falls_back_to_neighbourhood_when_suburb_is_absent() {
        let tagged: NominatimPayload =
            serde_json::from_str(r#"{"address": {"neighbourhood": "Vila A"}}"#).unwrap();
        assert_eq!(tagged.into_address().neighborhood.as_deref(), Some("Vila A"));

        let both: NominatimPayload = serde_json::from_str(
            r#"{"address": {"suburb": "Centro", "neighbourhood": "Vila A"}}"#,
        )
        .unwrap();
        assert_eq!(both.into_address().neighborhood.as_deref(), Some("Centro"));
    }

    #[test]
    fn tolerates_an_empty_payload() {
        let payload: NominatimPayload = serde_json::from_str(r#"{}"#).unwrap();

        assert_eq!(payload.into_address(), ReverseAddress::default());
    }
}
