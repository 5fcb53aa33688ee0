//! Postal-code lookup (ViaCEP) and geocoding (Nominatim).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use common::{AppError, AppResult, GeoConfig};

/// Address resolved from a postal code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub cep: String,
    /// Street and neighbourhood, `"{logradouro}, {bairro}"`
    pub street: String,
    pub city: String,
    pub state: String,
}

impl PostalAddress {
    /// Free-form query for the geocoder, most specific part first
    pub fn geocoding_query(&self, number: Option<&str>) -> String {
        match number.filter(|n| !n.trim().is_empty()) {
            Some(number) => format!("{}, {}, {}, {}", number, self.street, self.city, self.state),
            None => format!("{}, {}, {}", self.street, self.city, self.state),
        }
    }
}

/// Latitude and longitude as the geocoder returns them (decimal strings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

/// Address enrichment seam.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve a normalized 8-digit CEP. `None` when the CEP is unknown.
    async fn postal_code(&self, cep: &str) -> AppResult<Option<PostalAddress>>;

    /// Best match for a free-form address. `None` when nothing matched.
    async fn geocode(&self, query: &str) -> AppResult<Option<Coordinates>>;
}

/// Strip punctuation from a CEP. `None` unless exactly eight digits remain.
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | '.' | ' '))
        .collect();
    (digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

#[derive(Debug, Deserialize)]
struct ViaCepBody {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// `AddressLookup` over the public ViaCEP and Nominatim services.
pub struct ViaCepNominatim {
    config: GeoConfig,
    client: Client,
}

impl ViaCepNominatim {
    pub fn new(config: GeoConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: GeoConfig, client: Client) -> Self {
        Self { config, client }
    }
}

fn upstream(service: &str, err: reqwest::Error) -> AppError {
    AppError::service_unavailable(format!("{} request failed: {}", service, err))
}

#[async_trait]
impl AddressLookup for ViaCepNominatim {
    async fn postal_code(&self, cep: &str) -> AppResult<Option<PostalAddress>> {
        let url = format!("{}/{}/json/", self.config.viacep_url.trim_end_matches('/'), cep);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| upstream("ViaCEP", e))?;

        if !response.status().is_success() {
            debug!(cep, status = %response.status(), "ViaCEP rejected postal code");
            return Ok(None);
        }

        let body: ViaCepBody = response.json().await.map_err(|e| upstream("ViaCEP", e))?;
        if body.erro.is_some() {
            return Ok(None);
        }

        Ok(Some(PostalAddress {
            cep: if body.cep.is_empty() { cep.to_string() } else { body.cep },
            street: format!("{}, {}", body.logradouro, body.bairro),
            city: body.localidade,
            state: body.uf,
        }))
    }

    async fn geocode(&self, query: &str) -> AppResult<Option<Coordinates>> {
        let url = format!("{}/search", self.config.nominatim_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .await
            .map_err(|e| upstream("Nominatim", e))?
            .error_for_status()
            .map_err(|e| upstream("Nominatim", e))?;

        let places: Vec<NominatimPlace> =
            response.json().await.map_err(|e| upstream("Nominatim", e))?;

        Ok(places.into_iter().next().map(|place| Coordinates {
            latitude: place.lat,
            longitude: place.lon,
        }))
    }
}
