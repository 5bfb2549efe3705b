#![warn(missing_docs)]
//! # criadouro-address
//!
//! ## Purpose
//! Resolves Brazilian postal codes (CEP) into street addresses and addresses
//! into coordinates, for the registration flow.
//!
//! ## Responsibilities
//! - Normalize, validate, and format CEP strings.
//! - Query ViaCEP for the address behind a CEP.
//! - Query the Google Maps geocoding API for final coordinates.
//!
//! ## Data flow
//! Registration screen input -> CEP validation -> [`ViaCepClient::lookup`]
//! fills street fields -> on review, [`GeocodingClient::final_coordinates`]
//! resolves the confirmed address -> coordinates attach to the submission.
//!
//! ## Ownership and lifetimes
//! Clients own their base URL and share a transport through `Arc`, so one
//! HTTP client can back both lookup services.
//!
//! ## Error model
//! Transport and decode failures surface as [`AddressError`]. A CEP that is
//! well-formed but unknown, and an address the geocoder cannot resolve, are
//! `Ok(None)` — both lookups are optional enrichment with graceful fallback.
//!
//! ## Security and privacy notes
//! The geocoding API key is held in configuration and never logged.

use std::sync::Arc;
use std::time::Duration;

use criadouro_core::Coordinates;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Public ViaCEP endpoint.
pub const VIACEP_BASE_URL: &str = "https://viacep.com.br/ws";
/// Google Maps API root.
pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Strips everything but ASCII digits from a CEP string.
pub fn normalize_cep(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Returns `true` for a CEP with exactly eight digits.
pub fn validate_cep(raw: &str) -> bool {
    normalize_cep(raw).len() == 8
}

/// Formats a CEP for display (`01310100` -> `01310-100`).
///
/// Inputs with fewer than eight digits are returned digit-only, unhyphenated,
/// so the formatter can run on partial input while the user types.
pub fn format_cep(raw: &str) -> String {
    let digits = normalize_cep(raw);
    if digits.len() < 8 {
        return digits;
    }
    format!("{}-{}", &digits[..5], &digits[5..8])
}

/// Street address resolved from a CEP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CepAddress {
    /// Street name.
    pub street: String,
    /// Neighborhood.
    pub neighborhood: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// CEP as returned by the directory, already hyphenated.
    pub cep: String,
}

/// Raw ViaCEP response body.
#[derive(Debug, Clone, Deserialize)]
struct ViaCepRecord {
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
    erro: bool,
}

/// Transport executing one GET request for the lookup clients.
pub trait LookupTransport: Send + Sync {
    /// Fetches the response body for `url`.
    ///
    /// # Errors
    /// Returns [`AddressError::Transport`] on network failure or non-2xx
    /// status.
    fn get(&self, url: &Url) -> Result<String, AddressError>;
}

/// Production transport over a blocking HTTP client.
///
/// Carries an explicit per-request timeout; the source had none and could
/// hang a screen indefinitely.
#[derive(Debug, Clone)]
pub struct HttpLookupTransport {
    client: reqwest::blocking::Client,
}

impl HttpLookupTransport {
    /// Creates a transport with the given request timeout.
    ///
    /// # Errors
    /// Returns [`AddressError::Transport`] when the client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, AddressError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AddressError::Transport(error.to_string()))?;
        Ok(Self { client })
    }
}

impl LookupTransport for HttpLookupTransport {
    fn get(&self, url: &Url) -> Result<String, AddressError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|error| AddressError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AddressError::Transport(format!(
                "lookup returned status {status}"
            )));
        }

        response
            .text()
            .map_err(|error| AddressError::Transport(error.to_string()))
    }
}

/// ViaCEP directory client.
pub struct ViaCepClient {
    base_url: Url,
    transport: Arc<dyn LookupTransport>,
}

impl ViaCepClient {
    /// Creates a client against the public ViaCEP endpoint.
    ///
    /// # Errors
    /// Returns [`AddressError::InvalidEndpoint`] when `base_url` does not
    /// parse or is not HTTPS.
    pub fn new(
        base_url: &str,
        transport: Arc<dyn LookupTransport>,
    ) -> Result<Self, AddressError> {
        Ok(Self {
            base_url: parse_https_endpoint(base_url)?,
            transport,
        })
    }

    /// Resolves the address behind a CEP.
    ///
    /// Returns `Ok(None)` for a CEP the directory does not know.
    ///
    /// # Errors
    /// Returns [`AddressError::InvalidCep`] for malformed input and
    /// transport/decode errors otherwise.
    pub fn lookup(&self, cep: &str) -> Result<Option<CepAddress>, AddressError> {
        let digits = normalize_cep(cep);
        if digits.len() != 8 {
            return Err(AddressError::InvalidCep(cep.to_string()));
        }

        let url = self
            .base_url
            .join(&format!("{digits}/json/"))
            .map_err(|error| AddressError::InvalidEndpoint(error.to_string()))?;

        let body = self.transport.get(&url)?;
        let record: ViaCepRecord = serde_json::from_str(&body)?;

        if record.erro {
            log::debug!("viacep has no address for cep {digits}");
            return Ok(None);
        }

        Ok(Some(CepAddress {
            street: record.logradouro,
            neighborhood: record.bairro,
            city: record.localidade,
            state: record.uf,
            cep: record.cep,
        }))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Clone, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

/// Google Maps geocoding client.
pub struct GeocodingClient {
    base_url: Url,
    api_key: String,
    transport: Arc<dyn LookupTransport>,
}

impl GeocodingClient {
    /// Creates a geocoding client.
    ///
    /// # Errors
    /// Returns [`AddressError::InvalidEndpoint`] for a bad base URL and
    /// [`AddressError::MissingApiKey`] for a blank key.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        transport: Arc<dyn LookupTransport>,
    ) -> Result<Self, AddressError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AddressError::MissingApiKey);
        }

        Ok(Self {
            base_url: parse_https_endpoint(base_url)?,
            api_key,
            transport,
        })
    }

    /// Resolves coordinates for a free-form address.
    ///
    /// Returns `Ok(None)` when the geocoder reports anything but `OK` or an
    /// empty result list; callers fall back to coordinates already known.
    ///
    /// # Errors
    /// Returns transport/decode errors.
    pub fn coordinates_for_address(
        &self,
        address: &str,
    ) -> Result<Option<Coordinates>, AddressError> {
        let mut url = self
            .base_url
            .join("geocode/json")
            .map_err(|error| AddressError::InvalidEndpoint(error.to_string()))?;
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);

        let body = self.transport.get(&url)?;
        let response: GeocodeResponse = serde_json::from_str(&body)?;

        if response.status != "OK" {
            log::warn!("geocoder returned status {}", response.status);
            return Ok(None);
        }

        Ok(response
            .results
            .first()
            .map(|result| result.geometry.location))
    }

    /// Resolves precise coordinates for a confirmed registration address.
    ///
    /// # Errors
    /// Returns transport/decode errors.
    pub fn final_coordinates(
        &self,
        street: &str,
        number: &str,
        neighborhood: &str,
        city: &str,
        state: &str,
        cep: &str,
    ) -> Result<Option<Coordinates>, AddressError> {
        let full_address =
            format!("{street}, {number}, {neighborhood}, {city}, {state}, {cep}, Brasil");
        self.coordinates_for_address(&full_address)
    }
}

fn parse_https_endpoint(raw: &str) -> Result<Url, AddressError> {
    let url = Url::parse(raw).map_err(|error| AddressError::InvalidEndpoint(error.to_string()))?;
    if url.scheme() != "https" {
        return Err(AddressError::InvalidEndpoint(
            "lookup endpoint must use https".to_string(),
        ));
    }
    Ok(url)
}

/// Address lookup errors.
#[derive(Debug, Error)]
pub enum AddressError {
    /// CEP input does not have eight digits.
    #[error("invalid cep: {0:?}")]
    InvalidCep(String),
    /// Endpoint URL is malformed or not HTTPS.
    #[error("invalid lookup endpoint: {0}")]
    InvalidEndpoint(String),
    /// Geocoding requires a configured API key.
    #[error("geocoding api key is not configured")]
    MissingApiKey,
    /// Network or HTTP failure.
    #[error("lookup transport failure: {0}")]
    Transport(String),
    /// Response body was not the expected JSON shape.
    #[error("lookup decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
