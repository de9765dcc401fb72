// src/address/geocode.rs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::states::state_name;
use super::{AddressComponents, AddressResolver};
use crate::error::Unresolved;

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub result: GeocodeResult,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(rename = "addressMatches", default)]
    pub address_matches: Vec<AddressMatch>,
}

#[derive(Debug, Deserialize)]
pub struct AddressMatch {
    #[serde(rename = "matchedAddress", default)]
    pub matched_address: String,
    #[serde(rename = "addressComponents", default)]
    pub components: MatchComponents,
}

/// Component keys vary by locale; any of the locality keys may carry the city.
#[derive(Debug, Default, Deserialize)]
pub struct MatchComponents {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(rename = "county-subdivision", alias = "countySubdivision", default)]
    pub county_subdivision: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

impl MatchComponents {
    fn locality(&self) -> String {
        [
            &self.place,
            &self.city,
            &self.town,
            &self.municipality,
            &self.county_subdivision,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
    }
}

/// Text before the first comma of the matched address, minus a trailing echo of `city`.
fn street_line(matched_address: &str, city: &str) -> String {
    let street = matched_address
        .split(',')
        .next()
        .unwrap_or_default()
        .trim();
    if city.is_empty() || street.len() <= city.len() {
        return street.to_string();
    }

    let cut = street.len() - city.len();
    match (street.get(..cut), street.get(cut..)) {
        (Some(head), Some(tail))
            if tail.eq_ignore_ascii_case(city) && head.ends_with(char::is_whitespace) =>
        {
            head.trim_end().to_string()
        }
        _ => street.to_string(),
    }
}

/// Components of the first candidate match, or [`Unresolved::NoMatch`].
pub fn components_from_response(resp: &GeocodeResponse) -> Result<AddressComponents, Unresolved> {
    let first = resp
        .result
        .address_matches
        .first()
        .ok_or(Unresolved::NoMatch)?;

    let city = first.components.locality();
    let code = first
        .components
        .state
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase();

    Ok(AddressComponents {
        street: street_line(&first.matched_address, &city),
        unit: String::new(),
        state: if code.is_empty() { code } else { state_name(&code) },
        postal_code: first.components.zip.clone().unwrap_or_default(),
        city,
    })
}

/// Resolves addresses through an external one-line geocoding endpoint.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    client: Client,
    endpoint: Url,
    benchmark: String,
}

impl GeocoderClient {
    pub fn new(client: Client, endpoint: Url, benchmark: impl Into<String>) -> Self {
        Self {
            client,
            endpoint,
            benchmark: benchmark.into(),
        }
    }

    fn request_url(&self, raw: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("address", raw)
            .append_pair("benchmark", &self.benchmark)
            .append_pair("format", "json");
        url
    }

    async fn query(&self, url: Url) -> Result<GeocodeResponse, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<GeocodeResponse>()
            .await
    }
}

#[async_trait]
impl AddressResolver for GeocoderClient {
    fn name(&self) -> &'static str {
        "geocoder"
    }

    #[instrument(level = "debug", skip(self))]
    async fn resolve(&self, raw: &str) -> Result<AddressComponents, Unresolved> {
        if raw.trim().is_empty() {
            return Err(Unresolved::EmptyInput);
        }

        let url = self.request_url(raw);
        let resp = self.query(url).await.map_err(|e| {
            warn!(error = %e, "geocoder request failed");
            Unresolved::Unreachable(e)
        })?;
        debug!(
            matches = resp.result.address_matches.len(),
            "geocoder responded"
        );
        components_from_response(&resp)
    }
}
