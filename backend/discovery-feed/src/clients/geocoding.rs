//! Geocoding collaborator
//!
//! Two request forms share one response shape:
//! - forward: `{address, city, countryCode}`
//! - postcode: `{postcode, houseNumber}` (strict manual-address path)
//!
//! Success is `{lat, lng, formattedAddress}`; failures come back as
//! `{error, message}` with any status code.

use crate::config::GeocoderConfig;
use crate::error::GeocodeError;
use crate::models::Coord;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressQuery {
    pub address: String,
    pub city: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeQuery {
    pub postcode: String,
    pub house_number: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

impl GeocodeResult {
    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lng)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup_address(&self, query: &AddressQuery) -> Result<GeocodeResult, GeocodeError>;

    async fn lookup_postcode(&self, query: &PostcodeQuery)
        -> Result<GeocodeResult, GeocodeError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeocodeResponse {
    Found(GeocodeResult),
    Failed {
        error: String,
        #[serde(default)]
        message: String,
    },
}

/// HTTP implementation of [`Geocoder`]
#[derive(Clone)]
pub struct HttpGeocoder {
    client: Client,
    base_url: String,
}

impl HttpGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<GeocodeResult, GeocodeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Geocoding lookup");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport)?;

        parse_response(status.as_u16(), &body)
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn lookup_address(&self, query: &AddressQuery) -> Result<GeocodeResult, GeocodeError> {
        self.get("/geocode", query).await
    }

    async fn lookup_postcode(
        &self,
        query: &PostcodeQuery,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.get("/geocode/postcode", query).await
    }
}

fn map_transport(err: reqwest::Error) -> GeocodeError {
    if err.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::Transport(err)
    }
}

fn parse_response(status: u16, body: &str) -> Result<GeocodeResult, GeocodeError> {
    match serde_json::from_str::<GeocodeResponse>(body) {
        Ok(GeocodeResponse::Found(result)) if (200..300).contains(&status) => {
            if !result.coord().is_valid() {
                return Err(GeocodeError::InvalidCoordinate {
                    lat: result.lat,
                    lng: result.lng,
                });
            }
            Ok(result)
        }
        Ok(GeocodeResponse::Failed { error, message }) => {
            Err(GeocodeError::Lookup { error, message })
        }
        _ => Err(GeocodeError::Lookup {
            error: format!("http_{}", status),
            message: body.chars().take(200).collect(),
        }),
    }
}
