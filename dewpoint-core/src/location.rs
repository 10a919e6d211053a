//! Injectable geolocation capability.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::{Coordinates, Position};

pub const IP_API_URL: &str = "http://ip-api.com/json";

/// Whether a location source can be asked for a position at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation is not available")]
    Unavailable,

    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    fn capability(&self) -> Capability;

    async fn current_position(&self) -> Result<Position, LocationError>;
}

/// Always answers with the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    fn capability(&self) -> Capability {
        Capability::Available
    }

    async fn current_position(&self) -> Result<Position, LocationError> {
        Ok(Position {
            coordinates: self.coordinates,
            accuracy_m: None,
        })
    }
}

/// No way to locate the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    fn capability(&self) -> Capability {
        Capability::Unavailable
    }

    async fn current_position(&self) -> Result<Position, LocationError> {
        Err(LocationError::Unavailable)
    }
}

/// Approximate position derived from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    url: String,
    http: Client,
}

impl IpLocation {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new(IP_API_URL.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

fn position_from_ip_api(body: &str) -> Result<Position, LocationError> {
    let parsed: IpApiResponse = serde_json::from_str(body)
        .map_err(|e| LocationError::Failed(format!("Unreadable location response: {e}")))?;

    if parsed.status != "success" {
        let reason = parsed.message.unwrap_or_else(|| parsed.status.clone());
        return Err(LocationError::Failed(format!("Location lookup failed: {reason}")));
    }

    match (parsed.lat, parsed.lon) {
        (Some(latitude), Some(longitude)) => Ok(Position {
            coordinates: Coordinates {
                latitude,
                longitude,
            },
            accuracy_m: None,
        }),
        _ => Err(LocationError::Failed(
            "Location response contained no coordinates".to_string(),
        )),
    }
}

#[async_trait]
impl LocationSource for IpLocation {
    fn capability(&self) -> Capability {
        Capability::Available
    }

    async fn current_position(&self) -> Result<Position, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Failed(format!("Location request failed: {e}")))?;

        let body = res
            .text()
            .await
            .map_err(|e| LocationError::Failed(format!("Location request failed: {e}")))?;

        position_from_ip_api(&body)
    }
}
