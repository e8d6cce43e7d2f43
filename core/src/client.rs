//! Stateless HTTP request builder and response parser for the beer API.
//!
//! # Design
//! `BeerCenterClient` holds only its validated configuration and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The caller executes the round-trip in between.
//!
//! Success criteria differ per operation and are kept as the backend's
//! clients have always applied them: deletes and add-beer accept exactly
//! 200, every other operation accepts any 2xx. Likewise add-manufacturer
//! posts a loose key/value object while the beer operations post typed
//! payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Beer, BeerUpdate, BeersEnvelope, FavoriteToggle, Manufacturer, ManufacturersEnvelope,
    NewBeer, NewManufacturer,
};

pub const LIST_MANUFACTURERS_PATH: &str = "/fabricante/getFabricantes";
pub const ADD_MANUFACTURER_PATH: &str = "/fabricante/addFabricante";
pub const DELETE_MANUFACTURER_PATH: &str = "/fabricante/deleteFabricante";
pub const LIST_BEERS_PATH: &str = "/cerveza/getCervezas";
pub const ADD_BEER_PATH: &str = "/cerveza/addCerveza";
pub const UPDATE_BEER_PATH: &str = "/cerveza/updateCerveza";
pub const DELETE_BEER_PATH: &str = "/cerveza/deleteCerveza";
pub const FAVORITE_BEER_PATH: &str = "/cerveza/favCerveza";

/// Which statuses an operation treats as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    /// Exactly 200.
    Ok,
    /// Anything in 200..=299.
    AnySuccess,
}

/// Synchronous, stateless client for the beer API.
#[derive(Debug, Clone)]
pub struct BeerCenterClient {
    base_url: String,
    api_key_header: String,
    api_key: String,
}

impl BeerCenterClient {
    /// Validate `config` and build a client. A configuration that could not
    /// produce a well-formed request is rejected here, before anything is sent.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.validate()?;
        Ok(Self {
            base_url,
            api_key_header: config.api_key_header.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- manufacturers ------------------------------------------------------

    pub fn build_list_manufacturers(&self) -> HttpRequest {
        self.request(HttpMethod::Get, self.url(LIST_MANUFACTURERS_PATH), None)
    }

    pub fn build_add_manufacturer(&self, input: &NewManufacturer) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let body = json!({
            "nombre": input.name,
            "logo": input.logo.as_deref().unwrap_or(""),
            "tipo": input.category.as_str(),
        });
        Ok(self.request(
            HttpMethod::Post,
            self.url(ADD_MANUFACTURER_PATH),
            Some(body.to_string()),
        ))
    }

    pub fn build_delete_manufacturer(&self, manufacturer_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            self.url_with_query(DELETE_MANUFACTURER_PATH, "id_fabricante", manufacturer_id),
            None,
        )
    }

    // -- beers --------------------------------------------------------------

    pub fn build_list_beers(&self, manufacturer_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            self.url_with_query(LIST_BEERS_PATH, "id_fabricante", manufacturer_id),
            None,
        )
    }

    pub fn build_add_beer(&self, input: &NewBeer) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let body = encode(input)?;
        Ok(self.request(HttpMethod::Post, self.url(ADD_BEER_PATH), Some(body)))
    }

    pub fn build_update_beer(&self, input: &BeerUpdate) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let body = encode(input)?;
        Ok(self.request(HttpMethod::Put, self.url(UPDATE_BEER_PATH), Some(body)))
    }

    pub fn build_delete_beer(&self, beer_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Delete,
            self.url_with_query(DELETE_BEER_PATH, "id_cerveza", beer_id),
            None,
        )
    }

    pub fn build_toggle_favorite(&self, beer_id: &str) -> Result<HttpRequest, ApiError> {
        let body = encode(&FavoriteToggle {
            beer_id: beer_id.to_string(),
        })?;
        Ok(self.request(HttpMethod::Put, self.url(FAVORITE_BEER_PATH), Some(body)))
    }

    // -- parsers ------------------------------------------------------------

    /// The envelope's message is logged and dropped.
    pub fn parse_list_manufacturers(&self, response: HttpResponse) -> Result<Vec<Manufacturer>, ApiError> {
        let envelope: ManufacturersEnvelope = decode(&response, Accept::AnySuccess)?;
        tracing::debug!(
            count = envelope.fabricantes.len(),
            message = %envelope.message,
            "manufacturers listed"
        );
        Ok(envelope.fabricantes)
    }

    pub fn parse_add_manufacturer(&self, response: HttpResponse) -> Result<ManufacturersEnvelope, ApiError> {
        decode(&response, Accept::AnySuccess)
    }

    pub fn parse_delete_manufacturer(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Accept::Ok)
    }

    pub fn parse_list_beers(&self, response: HttpResponse) -> Result<BeersEnvelope, ApiError> {
        decode(&response, Accept::AnySuccess)
    }

    /// Only an exact 200 counts; a 201 or 204 is reported as a server error.
    pub fn parse_add_beer(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Accept::Ok)
    }

    pub fn parse_update_beer(&self, response: HttpResponse) -> Result<BeersEnvelope, ApiError> {
        decode(&response, Accept::AnySuccess)
    }

    pub fn parse_delete_beer(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, Accept::Ok)
    }

    /// The server answers with the whole beer collection of the beer's
    /// manufacturer, not just the toggled beer. A `null` list means empty.
    pub fn parse_toggle_favorite(&self, response: HttpResponse) -> Result<Vec<Beer>, ApiError> {
        let envelope: BeersEnvelope = decode(&response, Accept::AnySuccess)?;
        Ok(envelope.cervezas.unwrap_or_default())
    }

    // -- helpers ------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn url_with_query(&self, path: &str, key: &str, value: &str) -> String {
        format!("{}{path}?{key}={}", self.base_url, urlencoding::encode(value))
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![(self.api_key_header.clone(), self.api_key.clone())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

fn encode<T: Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::Encoding(e.to_string()))
}

/// Map a status that fails `accept` to `ApiError::Server`.
fn check_status(response: &HttpResponse, accept: Accept) -> Result<(), ApiError> {
    let ok = match accept {
        Accept::Ok => response.status == 200,
        Accept::AnySuccess => response.is_success(),
    };
    if ok {
        return Ok(());
    }
    Err(ApiError::Server {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, accept: Accept) -> Result<T, ApiError> {
    check_status(response, accept)?;
    if !response.has_body() {
        return Err(ApiError::MissingData);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decoding(e.to_string()))
}
