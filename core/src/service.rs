//! Async facade: one method per backend operation.
//!
//! `BeerApi` pairs the stateless `BeerCenterClient` with a `Transport`, so
//! each call is build → execute → parse. It holds no mutable state and is
//! safe to share between any number of concurrent callers.

use crate::client::BeerCenterClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Beer, BeerUpdate, BeersEnvelope, Manufacturer, ManufacturersEnvelope, NewBeer, NewManufacturer};

#[derive(Debug, Clone)]
pub struct BeerApi<T> {
    client: BeerCenterClient,
    transport: T,
}

impl BeerApi<UreqTransport> {
    /// Client over real HTTP.
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(BeerCenterClient::new(config)?, UreqTransport::new()))
    }
}

impl<T: Transport> BeerApi<T> {
    pub fn new(client: BeerCenterClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &BeerCenterClient {
        &self.client
    }

    pub async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, ApiError> {
        let response = self.transport.execute(self.client.build_list_manufacturers()).await?;
        self.client.parse_list_manufacturers(response)
    }

    pub async fn add_manufacturer(&self, input: &NewManufacturer) -> Result<ManufacturersEnvelope, ApiError> {
        let request = self.client.build_add_manufacturer(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_add_manufacturer(response)
    }

    pub async fn delete_manufacturer(&self, manufacturer_id: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete_manufacturer(manufacturer_id);
        let response = self.transport.execute(request).await?;
        self.client.parse_delete_manufacturer(response)
    }

    pub async fn list_beers(&self, manufacturer_id: &str) -> Result<BeersEnvelope, ApiError> {
        let request = self.client.build_list_beers(manufacturer_id);
        let response = self.transport.execute(request).await?;
        self.client.parse_list_beers(response)
    }

    pub async fn add_beer(&self, input: &NewBeer) -> Result<(), ApiError> {
        let request = self.client.build_add_beer(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_add_beer(response)
    }

    pub async fn update_beer(&self, input: &BeerUpdate) -> Result<BeersEnvelope, ApiError> {
        let request = self.client.build_update_beer(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_beer(response)
    }

    pub async fn delete_beer(&self, beer_id: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete_beer(beer_id);
        let response = self.transport.execute(request).await?;
        self.client.parse_delete_beer(response)
    }

    pub async fn toggle_favorite(&self, beer_id: &str) -> Result<Vec<Beer>, ApiError> {
        let request = self.client.build_toggle_favorite(beer_id)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_toggle_favorite(response)
    }
}
