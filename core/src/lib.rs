//! API client and catalog view-model for the beer manufacturer catalog.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! backend's eight operations without touching the network (host-does-IO).
//! Rust hosts drive the round-trip through a `Transport`; native hosts go
//! through the C ABI in the `beer-center-ffi` crate.
//!
//! # Design
//! - `BeerCenterClient` is stateless: it holds only its validated config.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit.
//! - `BeerApi` joins a client and a `Transport` into async methods.
//! - `BeerCenter` owns the observable catalog state and is the only writer.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logo;
pub mod service;
pub mod transport;
pub mod types;

pub use catalog::{BeerCenter, BeerQuery, CatalogState, SortKey};
pub use client::BeerCenterClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use logo::{InlineImage, LogoSource};
pub use service::BeerApi;
pub use transport::{Transport, UreqTransport};
pub use types::{
    Beer, BeerUpdate, BeersEnvelope, Category, FavoriteToggle, Manufacturer,
    ManufacturersEnvelope, NewBeer, NewManufacturer,
};
