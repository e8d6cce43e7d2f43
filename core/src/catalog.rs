//! Catalog view-model: the single owner of the in-memory manufacturer and
//! beer collections.
//!
//! # Design
//! State lives in a `tokio::sync::watch` sender. Every mutation goes through
//! `send_modify` / `send_if_modified`, which serialize writers, and no lock is
//! held across an await; the transport call is the only suspension point.
//! Presentation subscribes to the channel and re-renders from snapshots.
//!
//! Only one manufacturer's beers are held at a time. Each operation that will
//! replace that slot takes a generation number when it is issued, and its
//! response is applied only if no newer one was issued meanwhile. The last
//! request issued wins, whatever order the responses arrive in. Deleting
//! the manufacturer whose beers are shown or being fetched also takes a
//! generation, so a late response cannot bring the deleted one back.
//!
//! Failures are logged and leave the state untouched; the error is still
//! returned so a caller can surface it if it wants to.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::error::ApiError;
use crate::service::BeerApi;
use crate::transport::Transport;
use crate::types::{Beer, BeerUpdate, Category, Manufacturer, NewBeer, NewManufacturer};

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub manufacturers: Vec<Manufacturer>,
    /// Beers of `selected_manufacturer`; `None` when the server reported none
    /// or nothing was fetched yet.
    pub beers: Option<Vec<Beer>>,
    pub selected_manufacturer: Option<String>,
    /// Requests currently holding the shared loading indicator.
    in_flight: usize,
}

impl CatalogState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn national_manufacturers(&self) -> Vec<&Manufacturer> {
        self.manufacturers_in(Category::National)
    }

    pub fn imported_manufacturers(&self) -> Vec<&Manufacturer> {
        self.manufacturers_in(Category::Imported)
    }

    fn manufacturers_in(&self, category: Category) -> Vec<&Manufacturer> {
        self.manufacturers
            .iter()
            .filter(|m| m.category_kind() == Some(category))
            .collect()
    }

    /// Beers with the given favorite flag that match `query`, sorted.
    pub fn beers_view(&self, query: &BeerQuery, favorites: bool) -> Vec<&Beer> {
        let needle = query.search.to_lowercase();
        let mut view: Vec<&Beer> = self
            .beers
            .iter()
            .flatten()
            .filter(|b| b.is_favorite == favorites)
            .filter(|b| needle.is_empty() || b.name.to_lowercase().contains(&needle))
            .collect();
        view.sort_by(|a, b| {
            let ord = query.sort.compare(a, b);
            if query.ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        view
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Abv,
    Style,
    Calories,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Name, SortKey::Abv, SortKey::Style, SortKey::Calories];

    fn compare(&self, a: &Beer, b: &Beer) -> Ordering {
        match self {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Abv => a.abv.total_cmp(&b.abv),
            SortKey::Style => a.style.cmp(&b.style),
            SortKey::Calories => a.calories.total_cmp(&b.calories),
        }
    }
}

/// Search and ordering applied to the beer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeerQuery {
    /// Case-insensitive substring of the beer name; empty matches all.
    pub search: String,
    pub sort: SortKey,
    pub ascending: bool,
}

impl Default for BeerQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::Style,
            ascending: true,
        }
    }
}

impl BeerQuery {
    /// Picking the active key again flips the direction; a new key starts
    /// ascending.
    pub fn select(&mut self, key: SortKey) {
        if self.sort == key {
            self.ascending = !self.ascending;
        } else {
            self.sort = key;
            self.ascending = true;
        }
    }
}

/// Holds the shared loading indicator up for as long as it lives.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<CatalogState>,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<CatalogState>) -> Self {
        state.send_modify(|s| s.in_flight += 1);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

fn logged<V>(operation: &'static str, result: Result<V, ApiError>) -> Result<V, ApiError> {
    if let Err(err) = &result {
        tracing::warn!(operation, error = %err, "request failed, state unchanged");
    }
    result
}

pub struct BeerCenter<T> {
    api: BeerApi<T>,
    state: watch::Sender<CatalogState>,
    beer_generation: AtomicU64,
    /// Manufacturer named by the latest `fetch_beers`.
    beers_requested: Mutex<Option<String>>,
}

impl<T: Transport> BeerCenter<T> {
    pub fn new(api: BeerApi<T>) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self {
            api,
            state,
            beer_generation: AtomicU64::new(0),
            beers_requested: Mutex::new(None),
        }
    }

    /// Build the catalog and load the manufacturer list, as every app launch
    /// does. A failed load is logged and leaves the list empty.
    pub async fn launch(api: BeerApi<T>) -> Self {
        let center = Self::new(api);
        let _ = center.fetch_manufacturers().await;
        center
    }

    pub fn api(&self) -> &BeerApi<T> {
        &self.api
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Replace the manufacturer list with the server's.
    pub async fn fetch_manufacturers(&self) -> Result<(), ApiError> {
        let _loading = LoadingGuard::new(&self.state);
        let manufacturers = logged("fetch manufacturers", self.api.list_manufacturers().await)?;
        tracing::info!(count = manufacturers.len(), "manufacturers loaded");
        self.state.send_modify(|s| s.manufacturers = manufacturers);
        Ok(())
    }

    /// On success, append the locally built record. The server's echo is not
    /// reconciled with it, so the local id may differ from the server's until
    /// the next `fetch_manufacturers`.
    pub async fn add_manufacturer(&self, input: NewManufacturer) -> Result<(), ApiError> {
        let envelope = logged("add manufacturer", self.api.add_manufacturer(&input).await)?;
        let record = input.into_local_record();
        tracing::info!(id = %record.id, message = %envelope.message, "manufacturer added");
        self.state.send_modify(|s| s.manufacturers.push(record));
        Ok(())
    }

    /// Remove the manufacturer with `manufacturer_id`, keeping the order of
    /// the rest. Its beers are dropped too if they were the ones on display.
    pub async fn delete_manufacturer(&self, manufacturer_id: &str) -> Result<(), ApiError> {
        logged(
            "delete manufacturer",
            self.api.delete_manufacturer(manufacturer_id).await,
        )?;
        self.state.send_if_modified(|s| {
            let selected = s.selected_manufacturer.as_deref() == Some(manufacturer_id);
            if selected || self.beers_requested_for(manufacturer_id) {
                self.next_generation();
            }
            let mut changed = false;
            if let Some(pos) = s.manufacturers.iter().position(|m| m.id == manufacturer_id) {
                s.manufacturers.remove(pos);
                changed = true;
            }
            if selected {
                s.selected_manufacturer = None;
                s.beers = None;
                changed = true;
            }
            changed
        });
        tracing::info!(manufacturer_id, "manufacturer deleted");
        Ok(())
    }

    /// Load `manufacturer_id`'s beers, discarding whichever manufacturer's
    /// beers were held before.
    pub async fn fetch_beers(&self, manufacturer_id: &str) -> Result<(), ApiError> {
        let generation = self.next_generation();
        *self.beers_requested.lock().unwrap_or_else(PoisonError::into_inner) = Some(manufacturer_id.to_string());
        let _loading = LoadingGuard::new(&self.state);
        let envelope = logged("fetch beers", self.api.list_beers(manufacturer_id).await)?;
        let count = envelope.cervezas.as_ref().map_or(0, Vec::len);
        if self.apply_beers(generation, Some(manufacturer_id), envelope.cervezas) {
            tracing::info!(manufacturer_id, count, "beers loaded");
        }
        Ok(())
    }

    /// On success, reload the manufacturer's beers from the server.
    pub async fn add_beer(&self, input: NewBeer) -> Result<(), ApiError> {
        logged("add beer", self.api.add_beer(&input).await)?;
        tracing::info!(manufacturer_id = %input.manufacturer_id, name = %input.name, "beer added");
        self.fetch_beers(&input.manufacturer_id).await
    }

    /// On success, adopt the beer list the server sent back, or patch the
    /// local copy in place when the response carries none.
    pub async fn update_beer(&self, update: BeerUpdate) -> Result<(), ApiError> {
        let generation = self.next_generation();
        let _loading = LoadingGuard::new(&self.state);
        let envelope = logged("update beer", self.api.update_beer(&update).await)?;
        tracing::info!(beer_id = %update.beer_id, message = %envelope.message, "beer updated");

        match envelope.cervezas {
            Some(beers) => {
                self.apply_beers(generation, None, Some(beers));
            }
            None => {
                self.state.send_if_modified(|s| {
                    let Some(beer) = s
                        .beers
                        .iter_mut()
                        .flatten()
                        .find(|b| b.id == update.beer_id)
                    else {
                        return false;
                    };
                    update.apply_to(beer);
                    true
                });
            }
        }
        Ok(())
    }

    pub async fn delete_beer(&self, beer_id: &str) -> Result<(), ApiError> {
        logged("delete beer", self.api.delete_beer(beer_id).await)?;
        self.state.send_if_modified(|s| {
            let Some(beers) = s.beers.as_mut() else {
                return false;
            };
            let before = beers.len();
            beers.retain(|b| b.id != beer_id);
            beers.len() != before
        });
        tracing::info!(beer_id, "beer deleted");
        Ok(())
    }

    /// Flip the favorite flag server-side and adopt the full beer list the
    /// server answers with.
    pub async fn toggle_favorite(&self, beer_id: &str) -> Result<(), ApiError> {
        let generation = self.next_generation();
        let beers = logged("toggle favorite", self.api.toggle_favorite(beer_id).await)?;
        if self.apply_beers(generation, None, Some(beers)) {
            tracing::info!(beer_id, "favorite toggled");
        }
        Ok(())
    }

    fn next_generation(&self) -> u64 {
        self.beer_generation.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }

    fn beers_requested_for(&self, manufacturer_id: &str) -> bool {
        self.beers_requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            == Some(manufacturer_id)
    }

    /// Store `beers` unless a newer beer request was issued after
    /// `generation`. `manufacturer` replaces the selection when given.
    fn apply_beers(&self, generation: u64, manufacturer: Option<&str>, beers: Option<Vec<Beer>>) -> bool {
        let applied = self.state.send_if_modified(|s| {
            if self.beer_generation.load(AtomicOrdering::SeqCst) != generation {
                return false;
            }
            if let Some(id) = manufacturer {
                s.selected_manufacturer = Some(id.to_string());
            }
            s.beers = beers;
            true
        });
        if !applied {
            tracing::debug!(generation, "discarding superseded beer response");
        }
        applied
    }
}
