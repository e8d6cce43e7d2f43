//! Domain records and wire payloads for the beer catalog API.
//!
//! # Design
//! Field names are English on the Rust side and renamed to the backend's
//! Spanish JSON keys with serde attributes. The mock-server crate keeps its
//! own copies of these shapes; integration tests catch schema drift.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::logo::{self, LogoSource};

/// Style names offered by the add/edit flows. `Beer::style` stays free-form.
pub const SUGGESTED_STYLES: [&str; 5] = ["pilsen", "amber", "ipa", "porter", "lager"];

/// Display partition a manufacturer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    National,
    Imported,
}

impl Category {
    /// Lowercase token stored in `Manufacturer::category` and sent as `tipo`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::National => "nacionales",
            Category::Imported => "importadas",
        }
    }

    /// Exact, case-sensitive match against the wire tokens.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "nacionales" => Some(Category::National),
            "importadas" => Some(Category::Imported),
            _ => None,
        }
    }
}

/// A beer producer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manufacturer {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Raw category token. Anything other than the two `Category` tokens
    /// keeps the manufacturer out of both partitions.
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "cervezas", default, skip_serializing_if = "Option::is_none")]
    pub beers: Option<Vec<Beer>>,
}

impl Manufacturer {
    pub fn category_kind(&self) -> Option<Category> {
        Category::from_wire(&self.category)
    }

    pub fn logo_source(&self) -> LogoSource {
        logo::resolve(self.logo.as_deref())
    }
}

/// A beer belonging to one manufacturer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Beer {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Alcohol by volume.
    #[serde(rename = "grados")]
    pub abv: f32,
    #[serde(rename = "kcal")]
    pub calories: f32,
    #[serde(rename = "is_fav")]
    pub is_favorite: bool,
}

impl Beer {
    pub fn logo_source(&self) -> LogoSource {
        logo::resolve(self.logo.as_deref())
    }
}

/// Input for the add-manufacturer flow.
///
/// Not serialized directly: the request body is assembled as a loose
/// key/value object (see `BeerCenterClient::build_add_manufacturer`).
#[derive(Debug, Clone, PartialEq)]
pub struct NewManufacturer {
    pub name: String,
    pub logo: Option<String>,
    pub category: Category,
}

impl NewManufacturer {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)
    }

    /// Build the record the catalog appends locally after the server accepts
    /// the manufacturer. The id is generated here, never taken from the echo.
    pub fn into_local_record(self) -> Manufacturer {
        Manufacturer {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            category: self.category.as_str().to_string(),
            logo: self.logo,
            beers: None,
        }
    }
}

/// Request payload for `POST /cerveza/addCerveza`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBeer {
    #[serde(rename = "id_fabricante")]
    pub manufacturer_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub style: String,
    /// Sent as an empty string when no logo was chosen.
    #[serde(default)]
    pub logo: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "grados")]
    pub abv: f32,
    #[serde(rename = "kcal")]
    pub calories: f32,
}

impl NewBeer {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("manufacturer_id", &self.manufacturer_id)?;
        validate_beer_fields(&self.name, &self.style, &self.description, self.abv, self.calories)
    }
}

/// Request payload for `PUT /cerveza/updateCerveza`. Every field is sent;
/// the backend replaces the stored beer wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeerUpdate {
    #[serde(rename = "id_cerveza")]
    pub beer_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub style: String,
    #[serde(default)]
    pub logo: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "grados")]
    pub abv: f32,
    #[serde(rename = "kcal")]
    pub calories: f32,
}

impl BeerUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("beer_id", &self.beer_id)?;
        validate_beer_fields(&self.name, &self.style, &self.description, self.abv, self.calories)
    }

    /// Apply the submitted fields to a local copy, keeping the favorite flag.
    pub fn apply_to(&self, beer: &mut Beer) {
        beer.name = self.name.clone();
        beer.style = self.style.clone();
        beer.logo = if self.logo.is_empty() {
            None
        } else {
            Some(self.logo.clone())
        };
        beer.description = self.description.clone();
        beer.abv = self.abv;
        beer.calories = self.calories;
    }
}

/// Request payload for `PUT /cerveza/favCerveza`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteToggle {
    #[serde(rename = "id_cerveza")]
    pub beer_id: String,
}

/// Response of `getFabricantes`, also echoed back by `addFabricante`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManufacturersEnvelope {
    #[serde(default)]
    pub fabricantes: Vec<Manufacturer>,
    #[serde(default)]
    pub message: String,
}

/// Response of the beer endpoints. `cervezas` is `null` when the
/// manufacturer has no beers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BeersEnvelope {
    #[serde(default)]
    pub cervezas: Option<Vec<Beer>>,
    #[serde(default)]
    pub message: String,
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_amount(field: &str, value: f32) -> Result<(), ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn validate_beer_fields(
    name: &str,
    style: &str,
    description: &str,
    abv: f32,
    calories: f32,
) -> Result<(), ApiError> {
    require_text("name", name)?;
    require_text("style", style)?;
    require_text("description", description)?;
    require_amount("abv", abv)?;
    require_amount("calories", calories)
}
