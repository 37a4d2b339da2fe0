//! Catalog service listings, their patches and search filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{Amount, ServiceId, User, UserId};

/// Maximum length of a service title.
pub const TITLE_MAX: usize = 200;

/// Validation failures for service payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceValidationError {
    /// Title was blank once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeds [`TITLE_MAX`] characters.
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Category label is not recognised.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// Price type label is not recognised.
    #[error("unknown price type: {0}")]
    UnknownPriceType(String),
    /// Price bounds are inverted.
    #[error("minPrice must not exceed maxPrice")]
    InvertedPriceRange,
}

/// Kind of service a vendor offers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Decorator,
    Caterer,
    Musician,
    Photographer,
    Host,
    Venue,
    #[default]
    Other,
}

impl ServiceCategory {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decorator => "decorator",
            Self::Caterer => "caterer",
            Self::Musician => "musician",
            Self::Photographer => "photographer",
            Self::Host => "host",
            Self::Venue => "venue",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = ServiceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decorator" => Ok(Self::Decorator),
            "caterer" => Ok(Self::Caterer),
            "musician" => Ok(Self::Musician),
            "photographer" => Ok(Self::Photographer),
            "host" => Ok(Self::Host),
            "venue" => Ok(Self::Venue),
            "other" => Ok(Self::Other),
            other => Err(ServiceValidationError::UnknownCategory(other.to_owned())),
        }
    }
}

/// How the price is applied.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    #[default]
    Fixed,
    PerHead,
    Package,
}

impl PriceType {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::PerHead => "per_head",
            Self::Package => "package",
        }
    }
}

impl FromStr for PriceType {
    type Err = ServiceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "per_head" => Ok(Self::PerHead),
            "package" => Ok(Self::Package),
            other => Err(ServiceValidationError::UnknownPriceType(other.to_owned())),
        }
    }
}

/// Service title, trimmed and bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "DJ Set")]
pub struct Title(String);

impl Title {
    /// Trim and validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ServiceValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ServiceValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(ServiceValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl TryFrom<String> for Title {
    type Error = ServiceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Review embedded in a service. Owned exclusively by that service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: UserId,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Bookable service offered by a vendor.
///
/// ## Invariants
/// - `vendor_id` is set at creation and never changes.
/// - `rating` starts at zero; no operation appends reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    pub vendor_id: UserId,
    pub title: Title,
    pub category: ServiceCategory,
    pub description: String,
    pub photos: Vec<String>,
    pub price: Amount,
    pub price_type: PriceType,
    pub availability: Vec<String>,
    pub perks: Vec<String>,
    pub rating: f64,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
}

impl Service {
    /// Materialise a new listing owned by `vendor_id`.
    #[must_use]
    pub fn create(
        id: ServiceId,
        vendor_id: UserId,
        draft: ServiceDraft,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            vendor_id,
            title: draft.title,
            category: draft.category,
            description: draft.description,
            photos: draft.photos,
            price: draft.price,
            price_type: draft.price_type,
            availability: draft.availability,
            perks: draft.perks,
            rating: 0.0,
            reviews: Vec::new(),
            created_at,
        }
    }

    /// Apply a sparse patch; absent fields are left untouched.
    pub fn apply(&mut self, patch: ServicePatch) {
        let ServicePatch {
            title,
            category,
            description,
            photos,
            price,
            price_type,
            availability,
            perks,
        } = patch;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = category {
            self.category = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = photos {
            self.photos = value;
        }
        if let Some(value) = price {
            self.price = value;
        }
        if let Some(value) = price_type {
            self.price_type = value;
        }
        if let Some(value) = availability {
            self.availability = value;
        }
        if let Some(value) = perks {
            self.perks = value;
        }
    }
}

/// Fields a vendor supplies when publishing a service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub title: Title,
    pub category: ServiceCategory,
    pub description: String,
    pub photos: Vec<String>,
    pub price: Amount,
    pub price_type: PriceType,
    pub availability: Vec<String>,
    pub perks: Vec<String>,
}

impl ServiceDraft {
    /// Draft with only the required fields set and defaults elsewhere.
    #[must_use]
    pub fn new(title: Title, price: Amount) -> Self {
        Self {
            title,
            category: ServiceCategory::default(),
            description: String::new(),
            photos: Vec::new(),
            price,
            price_type: PriceType::default(),
            availability: Vec::new(),
            perks: Vec::new(),
        }
    }
}

/// Sparse service update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePatch {
    pub title: Option<Title>,
    pub category: Option<ServiceCategory>,
    pub description: Option<String>,
    pub photos: Option<Vec<String>>,
    pub price: Option<Amount>,
    pub price_type: Option<PriceType>,
    pub availability: Option<Vec<String>>,
    pub perks: Option<Vec<String>>,
}

/// Conjunctive catalog search filter.
///
/// Every present criterion must match:
/// - `query`: case-insensitive substring of title or description.
/// - `category`: exact match.
/// - `min_price`/`max_price`: inclusive bounds.
/// - `city`: case-insensitive match on the vendor's city.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceSearch {
    query: Option<String>,
    category: Option<ServiceCategory>,
    min_price: Option<Amount>,
    max_price: Option<Amount>,
    city: Option<String>,
}

impl ServiceSearch {
    /// Validate and normalise search criteria. Blank strings are ignored.
    pub fn try_new(
        query: Option<String>,
        category: Option<ServiceCategory>,
        min_price: Option<Amount>,
        max_price: Option<Amount>,
        city: Option<String>,
    ) -> Result<Self, ServiceValidationError> {
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(ServiceValidationError::InvertedPriceRange);
            }
        }
        let normalise = |value: Option<String>| {
            value
                .map(|raw| raw.trim().to_owned())
                .filter(|trimmed| !trimmed.is_empty())
        };
        Ok(Self {
            query: normalise(query),
            category,
            min_price,
            max_price,
            city: normalise(city),
        })
    }

    /// Free-text fragment, trimmed.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Exact category filter.
    pub fn category(&self) -> Option<ServiceCategory> {
        self.category
    }

    /// Inclusive lower price bound.
    pub fn min_price(&self) -> Option<Amount> {
        self.min_price
    }

    /// Inclusive upper price bound.
    pub fn max_price(&self) -> Option<Amount> {
        self.max_price
    }

    /// Vendor city filter, trimmed.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Evaluate the filter against a service and its vendor's city.
    ///
    /// Storage adapters that cannot push the filter down use this directly.
    #[must_use]
    pub fn matches(&self, service: &Service, vendor_city: Option<&str>) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let in_title = service.title.as_ref().to_lowercase().contains(&needle);
            let in_description = service.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        if self.category.is_some_and(|category| category != service.category) {
            return false;
        }
        if self.min_price.is_some_and(|min| service.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| service.price > max) {
            return false;
        }
        match (&self.city, vendor_city) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.to_lowercase() == actual.to_lowercase(),
            (Some(_), None) => false,
        }
    }
}

/// Vendor fields joined into search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    pub id: UserId,
    pub name: String,
    pub city: Option<String>,
}

impl From<&User> for VendorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            city: user.city.clone(),
        }
    }
}

/// Vendor contact fields joined into a service detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorContact {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl From<&User> for VendorContact {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            email: user.email.to_string(),
            phone: user.phone.clone(),
            city: user.city.clone(),
        }
    }
}

/// Search result row: the service plus a vendor summary.
///
/// `vendor` is `None` when the vendor record no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    #[serde(flatten)]
    pub service: Service,
    pub vendor: Option<VendorSummary>,
}

/// Single service view with vendor contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: Service,
    pub vendor: Option<VendorContact>,
}
