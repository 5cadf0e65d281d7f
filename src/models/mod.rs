use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of building a listing describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Condo,
        PropertyType::Townhouse,
        PropertyType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Land => "land",
        }
    }
}

impl FromStr for PropertyType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Rent => "rent",
        }
    }
}

impl FromStr for ListingType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sale" => Ok(ListingType::Sale),
            "rent" => Ok(ListingType::Rent),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that did not name any variant of the target enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized value: {0:?}")]
pub struct UnknownVariant(pub String);

/// One listing as returned by the property search endpoint.
///
/// The server owns these records; the client never mutates them. Fields the
/// backend serializes loosely (decimals as strings, unknown enum values) are
/// decoded leniently so one odd record does not fail a whole page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "lenient")]
    pub listing_type: Option<ListingType>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub monthly_rent: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bathrooms: Option<f64>,
    #[serde(default, alias = "area", deserialize_with = "lenient_number")]
    pub total_area: Option<f64>,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default, alias = "image_urls")]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PropertyRecord {
    /// Price to show on a card: monthly rent for rentals, sale price otherwise
    pub fn display_price(&self) -> Option<f64> {
        match self.listing_type {
            Some(ListingType::Rent) => self.monthly_rent.or(self.price),
            _ => self.price,
        }
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.featured_image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.images.first().map(String::as_str))
    }

    /// Location line for a card, preferring the street location over the city
    pub fn place(&self) -> Option<&str> {
        self.location
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.city.as_deref())
    }
}

/// Short review attached to a property detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Full record served by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub summary: PropertyRecord,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub inquiries_count: u64,
    #[serde(default)]
    pub favorites_count: u64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// An inquiry as listed on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inquiry {
    pub id: u64,
    #[serde(default)]
    pub property: Option<u64>,
    #[serde(default)]
    pub property_title: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub inquiry_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A saved listing; the server nests the full property record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub id: u64,
    pub property: PropertyRecord,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Profile created alongside a new account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Decode `T` when the value has the expected shape, otherwise `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Numbers may arrive as JSON numbers or as decimal strings ("1250000.00")
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_decimal_strings_and_unknown_enums() {
        let record: PropertyRecord = serde_json::from_value(json!({
            "id": 7,
            "title": "Loft",
            "property_type": "castle",
            "listing_type": "rent",
            "price": "1250000.00",
            "monthly_rent": 2400,
            "bathrooms": "1.5",
            "area": 80,
            "image_urls": ["a.jpg", "b.jpg"]
        }))
        .unwrap();

        assert_eq!(record.property_type, None);
        assert_eq!(record.listing_type, Some(ListingType::Rent));
        assert_eq!(record.price, Some(1_250_000.0));
        assert_eq!(record.bathrooms, Some(1.5));
        assert_eq!(record.total_area, Some(80.0));
        assert_eq!(record.display_price(), Some(2400.0));
        assert_eq!(record.primary_image(), Some("a.jpg"));
    }

    #[test]
    fn sale_listing_shows_sale_price() {
        let record: PropertyRecord = serde_json::from_value(json!({
            "id": 1,
            "listing_type": "sale",
            "price": 500000,
            "monthly_rent": 1800,
            "featured_image_url": "hero.jpg",
            "images": ["other.jpg"],
            "city": "Nairobi"
        }))
        .unwrap();

        assert_eq!(record.display_price(), Some(500_000.0));
        assert_eq!(record.primary_image(), Some("hero.jpg"));
        assert_eq!(record.place(), Some("Nairobi"));
    }

    #[test]
    fn property_type_parses_case_insensitively() {
        assert_eq!("Condo".parse::<PropertyType>(), Ok(PropertyType::Condo));
        assert!("castle".parse::<PropertyType>().is_err());
        assert_eq!("RENT".parse::<ListingType>(), Ok(ListingType::Rent));
    }

    #[test]
    fn detail_flattens_summary_fields() {
        let detail: PropertyDetail = serde_json::from_value(json!({
            "id": 3,
            "title": "Villa",
            "description": "Sea view",
            "reviews": [{"id": 1, "rating": 5, "comment": "Great"}]
        }))
        .unwrap();

        assert_eq!(detail.summary.title, "Villa");
        assert_eq!(detail.description, "Sea view");
        assert_eq!(detail.reviews.len(), 1);
    }
}
