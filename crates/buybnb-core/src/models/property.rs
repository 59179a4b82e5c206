use serde::{Deserialize, Serialize};

use crate::utils::format_price;

/// A property record as returned by `GET /api/properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(rename = "numBedrooms", default)]
    pub num_bedrooms: Option<f64>,
    #[serde(rename = "numBathrooms", default)]
    pub num_bathrooms: Option<f64>,
    #[serde(rename = "squareFeet", default)]
    pub square_feet: Option<f64>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// Accept ids sent either as JSON strings or numbers.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.to_string()))
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

/// Treat an explicit JSON null like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A listing in the form the search page displays it.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyListing {
    pub id: String,
    pub name: String,
    pub city: String,
    /// Already formatted for display (see `format_price`).
    pub price: String,
    pub lat: f64,
    pub lng: f64,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub sqft: Option<f64>,
    pub image: Option<String>,
}

impl From<Property> for PropertyListing {
    fn from(p: Property) -> Self {
        Self {
            id: p.id.unwrap_or_default(),
            name: p.title,
            city: p.city,
            price: format_price(p.price.unwrap_or_default()),
            lat: p.latitude,
            lng: p.longitude,
            beds: p.num_bedrooms,
            baths: p.num_bathrooms,
            sqft: p.square_feet,
            image: p.image_url,
        }
    }
}

impl PropertyListing {
    /// "3 beds • 2 baths • 1200 sqft"
    pub fn summary(&self) -> String {
        fn count(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        }
        format!(
            "{} beds • {} baths • {} sqft",
            count(self.beds),
            count(self.baths),
            count(self.sqft)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": 7,
        "title": "Sea-facing flat",
        "city": "Mumbai",
        "price": 25000000,
        "latitude": 19.076,
        "longitude": 72.8777,
        "numBedrooms": 3,
        "numBathrooms": 2.5,
        "squareFeet": 1450,
        "imageUrl": "https://img.example.com/7.webp"
    }"#;

    #[test]
    fn test_property_deserialize() {
        let p: Property = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(p.id.as_deref(), Some("7"));
        assert_eq!(p.title, "Sea-facing flat");
        assert_eq!(p.num_bedrooms, Some(3.0));
        assert_eq!(p.num_bathrooms, Some(2.5));
        assert_eq!(p.image_url.as_deref(), Some("https://img.example.com/7.webp"));
    }

    #[test]
    fn test_property_string_id_and_missing_fields() {
        let p: Property = serde_json::from_str(r#"{"id":"abc","title":"Plot","city":"Pune"}"#).unwrap();
        assert_eq!(p.id.as_deref(), Some("abc"));
        assert_eq!(p.price, None);
        assert_eq!(p.num_bedrooms, None);
        assert_eq!(p.latitude, 0.0);
    }

    #[test]
    fn test_null_fields_do_not_fail_the_list() {
        let json = r#"[
            {"id":1,"title":"Villa","city":"Goa","latitude":null,"longitude":null},
            {"id":2,"title":null,"city":null,"latitude":18.52,"longitude":73.85}
        ]"#;
        let properties: Vec<Property> = serde_json::from_str(json).unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].latitude, 0.0);
        assert_eq!(properties[0].longitude, 0.0);
        assert_eq!(properties[1].title, "");
        assert_eq!(properties[1].latitude, 18.52);
    }

    #[test]
    fn test_listing_from_property() {
        let p: Property = serde_json::from_str(SAMPLE).unwrap();
        let listing = PropertyListing::from(p);
        assert_eq!(listing.id, "7");
        assert_eq!(listing.name, "Sea-facing flat");
        assert_eq!(listing.price, "₹2.5 Cr");
        assert_eq!(listing.lat, 19.076);
        assert_eq!(listing.lng, 72.8777);
        assert_eq!(listing.summary(), "3 beds • 2.5 baths • 1450 sqft");
    }

    #[test]
    fn test_listing_summary_missing_counts() {
        let p: Property = serde_json::from_str(r#"{"id":1,"title":"Plot"}"#).unwrap();
        let listing = PropertyListing::from(p);
        assert_eq!(listing.price, "");
        assert_eq!(listing.summary(), "- beds • - baths • - sqft");
    }
}
