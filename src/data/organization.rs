use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration status of an organization in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrgStatus {
    Active,
    Inactive,
    #[default]
    Pending,
}

impl OrgStatus {
    /// Parse a status cell from a spreadsheet export.
    /// Unknown values are treated as Pending so a typo never drops a record.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "active" | "активна" | "активний" => OrgStatus::Active,
            "inactive" | "неактивна" | "неактивний" => OrgStatus::Inactive,
            _ => OrgStatus::Pending,
        }
    }

    /// Ukrainian label shown in the table badge
    pub fn label(&self) -> &'static str {
        match self {
            OrgStatus::Active => "Активна",
            OrgStatus::Inactive => "Неактивна",
            OrgStatus::Pending => "Очікує",
        }
    }
}

impl fmt::Display for OrgStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrgStatus::Active => "Active",
            OrgStatus::Inactive => "Inactive",
            OrgStatus::Pending => "Pending",
        };
        write!(f, "{}", s)
    }
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// One social-service provider record in the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub lat: f64,
    #[serde(default = "nan", deserialize_with = "lenient_number")]
    pub lng: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub services: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: OrgStatus,
    #[serde(default, alias = "drive_folder_url")]
    pub drive_folder_url: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub budget: f64,
}

fn nan() -> f64 {
    f64::NAN
}

/// Accepts numbers, numeric strings, blanks and nulls. Anything that is not
/// a number becomes NaN, which marks a coordinate as unmappable.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

/// Spreadsheet exports often carry numeric ids; keep them as text
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s.trim().to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid organization id: {}", other))),
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<OrgStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => OrgStatus::parse_lenient(&s),
        _ => OrgStatus::Pending,
    })
}

impl Organization {
    /// Coordinates if both are usable for map rendering
    pub fn location(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.lat, self.lng);
        point.is_valid().then_some(point)
    }

    pub fn is_mappable(&self) -> bool {
        self.location().is_some()
    }

    /// Case-insensitive substring match against name, category or address.
    /// `needle_lower` must already be lowercased.
    pub fn matches_lowercase(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle_lower)
            || self.category.to_lowercase().contains(needle_lower)
            || self.address.to_lowercase().contains(needle_lower)
    }

    /// Budget rendered with thin grouping, e.g. `25 000 000 ₴`
    pub fn budget_display(&self) -> String {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return "—".to_string();
        }
        let whole = self.budget.round() as u64;
        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(ch);
        }
        format!("{} ₴", grouped)
    }
}
