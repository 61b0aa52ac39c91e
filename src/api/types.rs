//! Inventory API request and response types.
//!
//! These types model the server's REST responses for stock items, parts
//! and paginated listings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The current authenticated user.
///
/// Returned by `GET /api/user/me/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The user's primary key.
    pub pk: i64,
    /// The login name.
    pub username: String,
    /// The user's first name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// The user's last name.
    #[serde(default)]
    pub last_name: Option<String>,
}

impl CurrentUser {
    /// Get a human-readable name, falling back to the login name.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            (Some(first), _) if !first.is_empty() => first.clone(),
            _ => self.username.clone(),
        }
    }
}

/// Response from the token acquisition endpoint.
///
/// Returned by `GET /api/user/token/` under Basic auth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The API token.
    pub token: String,
}

/// One page of an offset/limit paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PagedResults<T> {
    /// Total number of records matching the query.
    pub count: u32,
    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
    /// The records on this page.
    #[serde(default)]
    pub results: Vec<T>,
}

impl<T> PagedResults<T> {
    /// Check if there are more pages after the given number of loaded records.
    pub fn has_more(&self, loaded: usize) -> bool {
        (loaded as u32) < self.count
    }
}

/// Stock status codes used by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    /// Item is in good condition.
    Ok,
    /// Item requires attention.
    Attention,
    /// Item is damaged.
    Damaged,
    /// Item has been destroyed.
    Destroyed,
    /// Item has been rejected.
    Rejected,
    /// Item has been lost.
    Lost,
    /// Item is quarantined.
    Quarantined,
    /// Item has been returned from a customer.
    Returned,
    /// A code this client does not know about.
    Unknown(i64),
}

impl StockStatus {
    /// Map a numeric status code to a status.
    pub fn from_code(code: i64) -> Self {
        match code {
            10 => StockStatus::Ok,
            50 => StockStatus::Attention,
            55 => StockStatus::Damaged,
            60 => StockStatus::Destroyed,
            65 => StockStatus::Rejected,
            70 => StockStatus::Lost,
            75 => StockStatus::Quarantined,
            85 => StockStatus::Returned,
            other => StockStatus::Unknown(other),
        }
    }

    /// Get the display label for this status.
    pub fn label(&self) -> String {
        match self {
            StockStatus::Ok => "OK".to_string(),
            StockStatus::Attention => "Attention".to_string(),
            StockStatus::Damaged => "Damaged".to_string(),
            StockStatus::Destroyed => "Destroyed".to_string(),
            StockStatus::Rejected => "Rejected".to_string(),
            StockStatus::Lost => "Lost".to_string(),
            StockStatus::Quarantined => "Quarantined".to_string(),
            StockStatus::Returned => "Returned".to_string(),
            StockStatus::Unknown(code) => format!("Status {}", code),
        }
    }

    /// Check whether the item is usable stock.
    pub fn is_good(&self) -> bool {
        matches!(self, StockStatus::Ok | StockStatus::Returned)
    }
}

/// Inline part details attached to a stock item.
///
/// Present when the listing is requested with `part_detail=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDetail {
    /// The part's primary key.
    pub pk: i64,
    /// The part name.
    pub name: String,
    /// The full display name (name + variant/revision).
    #[serde(default)]
    pub full_name: Option<String>,
    /// The part description.
    #[serde(default)]
    pub description: Option<String>,
    /// Internal part number.
    #[serde(default)]
    pub ipn: Option<String>,
}

impl PartDetail {
    /// Get the preferred display name for the part.
    pub fn display_name(&self) -> &str {
        match &self.full_name {
            Some(full) if !full.is_empty() => full,
            _ => &self.name,
        }
    }
}

/// A stock item record.
///
/// Returned by `GET /api/stock/{pk}/` or as part of listing results.
/// Listing queries request `part_detail=true` so the nested part
/// information is available without further lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    /// The record's primary key. Absent on records that cannot be
    /// navigated to (e.g. placeholder rows from some endpoints).
    #[serde(default)]
    pub pk: Option<i64>,
    /// The part this item is an instance of.
    pub part: i64,
    /// Inline details for the part, when requested.
    #[serde(default)]
    pub part_detail: Option<PartDetail>,
    /// Quantity of stock. Serialized items always have quantity 1.
    pub quantity: f64,
    /// Serial number, if the item is serialized.
    #[serde(default)]
    pub serial: Option<String>,
    /// Batch code, if any.
    #[serde(default)]
    pub batch: Option<String>,
    /// Numeric status code.
    #[serde(default = "default_status")]
    pub status: i64,
    /// The stock item this item is installed in, if any.
    #[serde(default)]
    pub belongs_to: Option<i64>,
    /// The stock location, if the item is in a location.
    #[serde(default)]
    pub location: Option<i64>,
    /// Human-readable location name, when expanded.
    #[serde(default)]
    pub location_name: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// When the stock item was last updated.
    #[serde(default)]
    pub updated: Option<String>,
    /// When the stock item last passed a stocktake.
    #[serde(default)]
    pub stocktake_date: Option<String>,
}

fn default_status() -> i64 {
    10
}

impl StockItem {
    /// Check whether this item has a serial number assigned.
    ///
    /// The server represents "no serial" as either null or an empty string.
    pub fn is_serialized(&self) -> bool {
        matches!(&self.serial, Some(s) if !s.is_empty())
    }

    /// The text shown in the quantity column.
    ///
    /// A serialized item (serial assigned, quantity exactly 1) displays its
    /// serial number prefixed with `#`. Anything else displays the raw
    /// quantity.
    pub fn quantity_display(&self) -> String {
        if self.quantity == 1.0 {
            if let Some(serial) = &self.serial {
                if !serial.is_empty() {
                    return format!("# {}", serial);
                }
            }
        }
        format_quantity(self.quantity)
    }

    /// Get the display name of the part, falling back to the bare id.
    pub fn part_name(&self) -> String {
        match &self.part_detail {
            Some(detail) => detail.display_name().to_string(),
            None => format!("Part {}", self.part),
        }
    }

    /// Get the decoded stock status.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_code(self.status)
    }

    /// Get the batch code, or an empty string if not set.
    pub fn batch_display(&self) -> &str {
        self.batch.as_deref().unwrap_or("")
    }
}

impl fmt::Display for StockItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pk {
            Some(pk) => write!(f, "#{}: {} x {}", pk, self.quantity_display(), self.part_name()),
            None => write!(f, "{} x {}", self.quantity_display(), self.part_name()),
        }
    }
}

/// Format a stock quantity for display.
///
/// Integral values render with no decimal tail; fractional values keep up
/// to five decimals with trailing zeros trimmed.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        let text = format!("{:.5}", quantity);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, serial: Option<&str>) -> StockItem {
        StockItem {
            pk: Some(1),
            part: 7,
            part_detail: None,
            quantity,
            serial: serial.map(str::to_string),
            batch: None,
            status: 10,
            belongs_to: Some(100),
            location: None,
            location_name: None,
            notes: None,
            updated: None,
            stocktake_date: None,
        }
    }

    #[test]
    fn test_quantity_display_serialized() {
        let item = item(1.0, Some("5"));
        assert_eq!(item.quantity_display(), "# 5");
    }

    #[test]
    fn test_quantity_display_plain_quantity() {
        let item = item(3.0, None);
        assert_eq!(item.quantity_display(), "3");
    }

    #[test]
    fn test_quantity_display_serial_with_quantity_above_one() {
        // A serial with quantity != 1 is not a serialized unit.
        let item = item(3.0, Some("5"));
        assert_eq!(item.quantity_display(), "3");
    }

    #[test]
    fn test_quantity_display_empty_serial() {
        let item = item(1.0, Some(""));
        assert_eq!(item.quantity_display(), "1");
    }

    #[test]
    fn test_quantity_display_fractional() {
        let item = item(2.5, None);
        assert_eq!(item.quantity_display(), "2.5");
    }

    #[test]
    fn test_format_quantity_integral() {
        assert_eq!(format_quantity(12.0), "12");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn test_format_quantity_trims_trailing_zeros() {
        assert_eq!(format_quantity(1.25), "1.25");
        assert_eq!(format_quantity(0.10000), "0.1");
    }

    #[test]
    fn test_is_serialized() {
        assert!(item(1.0, Some("A1")).is_serialized());
        assert!(!item(1.0, Some("")).is_serialized());
        assert!(!item(1.0, None).is_serialized());
    }

    #[test]
    fn test_part_name_with_detail() {
        let mut record = item(1.0, None);
        record.part_detail = Some(PartDetail {
            pk: 7,
            name: "M3 Bolt".to_string(),
            full_name: Some("M3 Bolt | Rev A".to_string()),
            description: None,
            ipn: None,
        });
        assert_eq!(record.part_name(), "M3 Bolt | Rev A");
    }

    #[test]
    fn test_part_name_fallback() {
        let record = item(1.0, None);
        assert_eq!(record.part_name(), "Part 7");
    }

    #[test]
    fn test_part_display_name_empty_full_name() {
        let detail = PartDetail {
            pk: 1,
            name: "Resistor".to_string(),
            full_name: Some(String::new()),
            description: None,
            ipn: None,
        };
        assert_eq!(detail.display_name(), "Resistor");
    }

    #[test]
    fn test_stock_status_known_codes() {
        assert_eq!(StockStatus::from_code(10), StockStatus::Ok);
        assert_eq!(StockStatus::from_code(55), StockStatus::Damaged);
        assert_eq!(StockStatus::from_code(70), StockStatus::Lost);
        assert_eq!(StockStatus::from_code(85), StockStatus::Returned);
    }

    #[test]
    fn test_stock_status_unknown_code() {
        let status = StockStatus::from_code(999);
        assert_eq!(status, StockStatus::Unknown(999));
        assert_eq!(status.label(), "Status 999");
    }

    #[test]
    fn test_stock_status_is_good() {
        assert!(StockStatus::Ok.is_good());
        assert!(StockStatus::Returned.is_good());
        assert!(!StockStatus::Damaged.is_good());
        assert!(!StockStatus::Unknown(40).is_good());
    }

    #[test]
    fn test_paged_results_has_more() {
        let page: PagedResults<StockItem> = PagedResults {
            count: 120,
            next: Some("http://example.com/api/stock/?offset=50".to_string()),
            previous: None,
            results: Vec::new(),
        };
        assert!(page.has_more(50));
        assert!(!page.has_more(120));
    }

    #[test]
    fn test_stock_item_deserialize_minimal() {
        // Records lacking pk and optional fields still deserialize.
        let json = r#"{"part": 3, "quantity": 2.0}"#;
        let record: StockItem = serde_json::from_str(json).unwrap();
        assert_eq!(record.pk, None);
        assert_eq!(record.part, 3);
        assert_eq!(record.status, 10);
        assert!(record.serial.is_none());
    }

    #[test]
    fn test_stock_item_deserialize_full() {
        let json = r#"{
            "pk": 42,
            "part": 3,
            "part_detail": {"pk": 3, "name": "Widget", "full_name": "Widget | A"},
            "quantity": 1.0,
            "serial": "100",
            "batch": "B-77",
            "status": 50,
            "belongs_to": 17
        }"#;
        let record: StockItem = serde_json::from_str(json).unwrap();
        assert_eq!(record.pk, Some(42));
        assert_eq!(record.belongs_to, Some(17));
        assert_eq!(record.quantity_display(), "# 100");
        assert_eq!(record.stock_status(), StockStatus::Attention);
    }

    #[test]
    fn test_current_user_display_name() {
        let user = CurrentUser {
            pk: 1,
            username: "alice".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: Some("Smith".to_string()),
        };
        assert_eq!(user.display_name(), "Alice Smith");

        let user = CurrentUser {
            pk: 2,
            username: "bob".to_string(),
            first_name: None,
            last_name: None,
        };
        assert_eq!(user.display_name(), "bob");
    }

    #[test]
    fn test_stock_item_display() {
        let record = item(1.0, Some("9"));
        assert_eq!(record.to_string(), "#1: # 9 x Part 7");
    }
}
