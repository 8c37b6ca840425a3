//! API Response types
//!
//! The remote CEMAC API answers in a handful of shapes. Single resources come
//! back either bare or as `{ "success": true, "data": {...} }`; lists come back
//! as a bare array, as `{ "data": [...], "total": n }`, under a resource named
//! key (`sales`, `customers`, ...), or nested one level under `data`.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Envelope used by the remote API for single resources and errors
///
/// ```json
/// {
///     "success": true,
///     "message": "Venta registrada",
///     "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        alias = "sale",
        alias = "customer",
        alias = "product",
        alias = "alert"
    )]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: Some(true),
            message: None,
            error: None,
            data: Some(data),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: None,
            error: Some(message.into()),
            data: None,
        }
    }

    /// Whether the server flagged this response as failed
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// Best human readable message carried by the envelope
    pub fn message_text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Either a bare resource or the resource wrapped in [`ApiResponse`]
///
/// An object is treated as an envelope only when it carries a `success` or a
/// payload key; everything else is parsed as the bare resource.
#[derive(Debug, Clone)]
pub enum MaybeWrapped<T> {
    Wrapped(ApiResponse<T>),
    Bare(T),
}

const ENVELOPE_KEYS: &[&str] = &["success", "data", "sale", "customer", "product", "alert"];

impl<'de, T: DeserializeOwned> Deserialize<'de> for MaybeWrapped<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_envelope = value
            .as_object()
            .is_some_and(|obj| ENVELOPE_KEYS.iter().any(|k| obj.contains_key(*k)));
        if is_envelope {
            serde_json::from_value(value)
                .map(Self::Wrapped)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Bare)
                .map_err(D::Error::custom)
        }
    }
}

impl<T> MaybeWrapped<T> {
    /// Unwrap the payload; `Err` carries the server message when the envelope had no data
    pub fn into_data(self) -> Result<T, String> {
        match self {
            Self::Bare(value) => Ok(value),
            Self::Wrapped(resp) => {
                let message = resp
                    .message_text()
                    .unwrap_or("Respuesta sin datos")
                    .to_string();
                match resp.data {
                    Some(data) if !resp.is_failure() => Ok(data),
                    _ => Err(message),
                }
            }
        }
    }
}

/// Pagination metadata reported by list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, alias = "totalItems", alias = "totalCount")]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// A list of resources plus the server-reported total when there is one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    from = "RawListing<T>",
    bound(deserialize = "T: Deserialize<'de>", serialize = "T: Serialize")
)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Total number of records on the server (may exceed `items.len()`)
    pub total: Option<u64>,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, total: Option<u64>) -> Self {
        Self { items, total }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEnvelope<T> {
    #[serde(
        alias = "sales",
        alias = "items",
        alias = "customers",
        alias = "products",
        alias = "alerts",
        alias = "users",
        alias = "brands",
        alias = "suppliers",
        alias = "categories",
        alias = "results"
    )]
    data: Vec<T>,
    #[serde(default, alias = "totalCount", alias = "totalSales", alias = "count")]
    total: Option<u64>,
    #[serde(default)]
    pagination: Option<PageInfo>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawListing<T> {
    Bare(Vec<T>),
    Wrapped(ListEnvelope<T>),
    Nested { data: ListEnvelope<T> },
}

impl<T> From<ListEnvelope<T>> for Listing<T> {
    fn from(env: ListEnvelope<T>) -> Self {
        let total = env
            .total
            .or_else(|| env.pagination.and_then(|p| p.total));
        Self {
            items: env.data,
            total,
        }
    }
}

impl<T> From<RawListing<T>> for Listing<T> {
    fn from(raw: RawListing<T>) -> Self {
        match raw {
            RawListing::Bare(items) => Self { items, total: None },
            RawListing::Wrapped(env) => env.into(),
            RawListing::Nested { data } => data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_shapes() {
        let bare: Listing<u32> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bare.items, vec![1, 2, 3]);
        assert_eq!(bare.total, None);

        let named: Listing<u32> = serde_json::from_str(r#"{"sales":[1],"total":40}"#).unwrap();
        assert_eq!(named.items, vec![1]);
        assert_eq!(named.total, Some(40));

        let paged: Listing<u32> = serde_json::from_str(
            r#"{"success":true,"data":[5,6],"pagination":{"page":1,"total":12}}"#,
        )
        .unwrap();
        assert_eq!(paged.items, vec![5, 6]);
        assert_eq!(paged.total, Some(12));

        let nested: Listing<u32> =
            serde_json::from_str(r#"{"success":true,"data":{"customers":[9],"totalCount":3}}"#)
                .unwrap();
        assert_eq!(nested.items, vec![9]);
        assert_eq!(nested.total, Some(3));
    }

    #[test]
    fn test_maybe_wrapped() {
        let bare: MaybeWrapped<Vec<u8>> = serde_json::from_str("[1]").unwrap();
        assert_eq!(bare.into_data().unwrap(), vec![1]);

        let wrapped: MaybeWrapped<Vec<u8>> =
            serde_json::from_str(r#"{"success":true,"data":[2]}"#).unwrap();
        assert_eq!(wrapped.into_data().unwrap(), vec![2]);

        let bare_obj: MaybeWrapped<PageInfo> = serde_json::from_str(r#"{"page":2}"#).unwrap();
        assert_eq!(bare_obj.into_data().unwrap().page, Some(2));

        let failed: MaybeWrapped<Vec<u8>> =
            serde_json::from_str(r#"{"success":false,"message":"Stock insuficiente"}"#).unwrap();
        assert_eq!(failed.into_data().unwrap_err(), "Stock insuficiente");
    }

    /// Payload type with no `Default` impl
    #[derive(Debug, PartialEq, Deserialize)]
    struct Folio {
        id: String,
    }

    #[test]
    fn test_envelope_payload_needs_no_default() {
        let sale: MaybeWrapped<Folio> =
            serde_json::from_str(r#"{"success":true,"sale":{"id":"v-7"}}"#).unwrap();
        assert_eq!(sale.into_data().unwrap(), Folio { id: "v-7".into() });

        let empty: ApiResponse<Folio> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(empty.data.is_none());
    }

    #[test]
    fn test_sale_listing_tolerates_mixed_records() {
        use crate::models::Sale;

        let listing: Listing<Sale> = serde_json::from_str(
            r#"{"success":true,"sales":[
                {"_id":"m1","id":"m1","total":5},
                {"id":"m2","createdAt":1714557600000.0},
                {"_id":"m3","createdAt":"hace rato"}
            ]}"#,
        )
        .unwrap();

        let ids: Vec<&str> = listing.items.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
        assert_eq!(listing.items[0].total, 5.0);
        assert_eq!(
            listing.items[1].created_at_utc().map(|t| t.timestamp()),
            Some(1_714_557_600)
        );
        assert!(listing.items[2].created_at.is_none());

        // stored and re-read sales keep a single `id` key
        let json = serde_json::to_value(&listing.items[0]).unwrap();
        assert_eq!(json["id"], "m1");
        assert!(json.get("_id").is_none());
    }
}
