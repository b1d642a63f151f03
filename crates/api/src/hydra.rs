//! JSON-LD / Hydra response shapes.
//!
//! Items carry `@id` and `@type`. Collections are `hydra:Collection`
//! documents; `member` and `totalItems` are emitted next to their prefixed
//! names for clients that read either.

use serde::{Serialize, Serializer, ser::SerializeMap};
use uuid::Uuid;

use crate::error::ApiError;

/// Prefix every route is nested under.
pub const API_PREFIX: &str = "/api";

/// IRI of one item, e.g. `/api/leaves/{id}`.
pub fn iri(collection: &str, id: Uuid) -> String {
    format!("{API_PREFIX}/{collection}/{id}")
}

/// Extracts the ID from `/api/{collection}/{id}`, `/{collection}/{id}` or a bare UUID.
pub fn parse_iri(collection: &str, value: &str) -> Option<Uuid> {
    let value = value.trim();
    let id = value
        .strip_prefix(API_PREFIX)
        .unwrap_or(value)
        .strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(collection))
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(value);
    Uuid::parse_str(id).ok()
}

/// Parses a user reference given as IRI or UUID.
///
/// # Errors
///
/// Returns a validation error naming the offending value.
pub fn user_ref(value: &str) -> Result<Uuid, ApiError> {
    parse_iri("users", value)
        .ok_or_else(|| ApiError::validation(format!("invalid user reference: {value}")))
}

/// One resource with its IRI and type.
#[derive(Debug, Serialize)]
pub struct Item<T> {
    /// IRI.
    #[serde(rename = "@id")]
    pub id: String,
    /// Resource type.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// Resource fields.
    #[serde(flatten)]
    pub body: T,
}

impl<T> Item<T> {
    /// Wraps `body` as the `kind` resource at `/api/{collection}/{id}`.
    pub fn new(kind: &'static str, collection: &str, id: Uuid, body: T) -> Self {
        Self {
            id: iri(collection, id),
            kind,
            body,
        }
    }
}

/// A `hydra:Collection` page.
#[derive(Debug)]
pub struct Collection<T> {
    kind: &'static str,
    collection: &'static str,
    members: Vec<T>,
    total: u64,
}

impl<T> Collection<T> {
    /// Builds a page of `kind` resources served at `/api/{collection}`.
    pub const fn new(
        kind: &'static str,
        collection: &'static str,
        members: Vec<T>,
        total: u64,
    ) -> Self {
        Self {
            kind,
            collection,
            members,
            total,
        }
    }
}

impl<T: Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("@context", &format!("{API_PREFIX}/contexts/{}", self.kind))?;
        map.serialize_entry("@id", &format!("{API_PREFIX}/{}", self.collection))?;
        map.serialize_entry("@type", "hydra:Collection")?;
        map.serialize_entry("hydra:member", &self.members)?;
        map.serialize_entry("member", &self.members)?;
        map.serialize_entry("hydra:totalItems", &self.total)?;
        map.serialize_entry("totalItems", &self.total)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const ID: &str = "0190b1a8-7c3e-7d4a-9c1b-2f6e8a0b1c2d";

    #[rstest]
    #[case("/api/users/0190b1a8-7c3e-7d4a-9c1b-2f6e8a0b1c2d")]
    #[case("/users/0190b1a8-7c3e-7d4a-9c1b-2f6e8a0b1c2d")]
    #[case("0190b1a8-7c3e-7d4a-9c1b-2f6e8a0b1c2d")]
    #[case("  /api/users/0190b1a8-7c3e-7d4a-9c1b-2f6e8a0b1c2d ")]
    fn test_parse_user_iri(#[case] value: &str) {
        assert_eq!(parse_iri("users", value), Uuid::parse_str(ID).ok());
    }

    #[rstest]
    #[case("/api/leaves/0190b1a8-7c3e-7d4a-9c1b-2f6e8a0b1c2d")]
    #[case("/api/users/not-a-uuid")]
    #[case("")]
    fn test_parse_rejects_other_collections(#[case] value: &str) {
        assert_eq!(parse_iri("users", value), None);
    }

    #[test]
    fn test_user_ref_error_is_validation() {
        let err = user_ref("nope").unwrap_err();
        assert_eq!(err.0.status_code(), 400);
    }

    #[test]
    fn test_item_shape() {
        let id = Uuid::parse_str(ID).unwrap();
        let item = Item::new("Holiday", "holidays", id, json!({ "name": "Noël" }));

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["@id"], format!("/api/holidays/{ID}"));
        assert_eq!(value["@type"], "Holiday");
        assert_eq!(value["name"], "Noël");
    }

    #[test]
    fn test_collection_shape() {
        let page = Collection::new("Leave", "leaves", vec![json!({ "a": 1 })], 12);

        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["@context"], "/api/contexts/Leave");
        assert_eq!(value["@id"], "/api/leaves");
        assert_eq!(value["@type"], "hydra:Collection");
        assert_eq!(value["hydra:totalItems"], 12);
        assert_eq!(value["totalItems"], 12);
        assert_eq!(value["hydra:member"], value["member"]);
        assert_eq!(value["member"][0]["a"], 1);
    }
}
