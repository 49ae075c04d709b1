//! Shopify REST payloads and pagination headers.

use serde::{Deserialize, Serialize};

use crate::catalog::error::CatalogError;
use crate::catalog::model::{Collection, CollectionKind, Product};

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsPage {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductRecord {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product::new(record.id.to_string(), record.title)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomCollectionsPage {
    #[serde(default)]
    pub custom_collections: Vec<CollectionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SmartCollectionsPage {
    #[serde(default)]
    pub smart_collections: Vec<CollectionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionRecord {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

impl CollectionRecord {
    pub fn into_collection(self, kind: CollectionKind) -> Collection {
        Collection {
            id: self.id.to_string(),
            title: self.title,
            kind,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectsPage {
    #[serde(default)]
    pub collects: Vec<CollectRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectRecord {
    pub collection_id: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCollectRequest {
    pub collect: NewCollect,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewCollect {
    pub product_id: u64,
    pub collection_id: u64,
}

impl CreateCollectRequest {
    pub fn new(product_id: &str, collection_id: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            collect: NewCollect {
                product_id: parse_id("product_id", product_id)?,
                collection_id: parse_id("collection_id", collection_id)?,
            },
        })
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<u64, CatalogError> {
    value.trim().parse().map_err(|_| CatalogError::InvalidId {
        field,
        value: value.to_string(),
    })
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header.
///
/// Shopify sends e.g.
/// `<https://x/admin/api/2025-01/products.json?page_info=abc&limit=250>; rel="next"`,
/// possibly preceded by a `rel="previous"` entry.
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
