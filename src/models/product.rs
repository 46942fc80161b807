use serde::{Deserialize, Serialize};
use std::fmt;

// NewType for the sink's dedup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One normalized product taken from a search page.
///
/// Every field is optional because the upstream state is untrusted. A record
/// with all fields absent is still a valid record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
}

impl ProductRecord {
    /// Stable hash over the normalized fields, used by storage to ignore
    /// repeated inserts of the same product.
    pub fn fingerprint(&self) -> Fingerprint {
        use md5::Context;

        let norm = |field: &Option<String>| {
            field
                .as_deref()
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_default()
        };

        // Absent and empty fields hash the same; position is preserved by the separator.
        let components = [
            norm(&self.id),
            norm(&self.name),
            norm(&self.brand),
            norm(&self.price),
            norm(&self.product_url),
            norm(&self.image_url),
            norm(&self.description),
        ];

        let mut hasher = Context::new();
        hasher.consume(components.join("|").as_bytes());
        Fingerprint(format!("{:x}", hasher.compute()))
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.description.is_none()
            && self.name.is_none()
            && self.brand.is_none()
            && self.price.is_none()
            && self.image_url.is_none()
            && self.product_url.is_none()
    }
}
