use serde::{Deserialize, Serialize};
use url::Url;

/// Stand-in url for a product card without a link.
pub const MISSING_URL: &str = "not found";

/// One in-stock product card. Identity is the relative `url`; `name` is only
/// shown to people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub url: String,
}

impl Product {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn has_link(&self) -> bool {
        self.url != MISSING_URL
    }

    /// Link to the product on the watched site.
    pub fn absolute_url(&self, origin: &str) -> String {
        if !self.has_link() {
            return origin.to_string();
        }

        match Url::parse(origin).and_then(|base| base.join(&self.url)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", origin.trim_end_matches('/'), self.url),
        }
    }
}
