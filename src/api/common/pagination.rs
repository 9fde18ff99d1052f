//
//  circleci
//  api/common/pagination.rs
//

//! Pagination envelope for CircleCI v2 list endpoints.
//!
//! Every list endpoint in the v2 API returns the same shape: an `items` array
//! plus an opaque `next_page_token` cursor. Iteration is manual by design —
//! pass the token back through the endpoint's `page_token` option to fetch
//! the following page.

use serde::{Deserialize, Serialize};

/// A single page of results from a v2 list endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use circleci::{Client, Config};
/// use circleci::api::contexts::ContextListOptions;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), circleci::Error> {
/// let client = Client::new(Config::default())?;
/// let cancel = CancellationToken::new();
///
/// let mut options = ContextListOptions {
///     owner_slug: Some("gh/acme".to_string()),
///     ..ContextListOptions::default()
/// };
///
/// loop {
///     let page = client.contexts().list(&cancel, options.clone()).await?;
///     for context in &page.items {
///         println!("{}", context.name);
///     }
///     match page.next_page_token() {
///         Some(token) => options.page_token = Some(token.to_string()),
///         None => break,
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paged<T> {
    /// Items in the current page. May be empty.
    pub items: Vec<T>,

    /// Opaque cursor for the next page. Absent (or empty) on the last page.
    pub next_page_token: Option<String>,
}

impl<T> Paged<T> {
    /// Whether another page is available.
    ///
    /// Some endpoints report the last page as an empty-string token rather
    /// than omitting the field; both count as "no next page".
    pub fn has_next(&self) -> bool {
        self.next_page_token().is_some()
    }

    /// The cursor for the next page, if any.
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

// Manual impl: `#[derive(Default)]` would require `T: Default`, which the
// item types do not all need.
impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_next() {
        let mut page: Paged<String> = Paged::default();
        assert!(!page.has_next());

        page.next_page_token = Some(String::new());
        assert!(!page.has_next());

        page.next_page_token = Some("cursor".to_string());
        assert!(page.has_next());
        assert_eq!(page.next_page_token(), Some("cursor"));
    }

    #[test]
    fn test_deserialize_partial_page() {
        let page: Paged<serde_json::Value> = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
