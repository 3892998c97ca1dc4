use thiserror::Error;

use crate::config::Config;
use crate::selection::{KeywordKind, SelectionState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("no category selected")]
    MissingCategory,
}

/// Fixed hints sent with every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHints {
    pub page_size: u32,
    pub crawl_pages: u32,
}

impl From<&Config> for RequestHints {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.request_page_size,
            crawl_pages: config.crawl_pages,
        }
    }
}

/// A `/api/jobs` query derived from a selection snapshot.
///
/// `location` is set only for exactly one selected region; `allowed_keywords`
/// is omitted entirely for a full keyword selection. The job service treats
/// a missing field as "no restriction", so presence matters, not just content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub category: String,
    pub page_size: u32,
    pub crawl_pages: u32,
    pub location: Option<String>,
    pub allowed_keywords: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn from_selection(
        selection: &SelectionState,
        hints: RequestHints,
    ) -> Result<Self, RequestError> {
        let category = selection
            .category_id()
            .filter(|id| !id.is_empty())
            .ok_or(RequestError::MissingCategory)?
            .to_string();

        let location = match selection.locations() {
            [only] => Some(only.clone()),
            _ => None,
        };

        let allowed_keywords = if selection.is_full_keyword_selection() {
            None
        } else {
            let mut keywords = selection.keywords(KeywordKind::Core).to_vec();
            keywords.extend_from_slice(selection.keywords(KeywordKind::Aux));
            Some(keywords)
        };

        Ok(Self {
            category,
            page_size: hints.page_size,
            crawl_pages: hints.crawl_pages,
            location,
            allowed_keywords,
        })
    }

    /// Query pairs in wire order; `allowed_keywords` repeats once per keyword.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("category", self.category.clone()),
            ("page_size", self.page_size.to_string()),
            ("crawl_pages", self.crawl_pages.to_string()),
        ];
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(keywords) = &self.allowed_keywords {
            pairs.extend(keywords.iter().map(|kw| ("allowed_keywords", kw.clone())));
        }
        pairs
    }
}
