//! Category filter for the summary lookup.
//!
//! A category is compared with the store's case-insensitive equality
//! (collation at secondary strength), never interpolated into a pattern.

use crate::models::SUMMARY_FIELDS;
use mongodb::bson::{doc, Document};
use mongodb::options::{Collation, CollationStrength, FindOptions};

/// Literal category meaning "no filter". Compared case-sensitively.
pub const ALL_CATEGORIES: &str = "all";

const COLLATION_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Exact(String),
}

impl CategoryFilter {
    /// Builds a filter from the raw `category` query parameter.
    ///
    /// A missing or empty parameter behaves like the `all` sentinel.
    pub fn from_param(category: Option<&str>) -> Self {
        match category {
            None | Some("") | Some(ALL_CATEGORIES) => CategoryFilter::All,
            Some(category) => CategoryFilter::Exact(category.to_string()),
        }
    }

    pub fn to_document(&self) -> Document {
        match self {
            CategoryFilter::All => doc! {},
            CategoryFilter::Exact(category) => doc! { "category": category.as_str() },
        }
    }

    /// Projection onto the public fields, plus the case-insensitive collation for exact matches.
    pub fn find_options(&self) -> FindOptions {
        let mut projection = doc! { "_id": 0 };
        for field in SUMMARY_FIELDS {
            projection.insert(field, 1);
        }

        let mut options = FindOptions::builder().projection(projection).build();
        if let CategoryFilter::Exact(_) = self {
            options.collation = Some(
                Collation::builder()
                    .locale(COLLATION_LOCALE)
                    .strength(CollationStrength::Secondary)
                    .build(),
            );
        }
        options
    }

    /// Whether a record with the given category passes this filter.
    pub fn matches(&self, category: Option<&str>) -> bool {
        match (self, category) {
            (CategoryFilter::All, _) => true,
            (CategoryFilter::Exact(wanted), Some(actual)) => {
                wanted.to_lowercase() == actual.to_lowercase()
            }
            (CategoryFilter::Exact(_), None) => false,
        }
    }
}
