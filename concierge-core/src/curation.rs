//! Immutable curation policy shared by synthesis and repair.

use std::collections::HashSet;

use chrono::NaiveDate;
use concierge_common::{ConciergeError, Result};

use crate::classifier::ContentClassifier;
use crate::model::{Booking, Preferences, SearchResult};

/// Placeholder restaurant names drawn when nothing usable was generated.
pub const DEFAULT_RESTAURANT_POOL: &[&str] = &[
    "Sunset Garden Kitchen",
    "Riverside Vegan Bistro",
    "Cactus Bloom Eatery",
    "Copper Spice Cafe",
    "Maple & Thyme Diner",
    "Seaside Plant House",
    "Cedar Grove Kitchen",
    "Harvest Moon Table",
    "Saffron & Sage",
    "Pinecone Pantry",
];

/// A canned generator default that reads as filler, matched as a name prefix.
pub const DEFAULT_BANNED_RESTAURANT_PREFIX: &str = "local family restaurant";

/// What the repairer does when fewer than three candidate activities survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivityShortfall {
    /// Discard the survivors and use the synthesized activities wholesale.
    #[default]
    Replace,
    /// Keep the survivors and append synthesized activities after them.
    Retain,
}

#[derive(Debug, Clone)]
pub struct Curation {
    classifier: ContentClassifier,
    restaurant_pool: Vec<String>,
    banned_restaurant_prefix: String,
    activity_shortfall: ActivityShortfall,
}

impl Default for Curation {
    fn default() -> Self {
        Self::new(
            ContentClassifier::default(),
            DEFAULT_RESTAURANT_POOL,
            DEFAULT_BANNED_RESTAURANT_PREFIX,
            ActivityShortfall::default(),
        )
    }
}

impl Curation {
    /// Assemble a policy from configured lists.
    ///
    /// The pool is trimmed and de-duplicated case-insensitively, and names the
    /// policy itself would reject are dropped. An empty pool is allowed and
    /// leads to numbered placeholders.
    pub fn new<P, S>(
        classifier: ContentClassifier,
        restaurant_pool: P,
        banned_restaurant_prefix: &str,
        activity_shortfall: ActivityShortfall,
    ) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut curation = Self {
            classifier,
            restaurant_pool: Vec::new(),
            banned_restaurant_prefix: banned_restaurant_prefix.trim().to_lowercase(),
            activity_shortfall,
        };
        curation.restaurant_pool = normalize_pool(restaurant_pool)
            .into_iter()
            .filter(|name| !curation.is_blocked(name) && !curation.is_banned_restaurant(name))
            .collect();
        curation
    }

    /// Build the classifier from a raw pattern and deny-set, then the policy.
    pub fn from_lists<D, DS, P, PS>(
        listicle_pattern: &str,
        aggregator_domains: D,
        restaurant_pool: P,
        banned_restaurant_prefix: &str,
        activity_shortfall: ActivityShortfall,
    ) -> Result<Self>
    where
        D: IntoIterator<Item = DS>,
        DS: AsRef<str>,
        P: IntoIterator<Item = PS>,
        PS: AsRef<str>,
    {
        let classifier = ContentClassifier::new(listicle_pattern, aggregator_domains)
            .map_err(|e| ConciergeError::Config(format!("invalid listicle pattern: {e}")))?;
        Ok(Self::new(
            classifier,
            restaurant_pool,
            banned_restaurant_prefix,
            activity_shortfall,
        ))
    }

    pub fn classifier(&self) -> &ContentClassifier {
        &self.classifier
    }

    pub fn restaurant_pool(&self) -> &[String] {
        &self.restaurant_pool
    }

    pub fn activity_shortfall(&self) -> ActivityShortfall {
        self.activity_shortfall
    }

    pub(crate) fn is_blocked(&self, text: &str) -> bool {
        self.classifier.is_aggregator_or_listicle(text)
    }

    pub(crate) fn is_banned_restaurant(&self, name: &str) -> bool {
        !self.banned_restaurant_prefix.is_empty()
            && name
                .trim()
                .to_lowercase()
                .starts_with(&self.banned_restaurant_prefix)
    }
}

fn normalize_pool<P, S>(pool: P) -> Vec<String>
where
    P: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    pool.into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.to_lowercase()))
        .collect()
}

/// Per-request inputs to synthesis and repair.
#[derive(Debug, Clone, Copy)]
pub struct TripContext<'a> {
    pub booking: &'a Booking,
    pub preferences: &'a Preferences,
    pub search_results: &'a [SearchResult],
    /// Anchor for the synthesized window when the booking dates are unusable.
    pub today: NaiveDate,
}
