//! Detection of directory, aggregator and listicle content.
//!
//! Generators routinely paste listicle headlines ("Top 10 things to do in
//! Phoenix") or directory links (Yelp, Tripadvisor) where a concrete venue
//! belongs. The classifier flags both on surface language first and on the
//! registrable domain second.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use url::Url;

/// Listicle vocabulary, matched case-insensitively on word boundaries.
pub const DEFAULT_LISTICLE_PATTERN: &str = r"(?:\btop\s?\d+|\bbest\b|\bthings?\s+to\s+do\b|\bguide\b|\blist\b|\bultimate\b|\bdestinations?\b)";

/// Directory, social and visitor-bureau domains that never name a venue.
pub const DEFAULT_AGGREGATOR_DOMAINS: &[&str] = &[
    "yelp.com",
    "tripadvisor.com",
    "reddit.com",
    "youtube.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "eventbrite.com",
    "meetup.com",
    "visitphoenix.com",
    "visitarizona.com",
];

#[derive(Debug, Clone)]
pub struct ContentClassifier {
    listicle: Regex,
    aggregator_domains: HashSet<String>,
}

impl ContentClassifier {
    /// Build a classifier from a listicle pattern and a domain deny-set.
    ///
    /// Domains are compared lower-cased with any leading `www.` removed.
    pub fn new<I, S>(listicle_pattern: &str, aggregator_domains: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let listicle = RegexBuilder::new(listicle_pattern)
            .case_insensitive(true)
            .build()?;
        let aggregator_domains = aggregator_domains
            .into_iter()
            .map(|d| {
                let d = d.as_ref().trim().to_ascii_lowercase();
                d.strip_prefix("www.").map(str::to_string).unwrap_or(d)
            })
            .filter(|d| !d.is_empty())
            .collect();
        Ok(Self {
            listicle,
            aggregator_domains,
        })
    }

    /// True when `text` reads like a listicle or points at an aggregator domain.
    ///
    /// ```
    /// use concierge_core::classifier::ContentClassifier;
    ///
    /// let classifier = ContentClassifier::default();
    /// assert!(classifier.is_aggregator_or_listicle("Top 10 things to do in Phoenix"));
    /// assert!(classifier.is_aggregator_or_listicle("https://www.yelp.com/biz/x"));
    /// assert!(!classifier.is_aggregator_or_listicle("Cedar Grove Kitchen, 123 Main St"));
    /// ```
    pub fn is_aggregator_or_listicle(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        if self.listicle.is_match(&lowered) {
            return true;
        }
        root_domain(lowered.trim())
            .map(|root| self.aggregator_domains.contains(&root))
            .unwrap_or(false)
    }

    pub fn aggregator_domains(&self) -> impl Iterator<Item = &str> {
        self.aggregator_domains.iter().map(String::as_str)
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_LISTICLE_PATTERN, DEFAULT_AGGREGATOR_DOMAINS)
            .expect("built-in listicle pattern compiles")
    }
}

/// Last two dot-separated labels of the URL host, if `text` is an absolute URL.
fn root_domain(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;
    let host = url.host_str()?;
    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    let root = labels[labels.len().saturating_sub(2)..].join(".");
    (!root.is_empty()).then_some(root)
}
