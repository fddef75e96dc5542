//! Storywrangler ngram queries

use crate::Ngram;
use clap::ValueEnum;
use std::fmt;

/// Terms that are queried when the user does not pick any
pub const DEFAULT_TERMS: &[&str] = &[
    "COVID",
    "covid",
    "testing",
    "tested",
    "vaccine",
    "vaccinated",
    "mask",
    "masks",
    "mandate",
    "anti-vax",
    "anti-vaxxers",
    "lockdown",
    "Pfizer",
    "Moderna",
    "Johnson",
    "J&J",
    "Fauci",
    "delta",
    "ventilator",
    "ventilators",
    "beds",
    "hospital",
    "Texas",
    "Missouri",
    "Florida",
    "California",
    "Missouri",
    "Connecticut",
    "Louisiana",
    "NYC",
    "spread",
    "pandemic",
    "virus",
    "China",
    "India",
    "Brazil",
    "US",
    "Belgium",
    "UK",
    "NZ",
    "Australia",
    "taste",
    "smell",
];

/// Language that is queried by default
pub const DEFAULT_LANGUAGE: &str = "en";

/// Query for the usage statistics of a set of ngrams
///
/// The terms are sent to the service as one whitespace-separated blob, and it
/// is the service that splits them back into ngrams.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Query {
    /// Terms whose usage is being studied
    pub terms: Box<[Ngram]>,

    /// Language code, e.g. "en"
    pub language: Box<str>,

    /// Popularity measure
    pub metric: Metric,

    /// Truth that retweets should be counted
    pub rt: bool,
}
//
impl Query {
    /// Whitespace-joined term blob, as sent to the service
    pub fn terms_blob(&self) -> String {
        self.terms.join(" ")
    }

    /// Build the request URL for this query
    ///
    /// Terms are interpolated as-is. Characters with a meaning in URLs (`&`,
    /// `#`, `?`...) are not escaped, so queries using them may be
    /// misinterpreted by the service.
    pub fn url(&self, api_url: &str) -> String {
        format!(
            "{}/{}?language={}&metric={}&rt={}",
            api_url.strip_suffix('/').unwrap_or(api_url),
            self.terms_blob(),
            self.language,
            self.metric,
            self.rt,
        )
    }
}
//
impl Default for Query {
    fn default() -> Self {
        Self {
            terms: DEFAULT_TERMS.iter().map(|&term| term.into()).collect(),
            language: DEFAULT_LANGUAGE.into(),
            metric: Metric::default(),
            rt: false,
        }
    }
}

/// Measure of ngram popularity that the service should report
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, ValueEnum)]
pub enum Metric {
    /// Usage rank among all ngrams of the day
    #[default]
    Rank,

    /// Relative usage frequency
    Freq,

    /// Raw usage count
    Count,
}
//
impl Metric {
    /// Name of this metric in API queries
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Freq => "freq",
            Self::Count => "count",
        }
    }
}
//
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
