//! Processing pipeline configuration

use crate::{
    languages,
    query::{Query, DEFAULT_TERMS},
    Args, Ngram,
};
use std::{path::PathBuf, time::Duration};

/// Base URL of the Storywrangler ngram API
pub const DEFAULT_API_URL: &str = "https://storywrangling.org/api/ngrams";

/// File where the combined table is written by default
pub const DEFAULT_OUTPUT: &str = "twitter-covid.csv";

/// Final process configuration
///
/// This is the digested form of [`Args`]. The default configuration
/// reproduces the historical COVID-19 data pull.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    /// What is asked from the service
    pub query: Query,

    /// Base URL of the ngram API, without trailing query terms
    pub api_url: Box<str>,

    /// Destination of the combined table
    pub output: PathBuf,

    /// Directory where one table per ngram should also be written, if any
    pub split_dir: Option<PathBuf>,

    /// Maximal duration of the API request (default is to wait forever)
    pub timeout: Option<Duration>,
}
//
impl Config {
    /// Determine process configuration from CLI arguments
    pub(crate) fn new(args: Args) -> Self {
        let Args {
            terms,
            language,
            metric,
            rt,
            output,
            api_url,
            timeout,
            split_dir,
        } = args;
        match languages::get(&language) {
            Some(info) => log::debug!("Querying {} ngram usage ({})", info.name, info.code),
            None => log::warn!("Language {language:?} is not a known Storywrangler language, querying it anyway"),
        }
        let terms: Box<[Ngram]> = if terms.is_empty() {
            DEFAULT_TERMS.iter().map(|&term| term.into()).collect()
        } else {
            terms.into()
        };
        Self {
            query: Query {
                terms,
                language,
                metric,
                rt,
            },
            api_url,
            output,
            split_dir,
            timeout: timeout.map(Duration::from_secs),
        }
    }

    /// URL of the API request
    pub fn url(&self) -> String {
        self.query.url(&self.api_url)
    }
}
//
impl Default for Config {
    fn default() -> Self {
        Self {
            query: Query::default(),
            api_url: DEFAULT_API_URL.into(),
            output: DEFAULT_OUTPUT.into(),
            split_dir: None,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_defaults_match_default_config() {
        let args = Args::try_parse_from(["storywrangler-fetch"]).expect("no arguments is valid");
        assert_eq!(Config::new(args), Config::default());
    }

    #[test]
    fn default_url_targets_storywrangler() {
        let url = Config::default().url();
        assert!(url.starts_with("https://storywrangling.org/api/ngrams/COVID covid "));
        assert!(url.ends_with("?language=en&metric=rank&rt=false"));
    }

    #[test]
    fn cli_overrides() {
        let args = Args::try_parse_from([
            "storywrangler-fetch",
            "--language",
            "es",
            "--metric",
            "freq",
            "--rt",
            "--output",
            "out.csv",
            "--timeout",
            "30",
            "--split-dir",
            "per-ngram",
            "hola",
            "adios",
        ])
        .expect("arguments should be valid");
        let config = Config::new(args);
        assert_eq!(config.url(), format!("{DEFAULT_API_URL}/hola adios?language=es&metric=freq&rt=true"));
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.split_dir, Some(PathBuf::from("per-ngram")));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }
}
