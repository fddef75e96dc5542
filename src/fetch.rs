//! Download of ngram usage statistics from the Storywrangler API

use crate::{
    progress::{ProgressConfig, ProgressReport, Work},
    Result,
};
use anyhow::Context;
use futures::stream::StreamExt;
use reqwest::Response;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Largest body buffer that we reserve upfront from the announced length
const MAX_BODY_RESERVATION: usize = 16 * 1024 * 1024;

/// Decoded API response
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ApiResponse {
    /// Time series of each ngram, keyed by ngram, in response order
    pub data: Map<String, Value>,
}

/// Query the API and decode its response
///
/// The whole response body is downloaded before decoding starts, so no output
/// can be produced from an incomplete response.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    report: &ProgressReport,
) -> Result<ApiResponse> {
    // Start the download
    log::info!("Requesting ngram usage statistics from {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(Response::error_for_status)
        .with_context(|| format!("sending ngram request to {url}"))?;
    let expected_len = response.content_length().unwrap_or(0);
    log::debug!("Got response {} with {expected_len} announced body bytes", response.status());

    // Download the response body, tracking progress along the way
    let bytes = report.add(
        "Downloading ngram statistics",
        ProgressConfig::new(Work::Bytes(usize::try_from(expected_len).unwrap_or(usize::MAX)))
            .allow_adding_work(),
    );
    // The announced length is not trusted beyond a reasonable reservation
    let mut body = Vec::with_capacity(
        usize::try_from(expected_len).map_or(0, |len| len.min(MAX_BODY_RESERVATION)),
    );
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.with_context(|| format!("downloading response body from {url}"))?;
        let chunk_len = chunk.len() as u64;
        let remaining = bytes.remaining();
        if chunk_len > remaining {
            bytes.add_work(chunk_len - remaining);
        }
        bytes.make_progress(chunk_len);
        body.extend_from_slice(&chunk);
    }
    bytes.done_adding_work();
    log::debug!("Downloaded {} body bytes", body.len());

    // Decode the JSON payload
    decode(&body)
}

/// Decode an API response body
pub fn decode(body: &[u8]) -> Result<ApiResponse> {
    serde_json::from_slice(body).context("decoding ngram API response")
}
