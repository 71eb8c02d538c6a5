//! Transcode request builder primitive.
//!
//! A [`TranscodeRequest`] accumulates a base URL, an ordered list of query
//! parameters, and the capability profile extras. The extras are joined with
//! `+` into a single parameter when the request is finished.

use pp_core::{Error, Result};
use url::Url;

/// Query parameter carrying the joined profile extras.
pub const PROFILE_EXTRA_PARAM: &str = "X-Plex-Client-Profile-Extra";

/// Ordered transcode request under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    base_url: String,
    params: Vec<(String, String)>,
    extras: Vec<String>,
}

impl TranscodeRequest {
    /// Start a request against `base_url`, which may already carry a query.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            params: Vec::new(),
            extras: Vec::new(),
        }
    }

    /// Append a query parameter. Order is preserved.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Append a capability profile directive.
    pub fn push_extra(&mut self, directive: impl Into<String>) {
        self.extras.push(directive.into());
    }

    /// First value recorded for `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// Produce the final, fully parameterized URL.
    ///
    /// Profile extras are attached as [`PROFILE_EXTRA_PARAM`] only when at
    /// least one was pushed.
    pub fn finish(mut self) -> Result<String> {
        if !self.extras.is_empty() {
            let joined = self.extras.join("+");
            self.params.push((PROFILE_EXTRA_PARAM.to_string(), joined));
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::Validation(format!("invalid transcode base url {}: {e}", self.base_url))
        })?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &self.params {
                query.append_pair(name, value);
            }
        }
        Ok(url.into())
    }
}
