//! The [`Server`] trait: URL resolution against a logical media server.

/// Feature name advertised by servers able to remux transcodes into Matroska.
pub const FEATURE_MKV_TRANSCODE: &str = "mkv_transcode";

/// A logical media server the planner resolves URLs against.
///
/// Connection selection and transport live behind this trait; every method
/// is a pure lookup over already-resolved state.
pub trait Server: Send + Sync {
    /// Display name, used in logs and descriptors.
    fn name(&self) -> &str;

    /// Build an absolute URL for `path`, optionally carrying the auth token.
    fn build_url(&self, path: &str, include_token: bool) -> String;

    /// The auth token for this server, if any.
    fn token(&self) -> Option<String>;

    /// Whether `url` targets this server (as opposed to an external host).
    fn is_request_to_server(&self, url: &str) -> bool;

    /// Whether the server advertises the named feature.
    fn supports_feature(&self, feature: &str) -> bool;

    /// Re-home a URL minted by another server onto this one.
    ///
    /// Returns `None` when the URL cannot be rewritten.
    fn swizzle_url(&self, url: &str, include_token: bool) -> Option<String>;

    /// Whether this is the cloud relay server whose paths must be swizzled
    /// through the transcode server before use.
    fn is_relay(&self) -> bool {
        false
    }
}
