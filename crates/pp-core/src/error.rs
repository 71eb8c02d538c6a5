//! Unified error type for playback planning.
//!
//! Every way a plan can fail to materialize funnels into [`Error`]. The
//! planner never retries; the caller decides whether to rebuild with other
//! parameters (forcing a transcode, for instance) or report the failure.

use std::fmt;

/// Unified error type covering all planning failure modes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No transcode-capable server could be located for the item.
    #[error("No transcode server available for {item}")]
    NoTranscodeServer {
        /// Key of the item that needed a transcode.
        item: String,
    },

    /// A per-part builder could not produce a descriptor.
    #[error("Part {part_index} could not be built: {reason}")]
    PartBuild {
        /// Index of the part within its rendition.
        part_index: usize,
        /// Human-readable failure description.
        reason: String,
    },

    /// The selected rendition has no parts to play.
    #[error("Media has no playable parts")]
    NoParts,

    /// The item is not backed by any server.
    #[error("Item {0} has no server")]
    NoServer(String),

    /// Input data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Convenience constructor for [`Error::NoTranscodeServer`].
    pub fn no_transcode_server(item: impl fmt::Display) -> Self {
        Error::NoTranscodeServer {
            item: item.to_string(),
        }
    }

    /// Convenience constructor for [`Error::PartBuild`].
    pub fn part_build(part_index: usize, reason: impl Into<String>) -> Self {
        Error::PartBuild {
            part_index,
            reason: reason.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_transcode_server_display() {
        let err = Error::no_transcode_server("/library/metadata/42");
        assert_eq!(
            err.to_string(),
            "No transcode server available for /library/metadata/42"
        );
    }

    #[test]
    fn part_build_display() {
        let err = Error::part_build(2, "quality tier 7 is not configured");
        assert_eq!(
            err.to_string(),
            "Part 2 could not be built: quality tier 7 is not configured"
        );
    }

    #[test]
    fn no_parts_display() {
        assert_eq!(Error::NoParts.to_string(), "Media has no playable parts");
    }

    #[test]
    fn no_server_display() {
        let err = Error::NoServer("/library/metadata/9".into());
        assert_eq!(err.to_string(), "Item /library/metadata/9 has no server");
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<u32> {
            Ok(7)
        }
        assert_eq!(ok_fn().unwrap(), 7);

        fn err_fn() -> Result<u32> {
            Err(Error::Validation("quality tier out of range".into()))
        }
        assert!(err_fn().is_err());
    }
}
