#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the badgesmith crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Per-item failures ([`Error::Fetch`], [`Error::Network`],
//! [`Error::MissingFile`]) are normally caught by the batch loops and only
//! logged; every other variant is fatal to the invocation.

use std::path::{Path, PathBuf};

/// Unified error type returned by the fetch and compose flows and the CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while reading input documents.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the input file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors from the group configuration.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when the configuration or CLI input violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing JSON summaries.
    #[error("failed to serialize summary: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    },
    /// Wraps I/O errors that occur while writing badge artifacts.
    #[error("failed to write badge artifact at {path:?}: {source}")]
    BadgeIo {
        /// Location of the artifact being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps I/O errors that occur while reading SVG fragments.
    #[error("failed to process SVG at {path:?}: {source}")]
    SvgIo {
        /// Location of the SVG file being processed.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Remote server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Fetch {
        /// Requested badge URL.
        url:    String,
        /// Status code returned by the server.
        status: u16
    },
    /// Transport-level failure while requesting or streaming a badge.
    #[error("network error for {url}: {source}")]
    Network {
        /// Requested badge URL.
        url:    String,
        /// Underlying client error.
        source: reqwest::Error
    },
    /// Expected badge file is absent from the assets directory.
    #[error("badge file not found: {path:?}")]
    MissingFile {
        /// Location that was checked.
        path: PathBuf
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a network error tagged with the requested URL.
    pub fn network<U>(url: U, source: reqwest::Error) -> Self
    where
        U: Into<String>
    {
        Self::Network {
            url: url.into(),
            source
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        let url = source
            .url()
            .map(|url| url.as_str().to_owned())
            .unwrap_or_default();
        Self::Network {
            url,
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the input file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::BadgeIo`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the badge artifact that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn badge_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::BadgeIo {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::SvgIo`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the SVG file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn svg_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::SvgIo {
        path: path.to_path_buf(),
        source
    }
}
