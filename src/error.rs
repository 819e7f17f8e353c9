//! Error types for sprite part inference and splitting

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::part::{Key, Rect};

/// Reasons a single CSS rule cannot be turned into a part.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindError {
    /// At-rules (`@media`, `@font-face`, ...) never describe a part
    #[error("rule must be a qualified rule")]
    NotQualified,

    /// The declarations do not pin down x, y, width and height
    #[error("{}", describe_incomplete(.missing, .errors))]
    Incomplete {
        missing: Vec<Key>,
        errors: Vec<DeclarationError>,
    },
}

fn describe_incomplete(missing: &[Key], errors: &[DeclarationError]) -> String {
    let keys = missing
        .iter()
        .map(Key::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if errors.is_empty() {
        return format!("declarations are insufficient to determine the following: [{}]", keys);
    }
    let errors = errors
        .iter()
        .map(DeclarationError::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "declarations are insufficient to determine the following: [{}], encountered the following errors: [{}]",
        keys, errors
    )
}

/// Value formats understood for the background offset properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `background` shorthand
    BackgroundShorthand,
    /// `background-position`
    BackgroundPosition,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::BackgroundShorthand => f.write_str("bg-short"),
            Scheme::BackgroundPosition => f.write_str("bg-pos"),
        }
    }
}

/// A recognized declaration whose value could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("unknown format for type scheme {scheme}: {value}")]
    UnknownFormat { scheme: Scheme, value: String },

    #[error("invalid pixel length: {value:?}")]
    InvalidNumber { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScaleError {
    #[error("scale ratio must be greater than 0: {0}")]
    InvalidRatio(i32),
}

/// Failures of the crop and write steps for a single part.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("rule leads outside of the sprite bounds: {rect} not in {width}x{height}")]
    OutOfBounds { rect: Rect, width: u32, height: u32 },

    #[error("filename is empty after sanitation: {0:?}")]
    BadName(String),

    #[error("failed to encode image")]
    Encode(#[source] image::ImageError),

    #[error("failed to create image file {}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A stylesheet the CSS parser could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error parsing css at line {line}, column {column}: {snippet:?}")]
pub struct CssParseError {
    pub line: u32,
    pub column: u32,
    pub snippet: String,
}
