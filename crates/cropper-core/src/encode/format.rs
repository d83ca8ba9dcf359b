//! Output formats for extracted crops.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EncodeError;

/// Default lossy quality, in `[0, 1]`.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Encoded output format, named by MIME type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "image/png")]
    Png,
    #[default]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Webp];

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// Whether the quality setting has any effect.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for OutputFormat {
    type Err = EncodeError;

    /// Accepts MIME types (`image/png`) and bare names (`png`, `jpg`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("image/").unwrap_or(&lower);
        match name {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            _ => Err(EncodeError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mime_and_short_names() {
        assert_eq!("image/png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("image/webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
    }

    #[test]
    fn test_parse_unknown_format() {
        let err = "image/gif".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported output format: image/gif");
    }

    #[test]
    fn test_mime_round_trips_through_parse() {
        for format in OutputFormat::ALL {
            assert_eq!(format.mime_type().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_default_is_jpeg() {
        assert_eq!(OutputFormat::default(), OutputFormat::Jpeg);
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
    }
}
