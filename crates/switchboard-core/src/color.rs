//! CSS colors for diagram snapshots.

use std::{fmt, str::FromStr};

use color::DynamicColor;

/// A validated CSS color.
///
/// Colors come from configuration as strings; parsing them up front means
/// a typo surfaces as an error instead of a silently black snapshot.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color(DynamicColor);

impl Color {
    /// Parses a CSS color string such as `"#ff0000"`, `"rgb(255, 0, 0)"` or
    /// `"red"`.
    ///
    /// ```
    /// use switchboard_core::color::Color;
    ///
    /// assert!(Color::new("#fafafa").is_ok());
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(Self)
            .map_err(|err| format!("invalid color `{color_str}`: {err}"))
    }

    /// Whether the color is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.0.components[3] == 0.0
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        for input in ["#ff0000", "rgb(255, 0, 0)", "red", "transparent"] {
            assert!(Color::new(input).is_ok(), "{input} should parse");
        }
        let err = Color::new("reddish").unwrap_err();
        assert!(err.contains("reddish"));
    }

    #[test]
    fn test_transparency() {
        assert!(Color::new("transparent").unwrap().is_transparent());
        assert!(!"white".parse::<Color>().unwrap().is_transparent());
    }
}
