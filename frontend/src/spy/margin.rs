use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// One side of a root margin. Percentages are relative to the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl FromStr for Length {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = |n: &str| n.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or(());
        if let Some(n) = s.strip_suffix("px") {
            number(n).map(Length::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            number(n).map(Length::Percent)
        } else if number(s)? == 0.0 {
            // unitless zero is the only unitless length CSS accepts
            Ok(Length::Px(0.0))
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{}px", v),
            Length::Percent(v) => write!(f, "{}%", v),
        }
    }
}

/// Inset (negative) or outset (positive) applied to the viewport before
/// intersection is computed. Written like the CSS `margin` shorthand.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl Default for RootMargin {
    /// Shrinks the bottom of the viewport by 40%, so a section becomes active
    /// before it fills the screen.
    fn default() -> Self {
        Self {
            top: Length::Px(0.0),
            right: Length::Px(0.0),
            bottom: Length::Percent(-40.0),
            left: Length::Px(0.0),
        }
    }
}

impl FromStr for RootMargin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidRootMargin(s.to_string());
        let sides = s
            .split_whitespace()
            .map(|token| token.parse::<Length>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match sides[..] {
            [all] => (all, all, all, all),
            [vertical, horizontal] => (vertical, horizontal, vertical, horizontal),
            [top, horizontal, bottom] => (top, horizontal, bottom, horizontal),
            [top, right, bottom, left] => (top, right, bottom, left),
            _ => return Err(invalid()),
        };
        Ok(Self { top, right, bottom, left })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_renders_like_css() {
        assert_eq!(RootMargin::default().to_string(), "0px 0px -40% 0px");
    }

    #[test]
    fn test_shorthand_expansion() {
        let one: RootMargin = "10px".parse().unwrap();
        assert_eq!(one.to_string(), "10px 10px 10px 10px");

        let two: RootMargin = "-5% 0".parse().unwrap();
        assert_eq!(two.top, Length::Percent(-5.0));
        assert_eq!(two.right, Length::Px(0.0));
        assert_eq!(two.bottom, Length::Percent(-5.0));

        let three: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(three.left, Length::Px(2.0));
        assert_eq!(three.bottom, Length::Px(3.0));

        let four: RootMargin = "0px 0px -60% 0px".parse().unwrap();
        assert_eq!(four.bottom, Length::Percent(-60.0));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("5".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!(matches!(
            "auto".parse::<RootMargin>(),
            Err(Error::InvalidRootMargin(s)) if s == "auto"
        ));
    }
}
