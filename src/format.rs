//! # Display Formatting
//!
//! Price and title helpers shared by every renderer.
//!
//! ## Price rules
//!
//! | Input | Output |
//! |-------|--------|
//! | `3` | `3` |
//! | `3.5` | `3,50` |
//! | `"12,00"` | `12` |
//! | `"12,50 €"` | `12,50` |
//! | `""` | `` |
//! | `"abc"` | `abc` |

use crate::item::Price;

/// Currency glyph drawn next to every price.
pub const CURRENCY: char = '€';

/// Format a price for display.
///
/// Strips a literal currency glyph, accepts `,` or `.` as the decimal
/// separator, prints whole values without decimals and everything else with
/// exactly two decimals and a `,` separator. Text that does not parse is
/// returned unchanged. Never fails.
pub fn fmt_price(price: &Price) -> String {
    match price {
        Price::Number(n) => fmt_number(*n),
        Price::Text(text) => {
            let cleaned = strip_currency(text);
            if cleaned.is_empty() {
                return String::new();
            }
            match cleaned.replacen(',', ".", 1).parse::<f64>() {
                Ok(n) if n.is_finite() => fmt_number(n),
                _ => text.clone(),
            }
        }
    }
}

fn fmt_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    // -0.0 compares equal to 0.0 but would print a sign.
    let n = if n == 0.0 { 0.0 } else { n };
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n).replace('.', ",")
    }
}

/// Remove the currency glyph and surrounding whitespace.
pub fn strip_currency(text: &str) -> String {
    text.replace(CURRENCY, "").trim().to_string()
}

/// Title font tier, chosen from the title length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TitleSize {
    Small,
    Medium,
    Large,
}

impl TitleSize {
    /// Titles up to this many characters use the large tier.
    pub const LARGE_MAX: usize = 18;
    /// Titles up to this many characters use the medium tier.
    pub const MEDIUM_MAX: usize = 28;

    pub fn for_title(title: &str) -> Self {
        match title.chars().count() {
            n if n <= Self::LARGE_MAX => TitleSize::Large,
            n if n <= Self::MEDIUM_MAX => TitleSize::Medium,
            _ => TitleSize::Small,
        }
    }

    /// Nominal size in points.
    pub fn points(self) -> f32 {
        match self {
            TitleSize::Large => 18.0,
            TitleSize::Medium => 16.0,
            TitleSize::Small => 12.0,
        }
    }

    /// Scale relative to the large tier, applied to the theme's title size.
    pub fn scale(self) -> f32 {
        self.points() / TitleSize::Large.points()
    }
}

/// Shorthand for `TitleSize::for_title(title).points()`.
pub fn title_pt(title: &str) -> f32 {
    TitleSize::for_title(title).points()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_price_examples() {
        assert_eq!(fmt_price(&Price::Number(3.0)), "3");
        assert_eq!(fmt_price(&Price::Number(3.5)), "3,50");
        assert_eq!(fmt_price(&"12,00".into()), "12");
        assert_eq!(fmt_price(&"".into()), "");
        assert_eq!(fmt_price(&"abc".into()), "abc");
    }

    #[test]
    fn test_fmt_price_separators() {
        assert_eq!(fmt_price(&"12.5".into()), "12,50");
        assert_eq!(fmt_price(&"12,5".into()), "12,50");
        assert_eq!(fmt_price(&"0,99".into()), "0,99");
        assert_eq!(fmt_price(&Price::Number(-2.25)), "-2,25");
    }

    #[test]
    fn test_fmt_price_negative_zero() {
        assert_eq!(fmt_price(&Price::Number(-0.0)), "0");
        assert_eq!(fmt_price(&"-0".into()), "0");
        assert_eq!(fmt_price(&"-0,00".into()), "0");
    }

    #[test]
    fn test_fmt_price_strips_currency() {
        assert_eq!(fmt_price(&"12,50 €".into()), "12,50");
        assert_eq!(fmt_price(&"€7".into()), "7");
        assert_eq!(fmt_price(&"€".into()), "");
    }

    #[test]
    fn test_fmt_price_unparseable_is_verbatim() {
        assert_eq!(fmt_price(&"sur devis".into()), "sur devis");
        assert_eq!(fmt_price(&"12abc".into()), "12abc");
        assert_eq!(fmt_price(&"1,234.5".into()), "1,234.5");
    }

    #[test]
    fn test_fmt_price_non_finite() {
        assert_eq!(fmt_price(&Price::Number(f64::NAN)), "NaN");
        assert_eq!(fmt_price(&Price::Number(f64::INFINITY)), "inf");
    }

    #[test]
    fn test_title_tiers_and_boundaries() {
        assert_eq!(TitleSize::for_title(""), TitleSize::Large);
        assert_eq!(TitleSize::for_title(&"x".repeat(18)), TitleSize::Large);
        assert_eq!(TitleSize::for_title(&"x".repeat(19)), TitleSize::Medium);
        assert_eq!(TitleSize::for_title(&"x".repeat(28)), TitleSize::Medium);
        assert_eq!(TitleSize::for_title(&"x".repeat(29)), TitleSize::Small);
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        assert_eq!(TitleSize::for_title(&"é".repeat(18)), TitleSize::Large);
    }

    #[test]
    fn test_title_size_monotone_with_two_breakpoints() {
        let sizes: Vec<f32> = (0..60).map(|n| title_pt(&"a".repeat(n))).collect();
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]));
        let breakpoints = sizes.windows(2).filter(|w| w[1] != w[0]).count();
        assert_eq!(breakpoints, 2);
    }

    #[test]
    fn test_title_scale() {
        assert_eq!(TitleSize::Large.scale(), 1.0);
        assert!(TitleSize::Small.scale() < TitleSize::Medium.scale());
    }
}
