//! Maps tag counts onto visual weights: a font size for tag clouds and an
//! intensity bucket for the tag browser.
//!
//! Both mappings normalize against the minimum and maximum of the counts
//! passed in, not against the whole site. A cloud that only shows the tags
//! of one category is therefore scaled relative to that category.

use std::fmt;

/// How a tag cloud sizes its entries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FontScale {
    /// Every entry gets the same size.
    Fixed(f64),

    /// Entries are sized linearly between `min` and `max` by count.
    Scaled { min: f64, max: f64 },
}

impl Default for FontScale {
    fn default() -> Self {
        FontScale::Scaled {
            min: DEFAULT_MIN_FONT_SIZE,
            max: DEFAULT_MAX_FONT_SIZE,
        }
    }
}

pub const DEFAULT_MIN_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_MAX_FONT_SIZE: f64 = 24.0;
pub const DEFAULT_FIXED_FONT_SIZE: f64 = 14.0;

fn bounds(counts: &[u32]) -> Option<(u32, u32)> {
    let min = counts.iter().copied().min()?;
    let max = counts.iter().copied().max()?;
    Some((min, max))
}

/// Returns the normalized position of `count` between the smallest and the
/// largest of `counts`, or [`None`] if they're equal (or `counts` is
/// empty).
fn ratio(count: u32, counts: &[u32]) -> Option<f64> {
    match bounds(counts) {
        Some((min, max)) if min != max => {
            Some((f64::from(count) - f64::from(min)) / (f64::from(max) - f64::from(min)))
        }
        _ => None,
    }
}

/// Returns the font size for a tag used `count` times, given the counts of
/// every tag in the same cloud. When all counts are equal the result is the
/// midpoint of the scale; otherwise it's interpolated linearly and rounded
/// to a whole number.
pub fn font_size_for(count: u32, counts: &[u32], scale: FontScale) -> f64 {
    match scale {
        FontScale::Fixed(size) => size,
        FontScale::Scaled { min, max } => match ratio(count, counts) {
            None => (min + max) / 2.0,
            Some(ratio) => (min + ratio * (max - min)).round(),
        },
    }
}

/// The color intensity of a tag in the tag browser. Variants are ordered
/// from faintest to strongest; [`Intensity::Neutral`] is used when every
/// tag is equally frequent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intensity {
    Lowest,
    Low,
    Medium,
    Neutral,
    High,
    Highest,
}

impl Intensity {
    /// The style classes the bucket renders with.
    pub fn css_class(self) -> &'static str {
        match self {
            Intensity::Highest => "bg-blue-200 text-blue-900 border-blue-300 font-medium",
            Intensity::High | Intensity::Neutral => "bg-blue-100 text-blue-800 border-blue-200",
            Intensity::Medium => "bg-gray-200 text-gray-800 border-gray-300",
            Intensity::Low => "bg-gray-100 text-gray-700 border-gray-200",
            Intensity::Lowest => "bg-gray-50 text-gray-600 border-gray-100",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Intensity::Lowest => "lowest",
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::Neutral => "neutral",
            Intensity::High => "high",
            Intensity::Highest => "highest",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Buckets a tag used `count` times relative to `counts`. The ratio
/// `(count - min) / (max - min)` selects the bucket: above 0.8 is
/// [`Intensity::Highest`], above 0.6 [`Intensity::High`], above 0.4
/// [`Intensity::Medium`], above 0.2 [`Intensity::Low`], anything else
/// [`Intensity::Lowest`].
pub fn intensity_bucket_for(count: u32, counts: &[u32]) -> Intensity {
    match ratio(count, counts) {
        None => Intensity::Neutral,
        Some(r) if r > 0.8 => Intensity::Highest,
        Some(r) if r > 0.6 => Intensity::High,
        Some(r) if r > 0.4 => Intensity::Medium,
        Some(r) if r > 0.2 => Intensity::Low,
        Some(_) => Intensity::Lowest,
    }
}

/// A coarse indicator of how much a tag is used, by absolute count rather
/// than relative to other tags. Used by the list layout of the tag browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum UsageLevel {
    Rare,
    Occasional,
    Frequent,
    Heavy,
}

impl UsageLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            UsageLevel::Heavy => "bg-blue-500",
            UsageLevel::Frequent => "bg-blue-300",
            UsageLevel::Occasional => "bg-blue-200",
            UsageLevel::Rare => "bg-gray-300",
        }
    }
}

pub fn usage_level_for(count: u32) -> UsageLevel {
    match count {
        0..=1 => UsageLevel::Rare,
        2..=3 => UsageLevel::Occasional,
        4..=5 => UsageLevel::Frequent,
        _ => UsageLevel::Heavy,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCALE: FontScale = FontScale::Scaled {
        min: 12.0,
        max: 24.0,
    };

    #[test]
    fn test_font_size_single_tag_is_midpoint() {
        assert_eq!(18.0, font_size_for(3, &[3], SCALE));
        assert_eq!(18.0, font_size_for(2, &[2, 2, 2], SCALE));
        assert_eq!(18.0, font_size_for(1, &[], SCALE));
    }

    #[test]
    fn test_font_size_midpoint_is_not_rounded() {
        let scale = FontScale::Scaled {
            min: 12.0,
            max: 23.0,
        };
        assert_eq!(17.5, font_size_for(1, &[1], scale));
    }

    #[test]
    fn test_font_size_interpolates_and_rounds() {
        let counts = [1, 2, 4];
        assert_eq!(12.0, font_size_for(1, &counts, SCALE));
        assert_eq!(16.0, font_size_for(2, &counts, SCALE));
        assert_eq!(24.0, font_size_for(4, &counts, SCALE));

        // 12 + 2/7 * 12 = 15.43
        assert_eq!(15.0, font_size_for(3, &[1, 8], SCALE));
    }

    #[test]
    fn test_font_size_fixed() {
        assert_eq!(14.0, font_size_for(1, &[1, 100], FontScale::Fixed(14.0)));
        assert_eq!(14.0, font_size_for(7, &[], FontScale::Fixed(14.0)));
    }

    #[test]
    fn test_intensity_neutral_when_degenerate() {
        assert_eq!(Intensity::Neutral, intensity_bucket_for(5, &[5, 5]));
        assert_eq!(Intensity::Neutral, intensity_bucket_for(5, &[]));
    }

    #[test]
    fn test_intensity_thresholds() {
        let counts = [0, 10];
        assert_eq!(Intensity::Lowest, intensity_bucket_for(0, &counts));
        assert_eq!(Intensity::Lowest, intensity_bucket_for(2, &counts));
        assert_eq!(Intensity::Low, intensity_bucket_for(3, &counts));
        assert_eq!(Intensity::Low, intensity_bucket_for(4, &counts));
        assert_eq!(Intensity::Medium, intensity_bucket_for(5, &counts));
        assert_eq!(Intensity::High, intensity_bucket_for(7, &counts));
        assert_eq!(Intensity::Highest, intensity_bucket_for(9, &counts));
        assert_eq!(Intensity::Highest, intensity_bucket_for(10, &counts));
    }

    #[test]
    fn test_usage_level() {
        assert_eq!(UsageLevel::Rare, usage_level_for(1));
        assert_eq!(UsageLevel::Occasional, usage_level_for(2));
        assert_eq!(UsageLevel::Occasional, usage_level_for(3));
        assert_eq!(UsageLevel::Frequent, usage_level_for(5));
        assert_eq!(UsageLevel::Heavy, usage_level_for(6));
    }
}
