//! Compass-rose labels for headings

use core::fmt;

use crate::math::normalize_degrees;

/// One of the eight principal compass points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CardinalDirection {
    const ROSE: [CardinalDirection; 8] = [
        CardinalDirection::North,
        CardinalDirection::NorthEast,
        CardinalDirection::East,
        CardinalDirection::SouthEast,
        CardinalDirection::South,
        CardinalDirection::SouthWest,
        CardinalDirection::West,
        CardinalDirection::NorthWest,
    ];

    /// Nearest compass point to a heading in degrees
    ///
    /// Each point covers a 45° sector centred on it; boundaries round up
    /// (22.5° is north-east).
    pub fn from_heading(degrees: f32) -> Self {
        let sector = (normalize_degrees(degrees) / 45.0 + 0.5).floor() as usize % 8;
        Self::ROSE[sector]
    }

    /// Short label such as `"NE"`
    pub fn abbreviation(self) -> &'static str {
        match self {
            CardinalDirection::North => "N",
            CardinalDirection::NorthEast => "NE",
            CardinalDirection::East => "E",
            CardinalDirection::SouthEast => "SE",
            CardinalDirection::South => "S",
            CardinalDirection::SouthWest => "SW",
            CardinalDirection::West => "W",
            CardinalDirection::NorthWest => "NW",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Heading label for display, e.g. `"45° NE"`
///
/// # Example
/// ```
/// use compass_engine::format_heading;
///
/// assert_eq!(format_heading(359.7), "0° N");
/// assert_eq!(format_heading(135.2), "135° SE");
/// ```
pub fn format_heading(degrees: f32) -> String {
    let rounded = normalize_degrees(degrees.round());
    format!("{}° {}", rounded as u32, CardinalDirection::from_heading(rounded))
}
