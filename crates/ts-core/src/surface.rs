//! Riding surface tag.
//!
//! Taken from the OSM `surface` tag when present; otherwise inferred from
//! the `highway` class via [`Surface::default_for_highway`].

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Surface {
    Asphalt,
    Paved,
    Concrete,
    Gravel,
    Dirt,
    Ground,
    Sand,
    #[default]
    Unknown,
    /// Any other OSM surface value, kept verbatim.
    Other(String),
}

impl Surface {
    /// Default surface for a `highway` class, or `None` for classes outside
    /// the table.
    pub fn default_for_highway(highway: &str) -> Option<Surface> {
        match highway {
            "residential" | "primary" | "secondary" | "tertiary"
            | "unclassified" | "service"  => Some(Surface::Asphalt),
            "cycleway" | "footway"        => Some(Surface::Paved),
            "path"                        => Some(Surface::Dirt),
            "track"                       => Some(Surface::Gravel),
            _                             => None,
        }
    }

    /// Resolve an edge's surface from its tags.
    ///
    /// An explicit, non-`unknown` `surface` tag wins.  Otherwise the first
    /// `highway` value present in the default table decides; multi-valued
    /// highway tags (merged ways) are scanned in order.
    pub fn from_tags<'a>(surface: Option<&str>, highways: impl IntoIterator<Item = &'a str>) -> Surface {
        if let Some(tag) = surface {
            let parsed: Surface = tag.parse().unwrap_or_default();
            if parsed != Surface::Unknown {
                return parsed;
            }
        }
        highways
            .into_iter()
            .find_map(Surface::default_for_highway)
            .unwrap_or(Surface::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Surface::Asphalt  => "asphalt",
            Surface::Paved    => "paved",
            Surface::Concrete => "concrete",
            Surface::Gravel   => "gravel",
            Surface::Dirt     => "dirt",
            Surface::Ground   => "ground",
            Surface::Sand     => "sand",
            Surface::Unknown  => "unknown",
            Surface::Other(s) => s,
        }
    }
}

impl FromStr for Surface {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Ok(match tag.as_str() {
            "asphalt"            => Surface::Asphalt,
            "paved"              => Surface::Paved,
            "concrete"           => Surface::Concrete,
            "gravel" | "fine_gravel" | "compacted" => Surface::Gravel,
            "dirt" | "earth"     => Surface::Dirt,
            "ground"             => Surface::Ground,
            "sand"               => Surface::Sand,
            "" | "unknown"       => Surface::Unknown,
            _                    => Surface::Other(tag),
        })
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
