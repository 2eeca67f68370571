//! Provinces used to scope stores and duplicate-name searches.

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the known provinces.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region: {0:?}")]
pub struct RegionError(pub String);

/// A province.
///
/// Serialized as its display name ("Western Cape", "KwaZulu-Natal", ...),
/// which is also the value stored in the database. Parsing is exact and
/// case-sensitive: region spelling is not normalized anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Eastern Cape")]
    EasternCape,
    #[serde(rename = "Free State")]
    FreeState,
    #[serde(rename = "Gauteng")]
    Gauteng,
    #[serde(rename = "KwaZulu-Natal")]
    KwaZuluNatal,
    #[serde(rename = "Limpopo")]
    Limpopo,
    #[serde(rename = "Mpumalanga")]
    Mpumalanga,
    #[serde(rename = "North West")]
    NorthWest,
    #[serde(rename = "Northern Cape")]
    NorthernCape,
    #[serde(rename = "Western Cape")]
    WesternCape,
}

impl Region {
    /// Every region, in display order.
    pub const ALL: [Self; 9] = [
        Self::EasternCape,
        Self::FreeState,
        Self::Gauteng,
        Self::KwaZuluNatal,
        Self::Limpopo,
        Self::Mpumalanga,
        Self::NorthWest,
        Self::NorthernCape,
        Self::WesternCape,
    ];

    /// The display (and storage) name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EasternCape => "Eastern Cape",
            Self::FreeState => "Free State",
            Self::Gauteng => "Gauteng",
            Self::KwaZuluNatal => "KwaZulu-Natal",
            Self::Limpopo => "Limpopo",
            Self::Mpumalanga => "Mpumalanga",
            Self::NorthWest => "North West",
            Self::NorthernCape => "Northern Cape",
            Self::WesternCape => "Western Cape",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| RegionError(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("gauteng".parse::<Region>().is_err());
        assert!("Kwazulu-Natal".parse::<Region>().is_err());
        assert!(" Gauteng".parse::<Region>().is_err());
    }

    #[test]
    fn test_serde_uses_display_name() {
        let json = serde_json::to_value(Region::KwaZuluNatal).unwrap();
        assert_eq!(json, serde_json::json!("KwaZulu-Natal"));

        let region: Region = serde_json::from_value(serde_json::json!("Western Cape")).unwrap();
        assert_eq!(region, Region::WesternCape);
    }
}
