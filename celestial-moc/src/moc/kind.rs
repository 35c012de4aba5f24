use crate::error::{MocError, MocResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source classification recorded in the `MOCTYPE` FITS keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MocType {
    Image,
    Catalog,
}

impl MocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Catalog => "CATALOG",
        }
    }
}

impl fmt::Display for MocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MocType {
    type Err = MocError;

    fn from_str(s: &str) -> MocResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "IMAGE" => Ok(Self::Image),
            "CATALOG" => Ok(Self::Catalog),
            _ => Err(MocError::InvalidType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("image".parse::<MocType>().unwrap(), MocType::Image);
        assert_eq!("Catalog".parse::<MocType>().unwrap(), MocType::Catalog);
        assert_eq!("CATALOG".parse::<MocType>().unwrap(), MocType::Catalog);
    }

    #[test]
    fn parse_rejects_other_tokens() {
        let err = "something other than image or catalog"
            .parse::<MocType>()
            .unwrap_err();
        assert!(matches!(err, MocError::InvalidType(_)));
    }

    #[test]
    fn display_is_upper_case() {
        assert_eq!(MocType::Image.to_string(), "IMAGE");
        assert_eq!(MocType::Catalog.to_string(), "CATALOG");
    }

    #[test]
    fn serde_uses_upper_case_names() {
        assert_eq!(serde_json::to_string(&MocType::Catalog).unwrap(), "\"CATALOG\"");
        let parsed: MocType = serde_json::from_str("\"IMAGE\"").unwrap();
        assert_eq!(parsed, MocType::Image);
    }
}
