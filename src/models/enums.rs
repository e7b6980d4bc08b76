use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SpecimenType {
    Urine => "urine",
    Stool => "stool",
    Unknown => "unknown",
});

str_enum!(ColonyTrend {
    Decreasing => "decreasing",
    Increasing => "increasing",
    Fluctuating => "fluctuating",
    Cleared => "cleared",
    InsufficientData => "insufficient_data",
});

str_enum!(RiskFlag {
    EmergingResistance => "EMERGING_RESISTANCE",
    ContaminationSuspected => "CONTAMINATION_SUSPECTED",
    NonResponsePattern => "NON_RESPONSE_PATTERN",
    InsufficientData => "INSUFFICIENT_DATA",
    OrganismChange => "ORGANISM_CHANGE",
    MultiDrugResistance => "MULTI_DRUG_RESISTANCE",
});

str_enum!(Persona {
    Patient => "patient",
    Clinician => "clinician",
});

str_enum!(SirClass {
    Sensitive => "S",
    Intermediate => "I",
    Resistant => "R",
});

/// A PII category detected (and scrubbed) by the redactor. Only the category
/// is ever logged or returned, never the matched value.
str_enum!(PiiCategory {
    Name => "name",
    DateOfBirth => "dob",
    IdentifierNumber => "identifier",
    Phone => "phone",
    Email => "email",
    Address => "address",
    Provider => "provider",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trend_serializes_snake_case() {
        let json = serde_json::to_string(&ColonyTrend::InsufficientData).unwrap();
        assert_eq!(json, "\"insufficient_data\"");
    }

    #[test]
    fn risk_flag_serializes_screaming_case() {
        let json = serde_json::to_string(&RiskFlag::EmergingResistance).unwrap();
        assert_eq!(json, "\"EMERGING_RESISTANCE\"");
    }

    #[test]
    fn persona_round_trips() {
        assert_eq!(Persona::from_str("patient").unwrap(), Persona::Patient);
        assert_eq!(Persona::Clinician.as_str(), "clinician");
    }

    #[test]
    fn invalid_value_is_rejected() {
        assert!(SpecimenType::from_str("sputum").is_err());
    }
}
