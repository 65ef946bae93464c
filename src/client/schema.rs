use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field} value: {value}")]
pub struct CategoryParseError {
    pub field: &'static str,
    pub value: String,
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident as $field:literal {
            $($variant:ident => $slug:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_slug(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_slug())
            }
        }

        impl FromStr for $name {
            type Err = CategoryParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($slug $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(CategoryParseError {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_slug())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

categorical! {
    Job as "job" {
        Admin => "admin." | "admin",
        BlueCollar => "blue-collar" | "blue_collar",
        Entrepreneur => "entrepreneur",
        Housemaid => "housemaid",
        Management => "management",
        Retired => "retired",
        SelfEmployed => "self-employed" | "self_employed",
        Services => "services",
        Student => "student",
        Technician => "technician",
        Unemployed => "unemployed",
        Unknown => "unknown",
    }
}

categorical! {
    Marital as "marital" {
        Married => "married",
        Single => "single",
        Divorced => "divorced",
    }
}

categorical! {
    Education as "education" {
        Primary => "primary",
        Secondary => "secondary",
        Tertiary => "tertiary",
        Unknown => "unknown",
    }
}

categorical! {
    YesNo as "yes/no flag" {
        Yes => "yes" | "y" | "true",
        No => "no" | "n" | "false",
    }
}

categorical! {
    Contact as "contact" {
        Cellular => "cellular",
        Telephone => "telephone",
        Unknown => "unknown",
    }
}

categorical! {
    Month as "month" {
        Jan => "jan",
        Feb => "feb",
        Mar => "mar",
        Apr => "apr",
        May => "may",
        Jun => "jun",
        Jul => "jul",
        Aug => "aug",
        Sep => "sep",
        Oct => "oct",
        Nov => "nov",
        Dec => "dec",
    }
}

categorical! {
    /// Outcome of the previous marketing campaign. Exports that predate the
    /// `unknown` label write `nonexistent` instead.
    PreviousOutcome as "poutcome" {
        Success => "success",
        Failure => "failure",
        Other => "other",
        Unknown => "unknown" | "nonexistent",
    }
}

impl YesNo {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}
