use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every playbook display region id.
pub const REGION_PREFIX: &str = "output-";

macro_rules! text_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

text_newtype!(PlaybookId);
text_newtype!(RegionKey);
text_newtype!(ElementId);

impl PlaybookId {
    /// Display region bound to this playbook's run and preview output.
    pub fn region_key(&self) -> RegionKey {
        RegionKey(format!("{REGION_PREFIX}{}", self.0))
    }
}

impl RegionKey {
    pub fn playbook(&self) -> Option<PlaybookId> {
        self.0
            .strip_prefix(REGION_PREFIX)
            .map(|id| PlaybookId(id.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFormat {
    #[default]
    Json,
    Csv,
}

impl HistoryFormat {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::str::FromStr for HistoryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if s.eq_ignore_ascii_case("csv") {
            Ok(Self::Csv)
        } else {
            Err(format!("unsupported history format '{s}' (expected json or csv)"))
        }
    }
}
