use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nesting depth in the hierarchy. Three levels at most.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    First,
    Second,
    Third,
}

impl Level {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    /// 1-based depth.
    pub const fn depth(self) -> u16 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    /// The level below, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => Some(Self::Third),
            Self::Third => None,
        }
    }

    /// Name of the child collection when a node of this level is serialized.
    pub const fn child_key(self) -> &'static str {
        match self {
            Self::First => "nextLevelRows",
            Self::Second | Self::Third => "thirdLevelRows",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        };
        f.write_str(name)
    }
}
