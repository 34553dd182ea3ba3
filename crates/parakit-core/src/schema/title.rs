use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Supported target games.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum GameTitle {
    /// Ten Desires (th13)
    #[strum(to_string = "td", serialize = "th13")]
    Td,
    /// Double Dealing Character (th14)
    #[strum(to_string = "ddc", serialize = "th14")]
    Ddc,
    /// Legacy of Lunatic Kingdom (th15)
    #[strum(to_string = "lolk", serialize = "th15")]
    Lolk,
}

impl GameTitle {
    /// Executable name of the game process
    pub fn exe_name(&self) -> &'static str {
        match self {
            Self::Td => "th13.exe",
            Self::Ddc => "th14.exe",
            Self::Lolk => "th15.exe",
        }
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}
