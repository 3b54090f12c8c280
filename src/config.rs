use serde::{Deserialize, Serialize};

/// When the engine may move cards to the foundations on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AutoPlayMode {
    Never,
    /// Only once the game can no longer be lost: no face-down cards, an empty
    /// stock and at most one card in the waste.
    #[default]
    Won,
    Always,
}

/// Player preferences that change how moves settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auto_flip: bool,
    pub auto_play: AutoPlayMode,
    pub animate_auto_play: bool,
    pub animate_undo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_flip: true,
            auto_play: AutoPlayMode::default(),
            animate_auto_play: false,
            animate_undo: false,
        }
    }
}
