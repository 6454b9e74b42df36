use crate::{
    common::{CoverOptions, Opener},
    error::Result,
};
use serde::{Deserialize, Serialize};

/// The config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Command used to open protocol references, the URI is appended to it.
    /// Defaults to xdg-open, open or start depending on the platform.
    pub opener: Option<String>,
    /// Whether to strip transparent borders from imported covers
    pub trim_covers: bool,
    /// Largest width or height of an imported cover, in pixels
    pub max_cover_size: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let covers = CoverOptions::default();
        ConfigFile {
            opener: None,
            trim_covers: covers.trim,
            max_cover_size: covers.max_size,
        }
    }
}

impl ConfigFile {
    /// Load ~/.config/touchgrass/touchgrass.toml
    #[mutants::skip] // Cannot test directly, depends on system state
    pub fn load() -> Result<Self> {
        Ok(confy::load("touchgrass")?)
    }

    pub fn cover_options(&self) -> CoverOptions {
        CoverOptions {
            trim: self.trim_covers,
            max_size: self.max_cover_size,
        }
    }

    pub fn opener(&self) -> Result<Opener> {
        Opener::from_config(self.opener.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opener_override() -> Result<()> {
        let config = ConfigFile {
            opener: Some("steam-launch --silent".into()),
            ..Default::default()
        };
        assert_eq!(
            config.opener()?,
            Opener::from_command_line("steam-launch --silent")?
        );
        assert_eq!(ConfigFile::default().opener()?, Opener::platform_default());
        Ok(())
    }

    #[test]
    fn cover_options_follow_file() {
        let config = ConfigFile {
            trim_covers: false,
            max_cover_size: 64,
            ..Default::default()
        };
        assert_eq!(
            config.cover_options(),
            CoverOptions {
                trim: false,
                max_size: 64
            }
        );
    }
}
