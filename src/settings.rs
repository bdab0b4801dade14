//! The user's settings, read from a JSON file in the mod directory.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Whether the level page's name label is set again after the page has been built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFixupMode {
    #[default]
    Enabled,
    Disabled,
}

/// The most detailed log messages that will be written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// When this is off, no hooks are installed at all.
    pub enabled: bool,

    pub label_fixup: LabelFixupMode,

    pub log_level: LogLevel,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            enabled: true,
            label_fixup: LabelFixupMode::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Options {
    pub const FILE_NAME: &'static str = "opposite_dash.json";

    /// Attempts to parse the contents of `reader` to get an `Options` value.
    fn parse_json(reader: impl Read) -> Result<Options> {
        // Coerce with `?`.
        Ok(serde_json::from_reader(reader)?)
    }

    fn path(dir: &Path) -> PathBuf {
        dir.join(Options::FILE_NAME)
    }

    /// Looks for a settings file in `dir` and loads it.
    fn load_from_file(dir: &Path) -> Result<Option<Options>> {
        let path = Options::path(dir);

        if !path.exists() {
            // This isn't an error, but we didn't find any settings.
            return Ok(None);
        }

        let file = File::open(&path).wrap_err_with(|| format!("opening {}", path.display()))?;

        Options::parse_json(file)
            .wrap_err_with(|| format!("parsing {}", path.display()))
            .map(Some)
    }

    /// Saves the settings to a file in `dir`, returning any errors encountered.
    fn try_save(&self, dir: &Path) -> Result<()> {
        std::fs::write(Options::path(dir), serde_json::to_string_pretty(self)?)?;

        Ok(())
    }

    /// Either loads the settings from `dir` or generates default values for them. Defaults are
    /// written out when there is no file so that there's something to edit.
    pub fn load(dir: Option<&Path>) -> Options {
        let Some(dir) = dir else {
            log::warn!("No mod directory. Defaults will be used.");
            return Options::default();
        };

        match Options::load_from_file(dir) {
            Ok(Some(options)) => return options,

            Ok(None) => {
                log::info!("No settings file found. Defaults will be used.");

                if let Err(err) = Options::default().try_save(dir) {
                    log::warn!("Error saving default settings: {err:?}.");
                }
            }

            Err(err) => {
                log::error!("Error loading settings file: {err:?}. Defaults will be used.")
            }
        };

        Options::default()
    }
}
