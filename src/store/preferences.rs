//! Non-secret user preferences with safe atomic persistence.
//!
//! Loading never fails: a missing, corrupt or unreadable file yields compiled
//! defaults plus a [`LoadOutcome`] describing what happened. Saves go
//! serialize → temp file → fsync → rename, so readers never see a partial
//! write.

use std::fmt;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ──────────────────── schema version ────────────────────

/// Bump when adding fields older builds would misread. Additive changes are
/// covered by `#[serde(default)]`.
const SCHEMA_VERSION: u32 = 1;

// ──────────────────── core preferences ────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub schema_version: u32,

    /// Set once the onboarding flow has been completed or skipped.
    pub has_onboarded: bool,

    pub theme: Theme,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            has_onboarded: false,
            theme: Theme::default(),
        }
    }
}

/// Color scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Follow the system appearance.
    #[default]
    System,
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme {other:?} (expected system, light or dark)")),
        }
    }
}

// ──────────────────── validation ────────────────────

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Normalize loaded preferences and report anything suspicious.
pub fn validate(mut prefs: UserPreferences) -> (UserPreferences, ValidationReport) {
    let mut report = ValidationReport::default();

    if prefs.schema_version > SCHEMA_VERSION {
        report.warnings.push(format!(
            "preferences schema version {} is newer than supported {}; \
             unknown fields will be ignored",
            prefs.schema_version, SCHEMA_VERSION,
        ));
    } else if prefs.schema_version < SCHEMA_VERSION {
        prefs.schema_version = SCHEMA_VERSION;
    }

    (prefs, report)
}

// ──────────────────── persistence ────────────────────

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        prefs: UserPreferences,
        report: ValidationReport,
    },
    /// No file yet: first launch.
    Missing,
    Corrupt {
        details: String,
        defaults: UserPreferences,
    },
    IoError {
        details: String,
        defaults: UserPreferences,
    },
}

impl LoadOutcome {
    #[must_use]
    pub fn into_prefs(self) -> UserPreferences {
        match self {
            Self::Loaded { prefs, .. } => prefs,
            Self::Missing => UserPreferences::default(),
            Self::Corrupt { defaults, .. } | Self::IoError { defaults, .. } => defaults,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Missing)
    }
}

pub fn load(path: &Path) -> LoadOutcome {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return LoadOutcome::Missing,
        // Invalid UTF-8 is bad content, not a read failure.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return LoadOutcome::Corrupt {
                details: e.to_string(),
                defaults: UserPreferences::default(),
            };
        }
        Err(e) => {
            return LoadOutcome::IoError {
                details: e.to_string(),
                defaults: UserPreferences::default(),
            };
        }
    };

    match serde_json::from_str::<UserPreferences>(&content) {
        Ok(prefs) => {
            let (prefs, report) = validate(prefs);
            LoadOutcome::Loaded { prefs, report }
        }
        Err(e) => LoadOutcome::Corrupt {
            details: e.to_string(),
            defaults: UserPreferences::default(),
        },
    }
}

/// Atomic save. Creates parent directories as needed.
pub fn save(prefs: &UserPreferences, path: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(prefs)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    // Same directory keeps the rename on one filesystem.
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    Ok(path.to_path_buf())
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_first_launch() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.schema_version, SCHEMA_VERSION);
        assert!(!prefs.has_onboarded);
        assert_eq!(prefs.theme, Theme::System);
    }

    #[test]
    fn missing_file_is_ok_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load(&dir.path().join("absent.json"));
        assert!(matches!(outcome, LoadOutcome::Missing));
        assert!(outcome.is_ok());
        assert_eq!(outcome.into_prefs(), UserPreferences::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("preferences.json");
        let prefs = UserPreferences {
            has_onboarded: true,
            theme: Theme::Dark,
            ..Default::default()
        };
        save(&prefs, &path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());

        let LoadOutcome::Loaded { prefs: loaded, report } = load(&path) else {
            panic!("expected Loaded");
        };
        assert!(report.is_clean());
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{\"theme\": 42").unwrap();
        let outcome = load(&path);
        assert!(matches!(outcome, LoadOutcome::Corrupt { .. }));
        assert!(!outcome.is_ok());
        assert_eq!(outcome.into_prefs(), UserPreferences::default());
    }

    #[test]
    fn unknown_fields_and_partial_files_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"theme":"light","font_scale":1.2}"#).unwrap();
        let prefs = load(&path).into_prefs();
        assert_eq!(prefs.theme, Theme::Light);
        assert!(!prefs.has_onboarded);
    }

    #[test]
    fn newer_schema_warns() {
        let prefs = UserPreferences {
            schema_version: SCHEMA_VERSION + 1,
            ..Default::default()
        };
        let (_, report) = validate(prefs);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" system ".parse::<Theme>().unwrap(), Theme::System);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
