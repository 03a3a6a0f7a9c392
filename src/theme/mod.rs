//! Theme preference context
//!
//! An explicit context object instead of an ambient global: the persisted
//! preference is read once at startup, and every change writes through to
//! the state file. The context is threaded through the server state and the
//! template layer applies it to the document root.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::RwLock;

/// The two UI themes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

/// Holds the current theme and its persistence path
#[derive(Debug)]
pub struct ThemeContext {
    state_path: PathBuf,
    current: RwLock<Theme>,
}

impl ThemeContext {
    /// Read the persisted preference once; a missing or unreadable state
    /// file falls back to the default.
    pub fn init(state_path: PathBuf, default: Theme) -> Self {
        let current = match fs::read_to_string(&state_path) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Unrecognized theme in {:?}, using default", state_path);
                default
            }),
            Err(_) => default,
        };

        Self {
            state_path,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> Theme {
        *self.current.read().expect("theme lock poisoned")
    }

    /// Update the theme and write the preference through to the state file
    pub fn set(&self, theme: Theme) -> io::Result<()> {
        fs::write(&self.state_path, theme.as_str())?;
        *self.current.write().expect("theme lock poisoned") = theme;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_without_state_file_uses_default() {
        let tmp = TempDir::new().unwrap();
        let ctx = ThemeContext::init(tmp.path().join(".theme"), Theme::Dark);
        assert_eq!(ctx.current(), Theme::Dark);
    }

    #[test]
    fn test_init_reads_persisted_preference() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".theme");
        std::fs::write(&path, "light").unwrap();
        let ctx = ThemeContext::init(path, Theme::Dark);
        assert_eq!(ctx.current(), Theme::Light);
    }

    #[test]
    fn test_set_writes_through() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".theme");
        let ctx = ThemeContext::init(path.clone(), Theme::Dark);

        ctx.set(Theme::Light).unwrap();
        assert_eq!(ctx.current(), Theme::Light);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "light");

        // A fresh context sees the persisted change
        let reloaded = ThemeContext::init(path, Theme::Dark);
        assert_eq!(reloaded.current(), Theme::Light);
    }

    #[test]
    fn test_invalid_state_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".theme");
        std::fs::write(&path, "solarized").unwrap();
        let ctx = ThemeContext::init(path, Theme::Dark);
        assert_eq!(ctx.current(), Theme::Dark);
    }
}
