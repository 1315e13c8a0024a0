use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use headless_core::display::{DisplayConfig, Geometry};

use super::types::{HeadlessConfig, RawDisplaySection, RawHeadlessConfig, RawRunSection};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + explicit file)
    ///
    /// An explicit file is the highest-precedence layer; unlike the implicit
    /// layers it must exist, since the user asked for it by path.
    pub fn load(explicit_path: Option<&Path>) -> Result<HeadlessConfig> {
        let mut raw = RawHeadlessConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            let contents = std::fs::read_to_string(&user_path)?;
            let user_config: RawHeadlessConfig = toml::from_str(&contents)?;
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            let contents = std::fs::read_to_string(&project_path)?;
            let project_config: RawHeadlessConfig = toml::from_str(&contents)?;
            raw = Self::merge_raw(raw, project_config);
        }

        // Layer 3: Explicit config file
        if let Some(path) = explicit_path {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let explicit_config: RawHeadlessConfig = toml::from_str(&contents)?;
            raw = Self::merge_raw(raw, explicit_config);
        }

        Self::finalize(raw)
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "headless").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with HEADLESS_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("HEADLESS_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".headless/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawHeadlessConfig, overlay: RawHeadlessConfig) -> RawHeadlessConfig {
        RawHeadlessConfig {
            display: RawDisplaySection {
                number: overlay.display.number.or(base.display.number),
                screen: overlay.display.screen.or(base.display.screen),
                depth: overlay.display.depth.or(base.display.depth),
                xvfb_path: overlay.display.xvfb_path.or(base.display.xvfb_path),
            },
            run: RawRunSection {
                exec: overlay.run.exec.or(base.run.exec),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawHeadlessConfig) -> Result<HeadlessConfig> {
        let defaults = DisplayConfig::default();

        let geometry = match raw.display.screen {
            Some(ref s) => s
                .parse::<Geometry>()
                .with_context(|| format!("invalid display.screen value {:?}", s))?,
            None => defaults.geometry,
        };

        Ok(HeadlessConfig {
            display: DisplayConfig {
                number: raw.display.number.unwrap_or(defaults.number),
                geometry,
                depth: raw.display.depth.unwrap_or(defaults.depth),
                xvfb_path: raw.display.xvfb_path,
                ready_timeout: defaults.ready_timeout,
            },
            exec: raw.run.exec.unwrap_or(false),
        })
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &std::path::Path) -> Result<HeadlessConfig> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let raw: RawHeadlessConfig = toml::from_str(&contents)?;
            Self::finalize(raw)
        } else {
            Ok(HeadlessConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.display.display_name(), ":99");
        assert_eq!(config.display.screen_spec(), "1280x720x16");
        assert!(!config.exec);
    }

    #[test]
    fn load_from_valid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[display]
number = 42
screen = "800x600"
depth = 24

[run]
exec = true
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.display.display_name(), ":42");
        assert_eq!(config.display.screen_spec(), "800x600x24");
        assert!(config.exec);
    }

    #[test]
    fn load_partial_toml_keeps_defaults_for_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "[display]\nnumber = 7\n").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.display.display_name(), ":7");
        assert_eq!(config.display.screen_spec(), "1280x720x16");
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.toml");

        std::fs::write(&path, "this is not valid toml {{{{").unwrap();

        assert!(ConfigLoader::load_from_path(&path).is_err());
    }

    #[test]
    fn load_invalid_geometry_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "[display]\nscreen = \"wide\"\n").unwrap();

        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("display.screen"));
    }

    #[test]
    fn merge_raw_overlay_overrides_base() {
        let base = RawHeadlessConfig {
            display: RawDisplaySection {
                number: Some(99),
                screen: Some("1280x720".to_string()),
                depth: Some(16),
                xvfb_path: None,
            },
            run: RawRunSection { exec: Some(false) },
        };

        let overlay = RawHeadlessConfig {
            display: RawDisplaySection {
                number: Some(42),
                screen: None, // Should preserve base value
                depth: Some(24),
                xvfb_path: Some(PathBuf::from("/opt/x/Xvfb")),
            },
            run: RawRunSection { exec: Some(true) },
        };

        let merged = ConfigLoader::merge_raw(base, overlay);

        assert_eq!(merged.display.number, Some(42));
        // overlay's None falls through to base value via .or()
        assert_eq!(merged.display.screen, Some("1280x720".to_string()));
        assert_eq!(merged.display.depth, Some(24));
        assert_eq!(merged.display.xvfb_path, Some(PathBuf::from("/opt/x/Xvfb")));
        assert_eq!(merged.run.exec, Some(true));
    }

    #[test]
    fn merge_raw_none_preserves_base() {
        let base = RawHeadlessConfig {
            display: RawDisplaySection {
                number: Some(7),
                screen: Some("640x480".to_string()),
                depth: Some(8),
                xvfb_path: None,
            },
            run: RawRunSection { exec: Some(true) },
        };

        let merged = ConfigLoader::merge_raw(base, RawHeadlessConfig::default());

        assert_eq!(merged.display.number, Some(7));
        assert_eq!(merged.display.screen, Some("640x480".to_string()));
        assert_eq!(merged.display.depth, Some(8));
        assert_eq!(merged.run.exec, Some(true));
    }

    #[test]
    fn user_config_path_returns_some() {
        let path = ConfigLoader::user_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("headless"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    #[serial_test::serial]
    fn explicit_config_overrides_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let project_dir = temp_dir.path().join("project");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(
            project_dir.join("config.toml"),
            "[display]\nnumber = 7\ndepth = 24\n",
        )
        .unwrap();

        let explicit = temp_dir.path().join("explicit.toml");
        std::fs::write(&explicit, "[display]\nnumber = 42\n").unwrap();

        // SAFETY: test is serialized; no other thread reads the environment
        unsafe { std::env::set_var("HEADLESS_PROJECT_CONFIG_DIR", &project_dir) };
        let config = ConfigLoader::load(Some(&explicit)).unwrap();
        unsafe { std::env::remove_var("HEADLESS_PROJECT_CONFIG_DIR") };

        // Explicit file wins where it speaks, project fills the rest
        assert_eq!(config.display.display_name(), ":42");
        assert_eq!(config.display.depth, 24);
    }

    #[test]
    #[serial_test::serial]
    fn explicit_config_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        // keep the implicit project layer out of the way
        unsafe { std::env::set_var("HEADLESS_PROJECT_CONFIG_DIR", temp_dir.path()) };
        let result = ConfigLoader::load(Some(std::path::Path::new(
            "/nonexistent/headless.toml",
        )));
        unsafe { std::env::remove_var("HEADLESS_PROJECT_CONFIG_DIR") };

        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    #[serial_test::serial]
    fn project_config_path_env_override() {
        // SAFETY: test is serialized; no other thread reads the environment
        unsafe { std::env::set_var("HEADLESS_PROJECT_CONFIG_DIR", "/tmp/headless-test") };
        assert_eq!(
            ConfigLoader::project_config_path(),
            PathBuf::from("/tmp/headless-test/config.toml")
        );
        unsafe { std::env::remove_var("HEADLESS_PROJECT_CONFIG_DIR") };
    }

    #[test]
    #[serial_test::serial]
    fn project_config_path_default() {
        unsafe { std::env::remove_var("HEADLESS_PROJECT_CONFIG_DIR") };
        assert_eq!(
            ConfigLoader::project_config_path(),
            PathBuf::from(".headless/config.toml")
        );
    }
}
