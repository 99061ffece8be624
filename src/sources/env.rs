//! Environment variable configuration source.

use crate::error::{ReloaderError, Result};
use config::Environment;
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;

/// The variables this source reads; everything else in the environment is
/// ignored.
const KNOWN_VARS: [&str; 5] = [
    "CONFIG_DIR",
    "PROCESS_NAME",
    "PROCESS_PID_FILE",
    "VERBOSE",
    "RELOAD_SIGNAL",
];

/// Raw, unvalidated settings as they appear in the environment.
///
/// Every field is optional here; `ReloaderConfig::from_raw` decides which
/// combinations are acceptable. Empty values are normalised to `None`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RawSettings {
    /// `CONFIG_DIR`: comma-separated directories to watch
    pub config_dir: Option<String>,
    /// `PROCESS_NAME`: executable name of the target process
    pub process_name: Option<String>,
    /// `PROCESS_PID_FILE`: path to a file holding the target PID
    pub process_pid_file: Option<String>,
    /// `VERBOSE`: `"true"` enables per-event logging
    pub verbose: Option<String>,
    /// `RELOAD_SIGNAL`: symbolic signal name
    pub reload_signal: Option<String>,
}

impl RawSettings {
    fn normalized(self) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            config_dir: non_empty(self.config_dir),
            process_name: non_empty(self.process_name),
            process_pid_file: non_empty(self.process_pid_file),
            verbose: non_empty(self.verbose),
            reload_signal: non_empty(self.reload_signal),
        }
    }
}

/// Environment variable configuration source.
///
/// Reads `CONFIG_DIR`, `PROCESS_NAME`, `PROCESS_PID_FILE`, `VERBOSE` and
/// `RELOAD_SIGNAL` through the `config` crate's `Environment` source. Values
/// are taken verbatim, without type coercion. Other variables are never
/// looked at, so unrelated non-UTF-8 or dotted entries cannot interfere.
///
/// # Examples
///
/// ```rust
/// use config_reloader::sources::EnvSource;
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([
///     ("CONFIG_DIR".to_string(), "/etc/myapp".to_string()),
///     ("PROCESS_NAME".to_string(), "myapp".to_string()),
/// ]);
/// let raw = EnvSource::from_vars(vars).load().unwrap();
/// assert_eq!(raw.config_dir.as_deref(), Some("/etc/myapp"));
/// ```
pub struct EnvSource {
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    /// Create a source reading the process environment.
    pub fn new() -> Self {
        Self { vars: None }
    }

    /// Create a source reading an explicit variable map instead of the
    /// process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        Self { vars: Some(vars) }
    }

    /// Load the raw settings.
    ///
    /// # Errors
    ///
    /// Returns `ReloaderError::Config` if a known variable is not valid
    /// UTF-8 or cannot be read as a string.
    pub fn load(&self) -> Result<RawSettings> {
        let vars = match &self.vars {
            Some(vars) => known_vars(
                vars.iter()
                    .map(|(k, v)| (OsString::from(k), OsString::from(v))),
            )?,
            None => known_vars(std::env::vars_os())?,
        };

        let env_source = Environment::default()
            .try_parsing(false)
            .source(Some(vars.into_iter().collect()));

        let settings = config::Config::builder()
            .add_source(env_source)
            .build()
            .map_err(|e| {
                ReloaderError::Config(format!("Failed to load environment variables: {}", e))
            })?;

        let raw = settings.try_deserialize::<RawSettings>().map_err(|e| {
            ReloaderError::Config(format!("Failed to parse environment variables: {}", e))
        })?;

        Ok(raw.normalized())
    }
}

fn known_vars<I>(vars: I) -> Result<HashMap<String, String>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut known = HashMap::new();
    for (key, value) in vars {
        let Some(key) = key.to_str().filter(|k| KNOWN_VARS.contains(k)) else {
            continue;
        };
        let value = value.into_string().map_err(|value| {
            ReloaderError::Config(format!(
                "{} is not valid UTF-8: {}",
                key,
                value.to_string_lossy()
            ))
        })?;
        known.insert(key.to_string(), value);
    }
    Ok(known)
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_all_fields() {
        let source = EnvSource::from_vars(vars(&[
            ("CONFIG_DIR", "/etc/a,/etc/b"),
            ("PROCESS_PID_FILE", "/run/app.pid"),
            ("VERBOSE", "true"),
            ("RELOAD_SIGNAL", "SIGUSR1"),
        ]));

        let raw = source.load().unwrap();
        assert_eq!(raw.config_dir.as_deref(), Some("/etc/a,/etc/b"));
        assert_eq!(raw.process_pid_file.as_deref(), Some("/run/app.pid"));
        assert_eq!(raw.process_name, None);
        assert_eq!(raw.verbose.as_deref(), Some("true"));
        assert_eq!(raw.reload_signal.as_deref(), Some("SIGUSR1"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let source = EnvSource::from_vars(vars(&[
            ("CONFIG_DIR", ""),
            ("PROCESS_NAME", "   "),
        ]));

        let raw = source.load().unwrap();
        assert_eq!(raw, RawSettings::default());
    }

    #[test]
    fn test_unrelated_variables_ignored() {
        let source = EnvSource::from_vars(vars(&[
            ("HOME", "/root"),
            ("PROCESS_NAME", "nginx"),
        ]));

        let raw = source.load().unwrap();
        assert_eq!(raw.process_name.as_deref(), Some("nginx"));
        assert_eq!(raw.config_dir, None);
    }

    #[test]
    fn test_numeric_looking_values_stay_strings() {
        let source = EnvSource::from_vars(vars(&[("PROCESS_NAME", "1234")]));
        let raw = source.load().unwrap();
        assert_eq!(raw.process_name.as_deref(), Some("1234"));
    }

    #[test]
    fn test_dotted_unrelated_key_ignored() {
        let source = EnvSource::from_vars(vars(&[
            ("PROCESS_NAME", "nginx"),
            ("process_name.x", "y"),
            ("CONFIG_DIR.nested", "/x"),
        ]));

        let raw = source.load().unwrap();
        assert_eq!(raw.process_name.as_deref(), Some("nginx"));
        assert_eq!(raw.config_dir, None);
    }

    #[test]
    fn test_non_utf8_unrelated_value_ignored() {
        use std::os::unix::ffi::OsStringExt;

        let known = known_vars([
            (OsString::from("BADVAR"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from("PROCESS_NAME"), OsString::from("nginx")),
        ])
        .unwrap();
        assert_eq!(known.len(), 1);
        assert_eq!(known["PROCESS_NAME"], "nginx");
    }

    #[test]
    fn test_non_utf8_known_value_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let err = known_vars([(
            OsString::from("CONFIG_DIR"),
            OsString::from_vec(vec![b'/', 0xff]),
        )])
        .unwrap_err();
        assert!(matches!(err, ReloaderError::Config(msg) if msg.contains("CONFIG_DIR")));
    }

    #[test]
    fn test_process_environment_loads() {
        assert!(EnvSource::new().load().is_ok());
    }
}
