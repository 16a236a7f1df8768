//! Configure a [`Binder`](crate::Binder).
//!
//! [`BinderConfig`] can be built by hand, deserialized from your own configuration
//! or, with the `config` feature, loaded via [`ConfigLoader`].
use jiff::tz::TimeZone;
use ubyte::{ByteUnit, ToByteUnit};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// The knobs of a [`Binder`](crate::Binder).
pub struct BinderConfig {
    /// Bodies larger than this are rejected before decoding.
    ///
    /// Defaults to 2 MB.
    pub max_body_size: ByteUnit,
    /// The IANA time zone used to interpret time fields whose input carries no offset,
    /// unless the field declares `time_location` or `time_utc`.
    ///
    /// The system time zone is used when unset.
    pub default_time_zone: Option<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2.megabytes(),
            default_time_zone: None,
        }
    }
}

impl BinderConfig {
    /// Resolve [`default_time_zone`](Self::default_time_zone) against the time zone database.
    pub fn time_zone(&self) -> Result<TimeZone, errors::UnknownTimeZone> {
        match &self.default_time_zone {
            Some(name) => TimeZone::get(name).map_err(|source| errors::UnknownTimeZone {
                name: name.clone(),
                source,
            }),
            None => Ok(TimeZone::system()),
        }
    }
}

#[cfg(feature = "config")]
pub use loader::ConfigLoader;

#[cfg(feature = "config")]
mod loader {
    use std::path::PathBuf;

    use anyhow::Context;
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Yaml},
    };

    use super::{BinderConfig, errors};

    static ENV_PREFIX: &str = "TAGBIND_";

    #[derive(Clone, Debug, Default)]
    /// Load a [`BinderConfig`] by merging, in increasing order of precedence:
    ///
    /// 1. the defaults of [`BinderConfig`];
    /// 2. a YAML file, if one was specified and it exists;
    /// 3. environment variables prefixed with `TAGBIND_`, e.g. `TAGBIND_MAX_BODY_SIZE`.
    ///
    /// ```rust,no_run
    /// use tagbind::config::ConfigLoader;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ConfigLoader::new().file("configuration/binder.yml").load()?;
    /// let binder = tagbind::Binder::from_config(&config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub struct ConfigLoader {
        file: Option<PathBuf>,
    }

    impl ConfigLoader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Read configuration values from the YAML file at `path`.
        pub fn file<P: Into<PathBuf>>(mut self, path: P) -> Self {
            self.file = Some(path.into());
            self
        }

        pub fn load(self) -> Result<BinderConfig, errors::ConfigLoadError> {
            let span = tracing::info_span!(
                "Loading binder configuration",
                configuration.file = ?self.file,
            );
            let _guard = span.enter();

            let mut figment = Figment::from(Serialized::defaults(BinderConfig::default()));
            if let Some(file) = self.file {
                figment = figment.merge(Yaml::file(file));
            }
            figment
                .merge(Env::prefixed(ENV_PREFIX).split("__"))
                .extract()
                .context("Failed to load the binder configuration")
                .map_err(errors::ConfigLoadError)
        }
    }
}

/// Errors that can occur when configuring a binder.
pub mod errors {
    #[cfg(feature = "config")]
    #[derive(Debug, thiserror::Error)]
    #[error("Failed to load configuration")]
    /// The error returned by [`ConfigLoader::load`](super::ConfigLoader::load).
    pub struct ConfigLoadError(#[source] pub(super) anyhow::Error);

    #[derive(Debug, thiserror::Error)]
    #[error("`{name}` is not a known time zone")]
    /// The configured default time zone is missing from the time zone database.
    pub struct UnknownTimeZone {
        pub name: String,
        #[source]
        pub(crate) source: jiff::Error,
    }
}

#[cfg(all(test, feature = "config"))]
mod tests {
    use ubyte::ToByteUnit;

    use super::{BinderConfig, ConfigLoader};

    #[test]
    fn defaults_apply_without_any_source() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::new().load().unwrap();
            assert_eq!(config, BinderConfig::default());
            assert_eq!(config.max_body_size, 2.megabytes());
            Ok(())
        });
    }

    #[test]
    fn environment_variables_override_the_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "binder.yml",
                "max_body_size: 1 MiB\ndefault_time_zone: America/New_York\n",
            )?;
            jail.set_env("TAGBIND_DEFAULT_TIME_ZONE", "Europe/Rome");

            let config = ConfigLoader::new().file("binder.yml").load().unwrap();
            assert_eq!(config.max_body_size, 1.mebibytes());
            assert_eq!(config.default_time_zone.as_deref(), Some("Europe/Rome"));
            assert_eq!(config.time_zone().unwrap().iana_name(), Some("Europe/Rome"));
            Ok(())
        });
    }

    #[test]
    fn unknown_time_zones_are_reported() {
        let config = BinderConfig {
            default_time_zone: Some("Mars/Olympus_Mons".into()),
            ..BinderConfig::default()
        };
        let err = config.time_zone().unwrap_err();
        insta::assert_snapshot!(err, @"`Mars/Olympus_Mons` is not a known time zone");
    }
}
