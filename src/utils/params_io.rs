use anyhow::Context;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Prefix of environment overrides, e.g. `SADF__STOP_TIMEOUT_MS=500`.
pub const ENV_PREFIX: &str = "SADF";

/// Load a config from a single file (format picked by extension).
pub fn load_cfg<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let pb = path.as_ref().to_path_buf();
    if !pb.exists() {
        return Err(anyhow::anyhow!("file {} does not exist", pb.display()));
    }

    let cfg = Config::builder()
        .add_source(File::from(pb.clone()))
        .build()
        .with_context(|| format!("failed to read config from {}", pb.display()))?;

    cfg.try_deserialize()
        .with_context(|| format!("failed to deserialize config from {}", pb.display()))
}

/// Merge several config files, later ones winning, then apply environment
/// overrides. Missing files are skipped.
pub fn load_cfg_merge<T, P>(
    paths: impl IntoIterator<Item = P>,
    env_prefix: Option<&str>,
) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let mut builder = Config::builder();

    for p in paths {
        let pb = p.as_ref().to_path_buf();
        if pb.exists() {
            builder = builder.add_source(File::from(pb));
        } else {
            tracing::debug!("config loading: file {} does not exist", pb.display());
        }
    }

    let prefix = env_prefix.unwrap_or(ENV_PREFIX);
    builder = builder.add_source(
        Environment::with_prefix(prefix)
            .prefix_separator("__")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .with_context(|| "failed to build configuration from provided sources")?;

    cfg.try_deserialize()
        .with_context(|| "failed to deserialize merged configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use std::io::Write;

    #[test]
    fn missing_file_is_an_error() {
        let res = load_cfg::<NetworkConfig>("/definitely/not/here.toml");
        assert!(res.is_err());
    }

    #[test]
    fn loads_network_config_from_json_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("sadfrt-cfg-{}.json", uuid::Uuid::new_v4().simple()));
        {
            let mut f = std::fs::File::create(&path).unwrap();
            write!(
                f,
                r#"{{"stop_timeout_ms": 250, "channel": {{"capacity": 8}}}}"#
            )
            .unwrap();
        }

        let cfg: NetworkConfig = load_cfg(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.stop_timeout_ms, 250);
        assert_eq!(cfg.channel.capacity, Some(8));
        assert_eq!(cfg.default_max_firings, 0);
    }

    #[test]
    fn merge_skips_missing_files() {
        let cfg: NetworkConfig =
            load_cfg_merge(["/definitely/not/here.toml"], Some("SADF_TEST_UNUSED")).unwrap();
        assert_eq!(cfg.stop_timeout_ms, NetworkConfig::default().stop_timeout_ms);
    }
}
