use crate::error::ConfigError;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Holds `template.pdf` and `participants_template.csv`.
    pub assets_dir: PathBuf,
    /// Finished archives are written here.
    pub output_dir: PathBuf,
    pub db_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("CERTBATCH_PORT", "8080");
        let port = port.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            key: "CERTBATCH_PORT",
            value: port.clone(),
        })?;

        Ok(Self {
            host: var("CERTBATCH_HOST", "127.0.0.1"),
            port,
            assets_dir: PathBuf::from(var("CERTBATCH_ASSETS_DIR", "assets")),
            output_dir: PathBuf::from(var("CERTBATCH_OUTPUT_DIR", "archives")),
            db_path: PathBuf::from(var("CERTBATCH_DB_PATH", "certbatch.sqlite")),
        })
    }

    pub fn default_template_path(&self) -> PathBuf {
        self.assets_dir.join("template.pdf")
    }

    pub fn sample_roster_path(&self) -> PathBuf {
        self.assets_dir.join("participants_template.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.default_template_path(), PathBuf::from("assets/template.pdf"));
        assert_eq!(cfg.output_dir, PathBuf::from("archives"));
        assert_eq!(cfg.db_path, PathBuf::from("certbatch.sqlite"));
    }

    #[test]
    fn overrides() {
        let cfg = config(&[("CERTBATCH_PORT", "9000"), ("CERTBATCH_ASSETS_DIR", "/srv/certs")]).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(
            cfg.sample_roster_path(),
            PathBuf::from("/srv/certs/participants_template.csv")
        );
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = config(&[("CERTBATCH_PORT", "http")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for CERTBATCH_PORT: http");
    }
}
