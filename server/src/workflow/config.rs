use antcore::AnalysisMode;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pixel sizes for the rendered charts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub panel_width: u32,
    pub panel_height: u32,
    pub ranking_width: u32,
    pub ranking_height: u32,
    pub scatter_width: u32,
    pub scatter_height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            panel_width: 500,
            panel_height: 420,
            ranking_width: 1400,
            ranking_height: 1000,
            scatter_width: 1200,
            scatter_height: 700,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_files: usize,
    pub max_upload_bytes: u64,
    pub request_timeout_secs: u64,
    /// Parent for per-request staging directories; system temp dir when unset.
    pub staging_dir: Option<PathBuf>,
    pub default_mode: AnalysisMode,
    pub charts: ChartConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5995)),
            max_files: 10,
            max_upload_bytes: 16 * 1024 * 1024,
            request_timeout_secs: 120,
            staging_dir: None,
            default_mode: AnalysisMode::Transmission,
            charts: ChartConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading server config {}", path_ref.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing server config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(bind: Option<SocketAddr>, mode: Option<AnalysisMode>) -> Self {
        Self::default().with_overrides(bind, mode)
    }

    /// Command-line values win over file values.
    pub fn with_overrides(mut self, bind: Option<SocketAddr>, mode: Option<AnalysisMode>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(mode) = mode {
            self.default_mode = mode;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_accept_ten_files_on_5995() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.bind.port(), 5995);
        assert_eq!(cfg.max_files, 10);
        assert_eq!(cfg.default_mode, AnalysisMode::Transmission);
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"bind: 127.0.0.1:8080\ndefault_mode: reception\ncharts:\n  panel_width: 320\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ServerConfig::load(&path).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(cfg.default_mode, AnalysisMode::Reception);
        assert_eq!(cfg.charts.panel_width, 320);
        assert_eq!(cfg.charts.panel_height, ChartConfig::default().panel_height);
        assert_eq!(cfg.max_files, 10);
    }

    #[test]
    fn shipped_example_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/server.yaml");
        assert_eq!(ServerConfig::load(path).unwrap(), ServerConfig::default());
    }

    #[test]
    fn cli_overrides_win() {
        let cfg = ServerConfig::from_args(
            Some("127.0.0.1:9000".parse().unwrap()),
            Some(AnalysisMode::Reception),
        );
        assert_eq!(cfg.bind.port(), 9000);
        assert_eq!(cfg.default_mode, AnalysisMode::Reception);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(120));
    }
}
