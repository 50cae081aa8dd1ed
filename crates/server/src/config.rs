use detector::config::DetectorConfig;
use std::env;
use std::path::{Path, PathBuf};

pub use common::Environment;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub detector: DetectorConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static/output"));

        Ok(Self {
            environment,
            host,
            port,
            output_dir,
            detector: DetectorConfig::from_env()?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fixed single-slot output locations, created at startup and overwritten
/// on each generation.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub output_dir: PathBuf,
    pub processed_image: PathBuf,
    pub chart_image: PathBuf,
    pub pdf_report: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            processed_image: output_dir.join("processed.jpg"),
            chart_image: output_dir.join("chart.png"),
            pdf_report: output_dir.join("blood_report.pdf"),
        }
    }
}
