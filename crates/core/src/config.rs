use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub convert: ConvertConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extension: String,
    pub exclude: Vec<String>,
    pub skip_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
            exclude: Vec::new(),
            skip_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub confidence: f32,
    pub to_encoding: String,
    pub backup_dir: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            confidence: 0.8,
            to_encoding: "utf-8".to_string(),
            backup_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub file_command: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            file_command: "file".to_string(),
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/recode").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
