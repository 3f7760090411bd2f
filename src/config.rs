use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "DRIVE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub host: String,

    pub port: u16,

    /// Directory holding file blobs and the metadata snapshot
    pub storage_dir: PathBuf,

    /// Maximum upload size in bytes (default: 10MB)
    pub max_upload_size: usize,

    /// Allowed upload extensions (empty = all allowed)
    #[serde(default)]
    pub allowed_extensions: Vec<String>,

    /// Whether `GET /folders` describes the root in `currentFolder`
    /// or leaves it null
    pub root_listing_current_folder: bool,

    /// Keep the folder tree in `<storage_dir>/index.json`
    pub persist_metadata: bool,

    /// Start with a small fixture tree when there is no snapshot
    pub seed_demo_content: bool,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            storage_dir: PathBuf::from("./data"),
            max_upload_size: 10 * 1024 * 1024, // 10MB
            allowed_extensions: vec![],
            root_listing_current_folder: true,
            persist_metadata: true,
            seed_demo_content: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file named by `DRIVE_CONFIG_PATH`
    /// (`config.toml` when unset), then `DRIVE_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path(), ENV_PREFIX)
    }

    pub fn config_path() -> PathBuf {
        std::env::var("DRIVE_CONFIG_PATH")
            .unwrap_or_else(|_| "config.toml".to_string())
            .into()
    }

    pub fn load_from(path: &Path, env_prefix: &str) -> anyhow::Result<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?)
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_extensions"),
            )
            .build()?
            .try_deserialize::<Self>()?;

        Ok(config)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid host '{}': {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.storage_dir.join("index.json")
    }

    /// Validate file extension
    pub fn is_extension_allowed(&self, path: &Path) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').to_lowercase() == ext_str)
        } else {
            false
        }
    }
}
