pub mod defaults;
pub mod document;
pub mod types;

pub use defaults::default_config_document;
pub use document::parse_config_document;
pub use types::{CertificateBundle, ConfigError, FileConfig, ProbeConfig};
