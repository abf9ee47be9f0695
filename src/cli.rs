use crate::config::{ConfigError, FileConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "httpstatus")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Periodic HTTP status probe emitting JSON readings")]
pub struct Cli {
    /// Print the plugin descriptor and default configuration, then exit
    #[arg(long = "info")]
    pub info: bool,

    /// TOML configuration file (reloaded on SIGHUP)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// URL to probe
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// Asset name attached to every reading
    #[arg(short = 'a', long = "asset")]
    pub asset_name: Option<String>,

    /// Seconds between probes
    #[arg(short = 'r', long = "rate")]
    pub rate: Option<u64>,

    /// PKCS#12 client certificate bundle
    #[arg(long = "pki-file")]
    pub pki_file: Option<String>,

    /// Password for the certificate bundle
    #[arg(long = "pki-passwd")]
    pub pki_passwd: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Append readings to this JSON Lines file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Exit after this many readings
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Config file (if any) with command-line flags layered on top
    pub fn file_config(&self) -> Result<FileConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(base.overlay(self.flag_config()))
    }

    fn flag_config(&self) -> FileConfig {
        FileConfig {
            url: self.url.clone(),
            asset_name: self.asset_name.clone(),
            rate: self.rate,
            pki_file: self.pki_file.clone(),
            pki_passwd: self.pki_passwd.clone(),
            timeout: self.timeout,
        }
    }
}
