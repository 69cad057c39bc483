use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub document_root: PathBuf,
    pub words_file: PathBuf,
    pub login_page: PathBuf,
    pub user_count: usize,
    pub read_timeout_seconds: u64,
    pub write_timeout_seconds: u64,
    pub max_request_bytes: usize,
}

impl Config {
    /// Builds a config for the given listen address and document root,
    /// reading the remaining settings from the environment.
    pub fn from_env(host: String, port: u16, document_root: PathBuf) -> Result<Self> {
        Ok(Self {
            host,
            port,
            document_root,
            words_file: env_or("HANGMAN_WORDS_FILE", "words.txt")?,
            login_page: env_or("HANGMAN_LOGIN_PAGE", "login.html")?,
            user_count: env_or("HANGMAN_USER_COUNT", "10")?,
            read_timeout_seconds: env_or("HANGMAN_READ_TIMEOUT_SECONDS", "10")?,
            write_timeout_seconds: env_or("HANGMAN_WRITE_TIMEOUT_SECONDS", "10")?,
            max_request_bytes: env_or("HANGMAN_MAX_REQUEST_BYTES", "65536")?,
        })
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }

    /// Dictionary path, resolved against the document root when relative.
    pub fn words_path(&self) -> PathBuf {
        self.document_root.join(&self.words_file)
    }

    pub fn login_page_path(&self) -> PathBuf {
        self.document_root.join(&self.login_page)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            document_root: PathBuf::from("."),
            words_file: PathBuf::from("words.txt"),
            login_page: PathBuf::from("login.html"),
            user_count: 10,
            read_timeout_seconds: 10,
            write_timeout_seconds: 10,
            max_request_bytes: 64 * 1024,
        }
    }
}

fn env_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    parse_setting(key, &raw)
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid {}: {:?}", key, raw))
}
