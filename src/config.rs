use std::{fs::File, io::BufReader, path::Path};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{Error, InternalResult};

lazy_static! {
    /// The configuration used by `Parser::parse` and friends.
    pub static ref DEFAULT_CONFIG: ParseConfig = ParseConfig::default();
}

/// Tunables for a single parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Tokens pulled from the stream per read. `None` uses the stream's hint.
    #[serde(default)]
    pub chunk_size: Option<usize>,

    /// Column width of a tab stop when computing character positions.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// How many scratch expected lists a parse keeps for reuse.
    #[serde(default = "default_expected_pool_capacity")]
    pub expected_pool_capacity: usize,

    /// Initial capacity of the token buffer window.
    #[serde(default = "default_initial_buffer_capacity")]
    pub initial_buffer_capacity: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            chunk_size: None,
            tab_width: default_tab_width(),
            expected_pool_capacity: default_expected_pool_capacity(),
            initial_buffer_capacity: default_initial_buffer_capacity(),
        }
    }
}

impl ParseConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn validate(&self) -> InternalResult<()> {
        if self.chunk_size == Some(0) {
            return Err(Error::Config("chunk_size must be greater than 0".into()));
        }
        if self.tab_width == 0 {
            return Err(Error::Config("tab_width must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> InternalResult<Self> {
        let config: ParseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> InternalResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: ParseConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

fn default_tab_width() -> usize {
    4
}

fn default_expected_pool_capacity() -> usize {
    16
}

fn default_initial_buffer_capacity() -> usize {
    64
}
