use anyhow::Error;
use common_macros::hash_map;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DbConfig {
    pub psql_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DirectoryConfig {
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub databases: HashMap<String, DbConfig>,
    pub directory: DirectoryConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: Self = toml::from_str(&contents)?;
        Ok(parsed)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            databases: hash_map! {
                "catalog".into() => DbConfig {
                    psql_url: "postgres://postgres:@localhost/catalog".into(),
                },
            },
            directory: DirectoryConfig { page_size: 5 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    #[test]
    fn load_example_config() -> Result<(), Error> {
        let expected = Config::default();
        let loaded = Config::load("example.toml")?;
        assert_eq!(expected, loaded);

        Ok(())
    }
}
