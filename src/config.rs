// Loads config.yaml from the working directory into typed settings.
// Every search key is required; only the tuning knobs have defaults.

use crate::error::{ScrapeError, ScrapeResult};
use config::{Config, File, FileFormat};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_CONCURRENCY: usize = 8;

/// One search action, e.g. label `Buy` with query value `BUY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub value: String,
}

// Key names are matched case-sensitively, as written in config.yaml
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(rename = "Postcodes")]
    pub postcodes: Vec<String>,
    #[serde(rename = "Items Link")]
    pub items_link: String,
    #[serde(rename = "Items Count Link")]
    pub items_count_link: String,
    #[serde(rename = "Item Base Link")]
    pub item_base_link: String,
    #[serde(rename = "Image Base Link")]
    pub image_base_link: String,
    #[serde(rename = "Postcode Mark")]
    pub postcode_mark: String,
    #[serde(rename = "Search Limit Mark")]
    pub search_limit_mark: String,
    #[serde(rename = "Action Mark")]
    pub action_mark: String,
    #[serde(rename = "Actions", deserialize_with = "ordered_actions")]
    pub actions: Vec<Action>,

    // Upper bound on listings downloading images at the same time
    #[serde(rename = "Concurrency", default = "default_concurrency")]
    pub concurrency: usize,
    // Treat non-2xx responses as request failures
    #[serde(rename = "Strict Status", default)]
    pub strict_status: bool,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Settings {
    /// Reads `config.yaml` from `config_dir`.
    pub fn load(config_dir: &Path) -> ScrapeResult<Self> {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Err(ScrapeError::Config(format!(
                "{} not found",
                path.display()
            )));
        }

        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_path()).format(FileFormat::Yaml).required(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!(
            postcodes = settings.postcodes.len(),
            actions = settings.actions.len(),
            "Loaded settings from {}",
            path.display()
        );
        Ok(settings)
    }

    fn validate(&self) -> ScrapeResult<()> {
        // An empty token would match between every character of a template
        for (key, token) in [
            ("Postcode Mark", &self.postcode_mark),
            ("Search Limit Mark", &self.search_limit_mark),
            ("Action Mark", &self.action_mark),
        ] {
            if token.is_empty() {
                return Err(ScrapeError::Config(format!("`{}` must not be empty", key)));
            }
        }
        if self.concurrency == 0 {
            return Err(ScrapeError::Config("`Concurrency` must be at least 1".into()));
        }
        Ok(())
    }
}

// Collects the Actions mapping into a Vec so file order survives deserialization.
fn ordered_actions<'de, D>(deserializer: D) -> Result<Vec<Action>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ActionsVisitor;

    impl<'de> Visitor<'de> for ActionsVisitor {
        type Value = Vec<Action>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of action label to query value")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut actions = Vec::new();
            while let Some((label, value)) = map.next_entry::<String, String>()? {
                actions.push(Action { label, value });
            }
            Ok(actions)
        }
    }

    deserializer.deserialize_map(ActionsVisitor)
}
