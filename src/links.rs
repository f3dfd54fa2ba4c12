// URL construction from the configured templates.
// Values are inserted verbatim; nothing is percent-encoded.

use crate::config::Settings;

/// Replaces every occurrence of each token with its value, in the order given.
/// A value that itself contains a later token will be rewritten by that token.
pub fn build(template: &str, substitutions: &[(&str, &str)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |url, (token, value)| url.replace(token, value))
}

/// URLs for one postcode/action batch.
#[derive(Debug, Clone, Copy)]
pub struct SearchLinks<'a> {
    settings: &'a Settings,
    postcode: &'a str,
    action_value: &'a str,
}

impl<'a> SearchLinks<'a> {
    pub fn for_batch(settings: &'a Settings, postcode: &'a str, action_value: &'a str) -> Self {
        Self {
            settings,
            postcode,
            action_value,
        }
    }

    pub fn count_url(&self) -> String {
        build(
            &self.settings.items_count_link,
            &[
                (self.settings.postcode_mark.as_str(), self.postcode),
                (self.settings.action_mark.as_str(), self.action_value),
            ],
        )
    }

    pub fn listing_url(&self, count: u64) -> String {
        let limit = count.to_string();
        build(
            &self.settings.items_link,
            &[
                (self.settings.postcode_mark.as_str(), self.postcode),
                (self.settings.action_mark.as_str(), self.action_value),
                (self.settings.search_limit_mark.as_str(), limit.as_str()),
            ],
        )
    }
}
