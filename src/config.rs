//! Application-level configuration loading, including the Flag Memory country
//! catalogue.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::memory::Country;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PARLOR_BACK_CONFIG_PATH";
/// Smallest catalogue that can back every legal card count (60 cards = 30
/// pairs).
const MIN_CATALOGUE_LEN: usize = 30;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    countries: Vec<Country>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in country catalogue.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    if config.countries.len() < MIN_CATALOGUE_LEN {
                        warn!(
                            path = %path.display(),
                            count = config.countries.len(),
                            "configured country catalogue is too small; using built-in defaults"
                        );
                        return Self::default();
                    }
                    info!(
                        path = %path.display(),
                        count = config.countries.len(),
                        "loaded country catalogue from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// The country catalogue backing Flag Memory decks. Process-wide,
    /// immutable, read-only.
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            countries: default_countries(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at
/// [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    countries: Vec<RawCountry>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let countries = value.countries.into_iter().map(Into::into).collect();
        Self { countries }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single catalogue entry.
struct RawCountry {
    key: String,
    flag: String,
    name_ko: String,
}

impl From<RawCountry> for Country {
    fn from(value: RawCountry) -> Self {
        Self {
            key: value.key,
            flag: value.flag,
            name_ko: value.name_ko,
        }
    }
}

/// Resolve the configuration path taking the environment override into
/// account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn country(key: &str, flag: &str, name_ko: &str) -> Country {
    Country {
        key: key.to_string(),
        flag: flag.to_string(),
        name_ko: name_ko.to_string(),
    }
}

/// Built-in country catalogue shipped with the binary.
fn default_countries() -> Vec<Country> {
    vec![
        country("kr", "🇰🇷", "대한민국"),
        country("jp", "🇯🇵", "일본"),
        country("cn", "🇨🇳", "중국"),
        country("us", "🇺🇸", "미국"),
        country("gb", "🇬🇧", "영국"),
        country("fr", "🇫🇷", "프랑스"),
        country("de", "🇩🇪", "독일"),
        country("it", "🇮🇹", "이탈리아"),
        country("es", "🇪🇸", "스페인"),
        country("pt", "🇵🇹", "포르투갈"),
        country("nl", "🇳🇱", "네덜란드"),
        country("be", "🇧🇪", "벨기에"),
        country("ch", "🇨🇭", "스위스"),
        country("at", "🇦🇹", "오스트리아"),
        country("se", "🇸🇪", "스웨덴"),
        country("no", "🇳🇴", "노르웨이"),
        country("fi", "🇫🇮", "핀란드"),
        country("dk", "🇩🇰", "덴마크"),
        country("pl", "🇵🇱", "폴란드"),
        country("ru", "🇷🇺", "러시아"),
        country("ua", "🇺🇦", "우크라이나"),
        country("tr", "🇹🇷", "튀르키예"),
        country("gr", "🇬🇷", "그리스"),
        country("ca", "🇨🇦", "캐나다"),
        country("mx", "🇲🇽", "멕시코"),
        country("br", "🇧🇷", "브라질"),
        country("ar", "🇦🇷", "아르헨티나"),
        country("cl", "🇨🇱", "칠레"),
        country("au", "🇦🇺", "호주"),
        country("nz", "🇳🇿", "뉴질랜드"),
        country("in", "🇮🇳", "인도"),
        country("id", "🇮🇩", "인도네시아"),
        country("th", "🇹🇭", "태국"),
        country("vn", "🇻🇳", "베트남"),
        country("ph", "🇵🇭", "필리핀"),
        country("my", "🇲🇾", "말레이시아"),
        country("sg", "🇸🇬", "싱가포르"),
        country("eg", "🇪🇬", "이집트"),
        country("za", "🇿🇦", "남아프리카 공화국"),
        country("sa", "🇸🇦", "사우디아라비아"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_covers_the_largest_deck() {
        let config = AppConfig::default();
        assert!(config.countries().len() >= MIN_CATALOGUE_LEN);
    }

    #[test]
    fn default_catalogue_keys_are_unique() {
        let config = AppConfig::default();
        let mut keys: Vec<_> = config.countries().iter().map(|c| c.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), config.countries().len());
    }
}
