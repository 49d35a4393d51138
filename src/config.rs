use dotenv::dotenv;
use std::env;

const APP_ID: &str = "APP_ID";
const SYMBOLS: &str = "SYMBOLS";

/// Runtime configuration, loaded from the environment (and a `.env` file when
/// present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier this process reports as the source of its events.
    pub app_id: String,
    /// Symbols whose books are created and seeded at startup.
    pub symbols: Vec<String>,
}

impl Config {
    pub fn from_env() -> Config {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_from_env() -> Result<Config, String> {
        dotenv().ok();

        let app_id = env::var(APP_ID).unwrap_or_else(|_| "ordermatch".to_string());

        let symbols = match env::var(SYMBOLS) {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        };

        Ok(Config { app_id, symbols })
    }

    pub fn default() -> Config {
        Config {
            app_id: "ordermatch".to_string(),
            symbols: vec!["ACME".to_string()],
        }
    }
}
