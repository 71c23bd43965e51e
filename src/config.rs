/// Column names expected verbatim in the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub date: String,
    pub brand: String,
    pub fuel: String,
    pub transmission: String,
    pub sales: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            date: "Observations".to_string(),
            brand: "Brand preferences".to_string(),
            fuel: "Fuel types".to_string(),
            transmission: "Transmission".to_string(),
            sales: "Total sales".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub host: String,
    pub port: u16,
    pub columns: Columns,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Columns::default();
        Self {
            data_path: std::env::var("DATA_PATH").unwrap_or_else(|_| "automobile excel sheet.csv".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8050),
            columns: Columns {
                date: std::env::var("DATE_COLUMN").unwrap_or(defaults.date),
                brand: std::env::var("BRAND_COLUMN").unwrap_or(defaults.brand),
                fuel: std::env::var("FUEL_COLUMN").unwrap_or(defaults.fuel),
                transmission: std::env::var("TRANSMISSION_COLUMN").unwrap_or(defaults.transmission),
                sales: std::env::var("SALES_COLUMN").unwrap_or(defaults.sales),
            },
        }
    }

    /// First positional argument replaces `DATA_PATH`.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(path) = args.nth(1) {
            self.data_path = path;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
