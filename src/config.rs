use std::env;

#[derive(Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub sqlite_path: String,
    pub database_url: Option<String>,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Environment is read here and nowhere else; everything downstream
    /// receives the config struct explicitly.
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(38321);

        let sqlite_path =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "/opt/warbler/data.sqlite".to_string());
        let database_url = env::var("DATABASE_URL").ok();

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        Self {
            server_port,
            sqlite_path,
            database_url,
            bcrypt_cost,
        }
    }

    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let path = self.sqlite_path.trim();
        if path.starts_with("sqlite:") || path.starts_with("file:") {
            return path.to_string();
        }
        format!("sqlite://{}", path)
    }
}
