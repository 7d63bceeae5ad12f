use std::env;

/// Which entry store the process runs against. File mode is single-tenant
/// with no sign-in; postgres mode is multi-tenant behind JWT auth.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    File { path: String },
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub storage: StorageBackend,

    pub jwt_secret: Option<String>,
    pub jwt_ttl_secs: i64,

    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("postgres") => StorageBackend::Postgres {
                database_url: env::var("DATABASE_URL")
                    .expect("DATABASE_URL must be set when STORAGE_BACKEND=postgres"),
            },
            _ => StorageBackend::File {
                path: env::var("DATA_FILE").unwrap_or_else(|_| "emotion_history.json".into()),
            },
        };

        // Only the multi-tenant backend signs sessions.
        let jwt_secret = match &storage {
            StorageBackend::Postgres { .. } => Some(
                env::var("JWT_SECRET").expect("JWT_SECRET must be set when STORAGE_BACKEND=postgres"),
            ),
            StorageBackend::File { .. } => env::var("JWT_SECRET").ok(),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            storage,

            jwt_secret,
            jwt_ttl_secs: env::var("JWT_TTL_SECS")
                .unwrap_or_else(|_| "86400".into())
                .parse()
                .expect("JWT_TTL_SECS must be a number"),

            // A missing key must not crash the process; /analyze reports it.
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|s| !s.is_empty()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".into()),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
