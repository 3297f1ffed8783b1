use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

/// Argon2 cost parameters. The defaults match the argon2 crate's own
/// (19 MiB, 2 iterations, 1 lane), which lands around 100ms per hash on
/// commodity hardware.
#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub min_password_len: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let jwt = JwtConfig {
            secret,
            ttl_hours: env_parse("JWT_TTL_HOURS", 24),
        };
        let hash = HashConfig {
            memory_kib: env_parse("ARGON2_MEMORY_KIB", 19_456),
            iterations: env_parse("ARGON2_ITERATIONS", 2),
            parallelism: env_parse("ARGON2_PARALLELISM", 1),
        };
        let min_password_len = env_parse("MIN_PASSWORD_LEN", 8);

        Ok(Self {
            database_url,
            jwt,
            hash,
            min_password_len,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
