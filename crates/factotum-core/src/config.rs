//! Runtime configuration, threaded explicitly into the session and the
//! memory store at construction time.
//!
//! Values come from environment variables with the defaults the assistant
//! has always shipped with; nothing reads ambient state after startup.

use std::env;
use std::path::PathBuf;

/// Sampling parameters forwarded to the model API.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_tokens: 2048,
        }
    }
}

/// Semantic memory settings.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Memory is opt-in; recall adds latency to every turn.
    pub enabled: bool,
    pub path: PathBuf,
    pub similarity_threshold: f32,
    pub recall_top_n: usize,
    pub embedding_dim: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from(".factotum_memory.json"),
            similarity_threshold: 0.85,
            recall_top_n: 3,
            embedding_dim: 384,
        }
    }
}

/// Connection parameters for the MySQL tool family.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
        }
    }
}

/// Top-level assistant configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: Option<String>,
    /// Fully qualified model resource name.
    pub model: String,
    pub generation: GenerationConfig,
    /// Ceiling on model round-trips within one user turn.
    pub max_iterations: usize,
    pub memory: MemoryConfig,
    pub mysql: MysqlConfig,
}

const MODEL_PRO: &str = "models/gemini-2.5-pro-exp-03-25";
const MODEL_FLASH: &str = "models/gemini-2.5-flash-preview-05-20";

/// Map the short model choice to its resource name. Unknown choices fall
/// back to flash.
pub fn resolve_model_name(choice: &str) -> &'static str {
    match choice.to_lowercase().as_str() {
        "2.5-pro" => MODEL_PRO,
        _ => MODEL_FLASH,
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: MODEL_FLASH.to_string(),
            generation: GenerationConfig::default(),
            max_iterations: 15,
            memory: MemoryConfig::default(),
            mysql: MysqlConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AgentConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let gen_defaults = GenerationConfig::default();
        let mem_defaults = MemoryConfig::default();
        let mysql_defaults = MysqlConfig::default();

        let model = env::var("GEMINI_MODEL")
            .map(|choice| resolve_model_name(&choice).to_string())
            .unwrap_or(defaults.model);

        Self {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            model,
            generation: GenerationConfig {
                temperature: env_parse("TEMPERATURE", gen_defaults.temperature),
                top_k: env_parse("TOP_K", gen_defaults.top_k),
                top_p: env_parse("TOP_P", gen_defaults.top_p),
                max_tokens: env_parse("MAX_TOKENS", gen_defaults.max_tokens),
            },
            max_iterations: env_parse("MAX_ITERATIONS", defaults.max_iterations),
            memory: MemoryConfig {
                enabled: env::var("ENABLE_MEMORY")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(mem_defaults.enabled),
                path: env::var("MEMORY_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(mem_defaults.path),
                similarity_threshold: env_parse(
                    "MEMORY_SIMILARITY_THRESHOLD",
                    mem_defaults.similarity_threshold,
                ),
                recall_top_n: env_parse("MEMORY_RECALL_TOP_N", mem_defaults.recall_top_n),
                embedding_dim: env_parse("EMBEDDING_DIM", mem_defaults.embedding_dim),
            },
            mysql: MysqlConfig {
                host: env::var("MYSQL_HOST").unwrap_or(mysql_defaults.host),
                port: env_parse("MYSQL_PORT", mysql_defaults.port),
                user: env::var("MYSQL_USER").unwrap_or(mysql_defaults.user),
                password: env::var("MYSQL_PASSWORD").unwrap_or(mysql_defaults.password),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let config = AgentConfig::default();
        assert_eq!(config.max_iterations, 15);
        assert_eq!(config.generation.temperature, 0.7);
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.memory.similarity_threshold, 0.85);
        assert_eq!(config.memory.recall_top_n, 3);
        assert_eq!(config.memory.embedding_dim, 384);
        assert!(!config.memory.enabled);
    }

    #[test]
    fn model_choice_resolution() {
        assert_eq!(resolve_model_name("2.5-pro"), MODEL_PRO);
        assert_eq!(resolve_model_name("2.5-flash"), MODEL_FLASH);
        assert_eq!(resolve_model_name("something-else"), MODEL_FLASH);
    }
}
