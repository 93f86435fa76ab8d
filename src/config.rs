//! Configuration management for the application assistant

use crate::error::{ApplyCopilotError, Result};
use crate::processing::document::ResumeVariant;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub candidate: CandidateConfig,
    pub paths: PathsConfig,
    pub processing: ProcessingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub prompts: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    pub name: String,
    /// Upper bound on cover letter length, stated to the model
    pub max_words: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub resumes_dir: PathBuf,
    pub cover_letter_examples_dir: PathBuf,
    pub vector_stores_dir: PathBuf,
    pub output_dir: PathBuf,
    pub ai_engineer_resume: String,
    pub data_related_resume: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    OpenAi,
    Model2Vec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub base_url: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Job descriptions shorter than this are left out of the Q&A prompt
    pub description_min_chars: usize,
    pub description_max_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("apply-copilot");

        Self {
            candidate: CandidateConfig {
                name: "Your Name".to_string(),
                max_words: 500,
            },
            paths: PathsConfig {
                resumes_dir: data_dir.join("resumes"),
                cover_letter_examples_dir: data_dir.join("cover_letter_examples"),
                vector_stores_dir: data_dir.join("vector_stores"),
                output_dir: data_dir.join("output"),
                ai_engineer_resume: "ai_engineer_resume.pdf".to_string(),
                data_related_resume: "data_related_resume.pdf".to_string(),
            },
            processing: ProcessingConfig {
                chunk_size: 350,
                chunk_overlap: 50,
                top_k: 3,
            },
            embedding: EmbeddingConfig {
                provider: EmbeddingProvider::OpenAi,
                model: "text-embedding-3-small".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                batch_size: 64,
            },
            llm: LlmConfig {
                model: "gpt-4.1-mini".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                timeout_secs: 120,
            },
            prompts: PromptConfig {
                description_min_chars: 50,
                description_max_chars: 1000,
            },
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| {
                ApplyCopilotError::Configuration(format!("Failed to parse config: {}", e))
            })?
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ApplyCopilotError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("apply-copilot")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.candidate.name.trim().is_empty() {
            return Err(ApplyCopilotError::Configuration(
                "candidate.name must not be empty".to_string(),
            ));
        }
        if self.processing.chunk_size <= self.processing.chunk_overlap {
            return Err(ApplyCopilotError::Configuration(format!(
                "processing.chunk_size ({}) must be greater than processing.chunk_overlap ({})",
                self.processing.chunk_size, self.processing.chunk_overlap
            )));
        }
        if self.processing.top_k == 0 {
            return Err(ApplyCopilotError::Configuration(
                "processing.top_k must be at least 1".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(ApplyCopilotError::Configuration(
                "embedding.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resume_path(&self, variant: ResumeVariant) -> PathBuf {
        let file_name = match variant {
            ResumeVariant::AiEngineer => &self.paths.ai_engineer_resume,
            ResumeVariant::DataRelated => &self.paths.data_related_resume,
        };
        self.paths.resumes_dir.join(file_name)
    }

    pub fn vector_store_path(&self, variant: ResumeVariant) -> PathBuf {
        self.paths.vector_stores_dir.join(variant.storage_name())
    }

    /// Reads the LLM API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ApplyCopilotError::Configuration(format!(
                    "environment variable {} is not set",
                    self.llm.api_key_env
                ))
            })
    }

    /// Points every data directory below `root`. Used by tests and `--data-dir`.
    pub fn with_data_dir(mut self, root: &Path) -> Self {
        self.paths.resumes_dir = root.join("resumes");
        self.paths.cover_letter_examples_dir = root.join("cover_letter_examples");
        self.paths.vector_stores_dir = root.join("vector_stores");
        self.paths.output_dir = root.join("output");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.processing.chunk_size, 350);
        assert_eq!(config.processing.chunk_overlap, 50);
        assert_eq!(config.processing.top_k, 3);
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_chunk() {
        let mut config = Config::default();
        config.processing.chunk_overlap = config.processing.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.llm.model, "gpt-4.1-mini");

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.embedding.provider, EmbeddingProvider::OpenAi);
    }

    #[test]
    fn test_variant_paths() {
        let dir = TempDir::new().unwrap();
        let config = Config::default().with_data_dir(dir.path());

        assert_eq!(
            config.resume_path(ResumeVariant::AiEngineer),
            dir.path().join("resumes").join("ai_engineer_resume.pdf")
        );
        assert_eq!(
            config.vector_store_path(ResumeVariant::DataRelated),
            dir.path().join("vector_stores").join("data_related")
        );
    }
}
