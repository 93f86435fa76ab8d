//! The application session: active index, job context and conversation

use crate::config::Config;
use crate::error::{ApplyCopilotError, Result};
use crate::input::InputManager;
use crate::llm::assembler::{PromptAssembler, PromptKind};
use crate::llm::client::{ChatClient, ChatMessage, OpenAiChatClient};
use crate::llm::examples::StyleExamples;
use crate::llm::generator::ResponseGenerator;
use crate::llm::prompts::{JobContext, PromptTemplates};
use crate::output::writer::{CoverLetterWriter, GeneratedArtifact, OutputFormat};
use crate::processing::document::ResumeVariant;
use crate::processing::embeddings::{embedder_from_config, Embedder};
use crate::processing::index::{EmbeddingIndex, ScoredChunk};
use crate::processing::indexer::{IndexStatus, ResumeIndexer};
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterRequest {
    pub company: String,
    pub job_title: String,
    pub description: String,
    pub format: OutputFormat,
}

impl CoverLetterRequest {
    pub fn validate(&self) -> Result<()> {
        let fields = [&self.company, &self.job_title, &self.description];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ApplyCopilotError::InvalidInput(
                "Please fill in all fields".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub retrieved: Vec<ScoredChunk>,
}

struct ActiveIndex {
    variant: ResumeVariant,
    index: EmbeddingIndex,
}

/// Owns everything that used to be process-wide state. Commands take the
/// session by `&mut` and run one at a time.
pub struct Session {
    config: Config,
    embedder: Box<dyn Embedder>,
    generator: ResponseGenerator,
    templates: PromptTemplates,
    writer: CoverLetterWriter,
    active: Option<ActiveIndex>,
    job_context: Option<JobContext>,
    history: Vec<ChatMessage>,
    examples: StyleExamples,
}

impl Session {
    pub fn new(config: Config, embedder: Box<dyn Embedder>, client: Box<dyn ChatClient>) -> Self {
        Self {
            templates: PromptTemplates::new(&config),
            writer: CoverLetterWriter::from_config(&config),
            generator: ResponseGenerator::new(client),
            embedder,
            config,
            active: None,
            job_context: None,
            history: Vec::new(),
            examples: StyleExamples::default(),
        }
    }

    /// Session backed by the configured hosted services.
    pub fn from_config(config: Config) -> Result<Self> {
        let embedder = embedder_from_config(&config)?;
        let client = OpenAiChatClient::from_config(&config)?;
        Ok(Self::new(config, embedder, Box::new(client)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn active_variant(&self) -> Option<ResumeVariant> {
        self.active.as_ref().map(|a| a.variant)
    }

    pub fn active_index(&self) -> Option<&EmbeddingIndex> {
        self.active.as_ref().map(|a| &a.index)
    }

    pub fn style_examples(&self) -> &StyleExamples {
        &self.examples
    }

    /// Loads or builds the index for `variant` and makes it active. With
    /// `rebuild` the persisted copy is discarded first. On failure the
    /// previously active index stays in place.
    pub async fn index(&mut self, variant: ResumeVariant, rebuild: bool) -> Result<IndexStatus> {
        let outcome = {
            let indexer = ResumeIndexer::new(&self.config, self.embedder.as_ref());
            if rebuild {
                indexer.invalidate(variant)?;
            }
            indexer.index(variant).await?
        };
        let examples = load_style_examples(&self.config).await?;

        let status = outcome.status();
        info!("{}", status.message());
        self.active = Some(ActiveIndex {
            variant,
            index: outcome.index,
        });
        self.examples = examples;
        Ok(status)
    }

    /// Parses "Title at Company" and stores it for later answers. A blank
    /// position clears the context.
    pub fn set_job_context(&mut self, position: &str, description: &str) -> Option<&JobContext> {
        self.job_context = JobContext::parse(position, description);
        match &self.job_context {
            Some(job) => info!("Job context set: {}", job.position()),
            None => info!("Job context cleared"),
        }
        self.job_context.as_ref()
    }

    pub fn clear_job_context(&mut self) {
        self.job_context = None;
    }

    pub fn job_context(&self) -> Option<&JobContext> {
        self.job_context.as_ref()
    }

    /// Validates the request, generates a cover letter from the active
    /// index and saves it in the requested format. A failed save returns
    /// `Unsaved` carrying the generated text.
    pub async fn generate_cover_letter(&self, request: &CoverLetterRequest) -> Result<GeneratedArtifact> {
        request.validate()?;
        let index = self.active_index().ok_or(ApplyCopilotError::IndexNotReady)?;

        let job = JobContext {
            title: request.job_title.trim().to_string(),
            company: request.company.trim().to_string(),
            description: request.description.clone(),
        };
        let prompt = self
            .assembler()
            .build_prompt(Some(index), PromptKind::CoverLetter, &request.description, Some(&job))
            .await?;
        let text = self.generator.generate(&prompt, &[]).await?;

        self.writer
            .save(&text, &job.company, &job.title, request.format)
            .map_err(|e| ApplyCopilotError::Unsaved {
                text,
                source: Box::new(e),
            })
    }

    /// Answers an employer question in the candidate's voice. The question
    /// and answer join the history only when generation succeeds.
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ApplyCopilotError::InvalidInput(
                "Please enter a question".to_string(),
            ));
        }

        let prompt = self
            .assembler()
            .build_prompt(self.active_index(), PromptKind::Qa, question, self.job_context.as_ref())
            .await?;
        let text = self.generator.generate(&prompt, &self.history).await?;

        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(text.clone()));
        Ok(Answer {
            text,
            retrieved: prompt.retrieved,
        })
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Retrieval only, for inspecting what a query would pull in.
    pub async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        self.assembler().retrieve(self.active_index(), query).await
    }

    fn assembler(&self) -> PromptAssembler<'_> {
        PromptAssembler::new(
            &self.templates,
            self.embedder.as_ref(),
            &self.examples,
            self.config.processing.top_k,
        )
    }
}

async fn load_style_examples(config: &Config) -> Result<StyleExamples> {
    let examples = StyleExamples::load(&config.paths.cover_letter_examples_dir, &InputManager::new()).await?;
    if examples.is_empty() {
        warn!("Cover letters will be generated without style examples");
    }
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::llm::client::Role;
    use crate::test_utils::{KeywordEmbedder, RecordingChatClient};
    use tempfile::TempDir;

    fn session_in(dir: &TempDir, client: RecordingChatClient) -> Session {
        session_with(dir, client, |_| {})
    }

    fn session_with(
        dir: &TempDir,
        client: RecordingChatClient,
        configure: impl FnOnce(&mut Config),
    ) -> Session {
        let mut config = Config::default().with_data_dir(dir.path());
        config.candidate.name = "Jane Doe".to_string();
        config.paths.ai_engineer_resume = "resume.txt".to_string();
        std::fs::create_dir_all(&config.paths.resumes_dir).unwrap();
        std::fs::write(
            config.resume_path(ResumeVariant::AiEngineer),
            "Rust engineer who built search ranking models.\u{000C}Python and SQL pipelines.",
        )
        .unwrap();
        configure(&mut config);
        Session::new(config, Box::new(KeywordEmbedder), Box::new(client))
    }

    #[tokio::test]
    async fn test_ask_without_index() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir, RecordingChatClient::replying("unused"));

        let err = session.ask("Why Rust?").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexNotReady);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_grows_only_on_success() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir, RecordingChatClient::failing());
        session.index(ResumeVariant::AiEngineer, false).await.unwrap();

        assert!(session.ask("Why Rust?").await.is_err());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_ask_appends_turns() {
        let dir = TempDir::new().unwrap();
        let client = RecordingChatClient::replying("I love Rust.");
        let calls = client.calls();
        let mut session = session_in(&dir, client);
        session.index(ResumeVariant::AiEngineer, false).await.unwrap();

        session.ask("Why Rust?").await.unwrap();
        let answer = session.ask("And Python?").await.unwrap();

        assert_eq!(answer.text, "I love Rust.");
        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.history()[0].content, "Why Rust?");

        // second call carries system, two history turns, then the new question
        assert_eq!(calls.lock().unwrap()[1].len(), 4);

        session.clear_history();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reindex_keeps_active_index() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir, RecordingChatClient::replying("ok"));
        session.index(ResumeVariant::AiEngineer, false).await.unwrap();

        let err = session.index(ResumeVariant::DataRelated, false).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentLoad);
        assert_eq!(session.active_variant(), Some(ResumeVariant::AiEngineer));
    }

    #[tokio::test]
    async fn test_cover_letter_validation_comes_first() {
        let dir = TempDir::new().unwrap();
        let session = session_in(&dir, RecordingChatClient::replying("Dear team"));
        let request = CoverLetterRequest {
            company: "Acme".to_string(),
            job_title: "  ".to_string(),
            description: "Build things".to_string(),
            format: OutputFormat::Txt,
        };

        let err = session.generate_cover_letter(&request).await.unwrap_err();
        assert_eq!(err.user_message(), "❌ Invalid input: Please fill in all fields");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_generated_text() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("not_a_dir");
        std::fs::write(&blocked, "").unwrap();
        let client = RecordingChatClient::replying("Dear team,\n\nHire me.");
        let calls = client.calls();
        let mut session = session_with(&dir, client, |config| {
            config.paths.output_dir = blocked.clone();
        });
        session.index(ResumeVariant::AiEngineer, false).await.unwrap();

        let request = CoverLetterRequest {
            company: "Acme".to_string(),
            job_title: "ML Engineer".to_string(),
            description: "Build search ranking models".to_string(),
            format: OutputFormat::Txt,
        };
        let err = session.generate_cover_letter(&request).await.unwrap_err();

        assert_eq!(err.unsaved_text(), Some("Dear team,\n\nHire me."));
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_job_context_lifecycle() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir, RecordingChatClient::replying("ok"));

        let job = session.set_job_context("ML Engineer at Acme", "").unwrap();
        assert_eq!(job.company, "Acme");
        assert!(session.set_job_context("   ", "").is_none());

        session.set_job_context("ML Engineer at Acme", "");
        session.clear_job_context();
        assert!(session.job_context().is_none());
    }
}
