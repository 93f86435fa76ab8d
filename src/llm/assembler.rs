//! Retrieval-augmented prompt assembly

use crate::error::{ApplyCopilotError, Result};
use crate::llm::client::ChatMessage;
use crate::llm::examples::StyleExamples;
use crate::llm::prompts::{CoverLetterFields, JobContext, PromptTemplates, QaMode};
use crate::processing::embeddings::Embedder;
use crate::processing::index::{EmbeddingIndex, ScoredChunk};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    CoverLetter,
    Qa,
}

/// A fully substituted prompt plus the chunks that went into it.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub kind: PromptKind,
    pub system: Option<String>,
    pub user: String,
    pub retrieved: Vec<ScoredChunk>,
}

impl AssembledPrompt {
    /// System prompt first, then `history` in order, then the current turn.
    pub fn messages(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = &self.system {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(self.user.clone()));
        messages
    }
}

pub struct PromptAssembler<'a> {
    templates: &'a PromptTemplates,
    embedder: &'a dyn Embedder,
    examples: &'a StyleExamples,
    top_k: usize,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(
        templates: &'a PromptTemplates,
        embedder: &'a dyn Embedder,
        examples: &'a StyleExamples,
        top_k: usize,
    ) -> Self {
        Self {
            templates,
            embedder,
            examples,
            top_k,
        }
    }

    /// The `top_k` chunks closest to `query`. Fails with `IndexNotReady`
    /// rather than returning an empty context.
    pub async fn retrieve(&self, index: Option<&EmbeddingIndex>, query: &str) -> Result<Vec<ScoredChunk>> {
        let index = index.ok_or(ApplyCopilotError::IndexNotReady)?;
        let query_embedding = self.embedder.embed_query(query).await?;
        let results = index.search(&query_embedding, self.top_k)?;
        info!("Retrieved {} relevant chunks", results.len());
        Ok(results)
    }

    /// Builds the prompt for `kind`. For cover letters `query` is the job
    /// description and `job` supplies title and company; for Q&A `query` is
    /// the employer's question and `job` selects the job-aware system prompt.
    pub async fn build_prompt(
        &self,
        index: Option<&EmbeddingIndex>,
        kind: PromptKind,
        query: &str,
        job: Option<&JobContext>,
    ) -> Result<AssembledPrompt> {
        let retrieved = self.retrieve(index, query).await?;
        let context = join_context(&retrieved);

        let (system, user) = match kind {
            PromptKind::CoverLetter => {
                let style_examples = self.examples.combined();
                let user = self.templates.render_cover_letter(&CoverLetterFields {
                    resume_context: &context,
                    job_description: query,
                    company: job.map(|j| j.company.as_str()).unwrap_or_default(),
                    job_title: job.map(|j| j.title.as_str()).unwrap_or_default(),
                    style_examples: &style_examples,
                })?;
                (None, user)
            }
            PromptKind::Qa => {
                let system = self.templates.render_qa_system(QaMode::from(job))?;
                let user = self.templates.render_qa_question(&context, query)?;
                (Some(system), user)
            }
        };

        debug!(
            "Assembled {:?} prompt: {} chars system, {} chars user",
            kind,
            system.as_ref().map_or(0, String::len),
            user.len()
        );

        Ok(AssembledPrompt {
            kind,
            system,
            user,
            retrieved,
        })
    }
}

/// Chunk texts in rank order, separated by blank lines.
pub fn join_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
