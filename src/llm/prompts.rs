//! Prompt templates for cover letters and recruiter Q&A

use crate::config::{Config, PromptConfig};
use crate::error::{ApplyCopilotError, Result};
use askama::Template;
use serde::{Deserialize, Serialize};

/// Company name used when a position string names none.
pub const DEFAULT_COMPANY: &str = "the company";
const DEFAULT_TITLE: &str = "the open position";
const NO_EXAMPLES: &str = "No examples available.";
const TRUNCATION_MARKER: &str = "...";

/// The position currently being targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    pub title: String,
    pub company: String,
    pub description: String,
}

impl JobContext {
    /// Parses a "Title at Company" position string. Splits on the first
    /// `" at "`; without one the whole string is the title. Returns `None`
    /// for a blank position.
    pub fn parse(position: &str, description: &str) -> Option<Self> {
        let position = position.trim();
        if position.is_empty() {
            return None;
        }

        let (title, company) = match position.split_once(" at ") {
            Some((title, company)) => (title.trim(), company.trim()),
            None => (position, ""),
        };

        Some(Self {
            title: if title.is_empty() { DEFAULT_TITLE } else { title }.to_string(),
            company: if company.is_empty() { DEFAULT_COMPANY } else { company }.to_string(),
            description: description.trim().to_string(),
        })
    }

    pub fn position(&self) -> String {
        format!("{} at {}", self.title, self.company)
    }
}

/// Which Q&A system prompt to render.
#[derive(Debug, Clone, Copy)]
pub enum QaMode<'a> {
    NoJobContext,
    JobContext(&'a JobContext),
}

impl<'a> From<Option<&'a JobContext>> for QaMode<'a> {
    fn from(job: Option<&'a JobContext>) -> Self {
        job.map_or(QaMode::NoJobContext, QaMode::JobContext)
    }
}

/// Cuts `description` to `max_chars` characters plus an ellipsis marker.
/// Shorter descriptions come back unchanged.
pub fn truncate_description(description: &str, max_chars: usize) -> String {
    if description.chars().count() <= max_chars {
        description.to_string()
    } else {
        let mut truncated: String = description.chars().take(max_chars).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    }
}

/// The description as it should appear in the Q&A prompt, or `None` when it
/// is too short to be worth including.
pub fn prepare_description(description: &str, limits: &PromptConfig) -> Option<String> {
    let description = description.trim();
    if description.chars().count() < limits.description_min_chars {
        return None;
    }
    Some(truncate_description(description, limits.description_max_chars))
}

/// Inputs for the cover letter prompt.
#[derive(Debug, Clone, Default)]
pub struct CoverLetterFields<'a> {
    pub resume_context: &'a str,
    pub job_description: &'a str,
    pub company: &'a str,
    pub job_title: &'a str,
    pub style_examples: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"You are an expert cover letter writer with extensive experience in crafting compelling cover letters for technical positions.

Your task is to create a personalized cover letter using the following information:

**Position:** {{ job_title }} at {{ company }}

**Resume Context:**
{{ context }}

**Job Description:**
{{ job_description }}

**Cover Letter Style Reference:**
{{ example_style }}

**Candidate name (use exactly for signature):** {{ candidate_name }}

**Instructions:**
1. Analyze the job description to identify the role type and its core requirements
2. Match the most relevant skills and experiences from the resume to the job requirements
3. Follow the writing style, tone, and structure from the provided example cover letters
4. Maintain a professional yet personable tone
5. Highlight specific technical skills, projects, and achievements that align with the position
6. Demonstrate understanding of the company and role
7. Keep the language clear, concise, and impactful
8. Ensure the cover letter does NOT exceed {{ max_words }} words (maximum for a single-page document)
9. End with a proper sign-off (e.g. "Best regards,") followed by the candidate's full name: **{{ candidate_name }}**. Never use a bracketed stand-in for the name; always use the actual name given above.

**Key Style Elements to Follow:**
- Use a formal but engaging tone
- Start with a strong opening that mentions the specific position
- Include 2-3 paragraphs highlighting relevant skills and experiences
- Demonstrate enthusiasm for the role and company
- End with a call to action expressing interest in further discussion
- Write in the language of the example cover letters, following its formal business letter conventions

Generate the complete cover letter following these guidelines:"#,
    ext = "txt"
)]
struct CoverLetterTemplate<'a> {
    context: &'a str,
    job_description: &'a str,
    job_title: &'a str,
    company: &'a str,
    example_style: &'a str,
    candidate_name: &'a str,
    max_words: usize,
}

#[derive(Template)]
#[template(
    source = r#"You are an AI assistant acting on behalf of {{ candidate_name }}, a professional looking for new opportunities. Your role is to help answer questions from potential employers or recruiters based on {{ candidate_name }}'s resume and background information.
{%- if has_job %}

**Position Being Discussed:**
The employer is hiring for the {{ job_title }} role at {{ company }}. Relate your answers to the requirements of this role and explain how {{ candidate_name }}'s experience fits {{ company }}.
{%- if has_description %}

**Job Description:**
{{ job_description }}
{%- endif %}
{%- endif %}

**Your Context:**
You have access to {{ candidate_name }}'s resume and professional background through the provided context. Use this information to provide accurate, relevant answers about their experience, skills, projects, and qualifications.

**Guidelines for Answering:**
1. Be professional, concise, and helpful in your responses
2. Answer based ONLY on the information available in the resume context provided
3. If information is not available in the context, politely indicate that you don't have that specific information and offer to provide related information that is available
4. Highlight relevant strengths, achievements, and experiences that match what the employer is asking about
5. Maintain a confident but humble tone and do not exaggerate
6. Use natural, conversational language while maintaining professionalism
7. Keep responses concise (2-4 paragraphs typically) unless detailed explanation is specifically requested
8. If asked about salary expectations, availability, or other personal preferences, indicate that these details would be best discussed directly with {{ candidate_name }}

**Tone and Style:**
- Professional and courteous
- Knowledgeable about technical details when relevant
- Enthusiastic about opportunities but not overly eager
- Clear and well-structured in your explanations

Always represent {{ candidate_name }}'s interests professionally and accurately."#,
    ext = "txt"
)]
struct QaSystemTemplate<'a> {
    candidate_name: &'a str,
    has_job: bool,
    job_title: &'a str,
    company: &'a str,
    has_description: bool,
    job_description: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"**Resume Context:**
{{ context }}

**Employer's Question:**
{{ question }}

**Your Response:**
Please provide a helpful, professional answer to the employer's question based on the resume context above."#,
    ext = "txt"
)]
struct QaQuestionTemplate<'a> {
    context: &'a str,
    question: &'a str,
}

/// Renders the prompt templates for one candidate.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    candidate_name: String,
    max_words: usize,
    limits: PromptConfig,
}

impl PromptTemplates {
    pub fn new(config: &Config) -> Self {
        Self {
            candidate_name: config.candidate.name.clone(),
            max_words: config.candidate.max_words,
            limits: config.prompts.clone(),
        }
    }

    pub fn render_cover_letter(&self, fields: &CoverLetterFields<'_>) -> Result<String> {
        let company = non_empty_or(fields.company, DEFAULT_COMPANY);
        let job_title = non_empty_or(fields.job_title, DEFAULT_TITLE);
        let example_style = non_empty_or(fields.style_examples, NO_EXAMPLES);

        render(&CoverLetterTemplate {
            context: fields.resume_context,
            job_description: fields.job_description,
            job_title,
            company,
            example_style,
            candidate_name: &self.candidate_name,
            max_words: self.max_words,
        })
    }

    pub fn render_qa_system(&self, mode: QaMode<'_>) -> Result<String> {
        let description;
        let template = match mode {
            QaMode::NoJobContext => QaSystemTemplate {
                candidate_name: &self.candidate_name,
                has_job: false,
                job_title: "",
                company: "",
                has_description: false,
                job_description: "",
            },
            QaMode::JobContext(job) => {
                description = prepare_description(&job.description, &self.limits);
                QaSystemTemplate {
                    candidate_name: &self.candidate_name,
                    has_job: true,
                    job_title: &job.title,
                    company: &job.company,
                    has_description: description.is_some(),
                    job_description: description.as_deref().unwrap_or(""),
                }
            }
        };
        render(&template)
    }

    pub fn render_qa_question(&self, resume_context: &str, question: &str) -> Result<String> {
        render(&QaQuestionTemplate {
            context: resume_context,
            question,
        })
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn render<T: Template>(template: &T) -> Result<String> {
    template
        .render()
        .map_err(|e| ApplyCopilotError::Serialization(format!("Failed to render prompt: {}", e)))
}
