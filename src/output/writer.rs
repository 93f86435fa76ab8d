//! Saving generated cover letters to disk

use crate::config::Config;
use crate::error::Result;
use crate::output::pdf::{write_pdf, DocumentInfo};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Txt,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// A generated text and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedArtifact {
    pub text: String,
    pub path: PathBuf,
    pub format: OutputFormat,
}

/// Replaces path separators and dots so the value is safe inside a file name.
pub fn sanitize_segment(value: &str) -> String {
    value.replace(['/', '\\', '.'], "_")
}

/// `Cover_Letter_<Candidate>_<Company>_<Title>` with spaces as underscores.
pub fn cover_letter_stem(candidate: &str, company: &str, job_title: &str) -> String {
    format!(
        "Cover_Letter_{}_{}_{}",
        candidate,
        sanitize_segment(company),
        sanitize_segment(job_title)
    )
    .replace(' ', "_")
}

pub struct CoverLetterWriter {
    output_dir: PathBuf,
    candidate: String,
}

impl CoverLetterWriter {
    pub fn new(output_dir: impl Into<PathBuf>, candidate: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            candidate: candidate.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.paths.output_dir, &config.candidate.name)
    }

    /// Writes `text` under the output directory, creating it if needed.
    /// An existing file with the same name is overwritten.
    pub fn save(
        &self,
        text: &str,
        company: &str,
        job_title: &str,
        format: OutputFormat,
    ) -> Result<GeneratedArtifact> {
        std::fs::create_dir_all(&self.output_dir)?;

        let file_name = format!(
            "{}.{}",
            cover_letter_stem(&self.candidate, company, job_title),
            format.extension()
        );
        let path = self.output_dir.join(file_name);

        match format {
            OutputFormat::Txt => std::fs::write(&path, text)?,
            OutputFormat::Pdf => {
                let title = format!("Cover Letter {} - {} - {}", self.candidate, company, job_title);
                write_pdf(
                    &path,
                    text,
                    DocumentInfo {
                        title: &title,
                        author: &self.candidate,
                        subject: "Job Application Cover Letter",
                    },
                )?
            }
        }

        info!("Cover letter saved to: {}", path.display());
        Ok(GeneratedArtifact {
            text: text.to_string(),
            path,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_sanitization() {
        assert_eq!(
            cover_letter_stem("Jane Doe", "Acme/Corp.", "ML Eng."),
            "Cover_Letter_Jane_Doe_Acme_Corp__ML_Eng_"
        );
        assert_eq!(sanitize_segment(r"R\D"), "R_D");
    }

    #[test]
    fn test_save_txt_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let writer = CoverLetterWriter::new(dir.path().join("out"), "Jane Doe");

        let artifact = writer
            .save("Dear team,\n\nThanks.", "Acme", "Data Engineer", OutputFormat::Txt)
            .unwrap();

        assert_eq!(
            artifact.path,
            dir.path().join("out").join("Cover_Letter_Jane_Doe_Acme_Data_Engineer.txt")
        );
        assert_eq!(std::fs::read_to_string(&artifact.path).unwrap(), "Dear team,\n\nThanks.");
    }

    #[test]
    fn test_save_pdf() {
        let dir = TempDir::new().unwrap();
        let writer = CoverLetterWriter::new(dir.path(), "Jane Doe");

        let artifact = writer
            .save("Dear team,\n\nThanks.", "Acme", "ML Engineer", OutputFormat::Pdf)
            .unwrap();

        assert_eq!(artifact.format, OutputFormat::Pdf);
        assert!(artifact.path.ends_with("Cover_Letter_Jane_Doe_Acme_ML_Engineer.pdf"));
        assert!(artifact.path.exists());
    }
}
