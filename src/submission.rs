// Submission request model and multipart encoding

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, SubmissionError};

const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const POTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.template";
const FALLBACK_MIME: &str = "application/octet-stream";

/// LLM provider the backend should use to outline the deck
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    Openai,
    Anthropic,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Openai, Provider::Anthropic, Provider::Gemini];

    /// Wire value sent in the `provider` field
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw form values as entered, before trimming
#[derive(Clone, Default)]
pub struct FormFields {
    pub text: String,
    pub guidance: String,
    pub provider: Option<Provider>,
    pub api_key: String,
    pub template: Option<PathBuf>,
}

/// Template file selected for generation
#[derive(Clone, Debug)]
pub struct TemplateFile {
    pub file_name: String,
    pub mime: &'static str,
    pub data: Bytes,
}

impl TemplateFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name);
        Self {
            file_name,
            mime,
            data: data.into(),
        }
    }

    /// Read a template from disk.
    ///
    /// Extensions other than `.pptx`/`.potx` are sent anyway; the backend decides.
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| SubmissionError::Template {
                path: path.display().to_string(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "template.pptx".to_string());

        if !is_presentation_name(&file_name) {
            tracing::warn!(
                file_name = %file_name,
                "Template is not a .pptx or .potx file, the backend may reject it"
            );
        }

        tracing::debug!(file_name = %file_name, bytes = data.len(), "Loaded template");
        Ok(Self::new(file_name, data))
    }
}

/// One submit interaction's worth of data
#[derive(Clone)]
pub struct SubmissionRequest {
    pub text: String,
    pub guidance: String,
    pub provider: Provider,
    pub api_key: String,
    pub template: Option<TemplateFile>,
}

impl SubmissionRequest {
    /// Build a request from raw form values, trimming the free-text fields.
    ///
    /// A missing provider falls back to the first entry of the provider list.
    pub async fn from_fields(fields: &FormFields) -> Result<Self> {
        let template = match &fields.template {
            Some(path) => Some(TemplateFile::load(path).await?),
            None => None,
        };

        Ok(Self {
            text: fields.text.trim().to_string(),
            guidance: fields.guidance.trim().to_string(),
            provider: fields.provider.unwrap_or(Provider::Openai),
            api_key: fields.api_key.trim().to_string(),
            template,
        })
    }

    /// Encode as the multipart body expected by the generation endpoint
    pub fn into_multipart(self) -> Result<Form> {
        let form = Form::new()
            .text("text", self.text)
            .text("guidance", self.guidance)
            .text("provider", self.provider.as_str())
            .text("api_key", self.api_key);

        let Some(template) = self.template else {
            return Ok(form);
        };

        let part = Part::bytes(template.data.to_vec())
            .file_name(template.file_name)
            .mime_str(template.mime)?;

        Ok(form.part("template", part))
    }
}

impl fmt::Debug for SubmissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionRequest")
            .field("text_len", &self.text.len())
            .field("guidance_len", &self.guidance.len())
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field(
                "template",
                &self.template.as_ref().map(|t| t.file_name.as_str()),
            )
            .finish()
    }
}

fn is_presentation_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".pptx") || lower.ends_with(".potx")
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".pptx") {
        PPTX_MIME
    } else if lower.ends_with(".potx") {
        POTX_MIME
    } else {
        FALLBACK_MIME
    }
}
