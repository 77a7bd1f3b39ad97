use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Password, Select};
use std::path::{Path, PathBuf};

use crate::endpoint;
use crate::submission::{FormFields, Provider};

/// Presentify - turn text into a slide deck using your own template
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Origin the form is served from; loopback origins talk to http://localhost:8000
    #[arg(short, long, env = "PRESENTIFY_ORIGIN", default_value = "http://localhost")]
    pub origin: String,

    /// Text to turn into slides
    #[arg(short, long, env = "PRESENTIFY_TEXT")]
    pub text: Option<String>,

    /// Read the text from a file instead (takes priority over --text)
    #[arg(long)]
    pub text_file: Option<String>,

    /// Optional guidance (tone, audience, structure)
    #[arg(short, long, env = "PRESENTIFY_GUIDANCE")]
    pub guidance: Option<String>,

    /// LLM provider used by the backend
    #[arg(short, long, env = "PRESENTIFY_PROVIDER", value_enum)]
    pub provider: Option<Provider>,

    /// Provider API key (sent to the backend only, never logged)
    #[arg(short = 'k', long, env = "PRESENTIFY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Template file (.pptx or .potx)
    #[arg(short = 'T', long, env = "PRESENTIFY_TEMPLATE")]
    pub template: Option<String>,

    /// Directory the generated deck is saved into
    #[arg(short = 'O', long, env = "PRESENTIFY_OUTPUT_DIR", default_value = ".")]
    pub output_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "30")]
    pub connect_timeout: u64,

    /// Prompt for any field left empty
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Clone)]
pub struct Config {
    // Backend
    pub origin: String,
    pub api_base: String,

    // Output
    pub output_dir: PathBuf,

    // HTTP client
    pub connect_timeout: u64,

    // Logging
    pub log_level: String,

    // Form
    pub interactive: bool,
    pub fields: FormFields,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > .env > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Build a config from already-parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let text = match (&args.text, &args.text_file) {
            (_, Some(file)) => {
                let path = expand_tilde(file);
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read text file: {}", path.display()))?
            }
            (Some(text), None) => text.clone(),
            (None, None) => String::new(),
        };

        let api_base = endpoint::resolve_api_base(&args.origin)?;

        Ok(Config {
            origin: args.origin,
            api_base,
            output_dir: expand_tilde(&args.output_dir),
            connect_timeout: args.connect_timeout,
            log_level: args.log_level,
            interactive: args.interactive,
            fields: FormFields {
                text,
                guidance: args.guidance.unwrap_or_default(),
                provider: args.provider,
                api_key: args.api_key.unwrap_or_default(),
                template: args.template.as_deref().map(expand_tilde),
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.output_dir.is_dir() {
            anyhow::bail!(
                "Output directory does not exist: {}",
                self.output_dir.display()
            );
        }

        Ok(())
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

// === Interactive Form ===

/// Prompt for every field that is still empty.
///
/// Text fields may be left empty; the backend decides what it accepts.
pub fn complete_interactively(fields: &mut FormFields) -> Result<()> {
    println!();
    println!("Presentify - fill in the form (press Enter to leave a field empty)");
    println!();

    if fields.text.trim().is_empty() {
        fields.text = Input::new()
            .with_prompt("Text to turn into slides")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read text")?;
    }

    if fields.guidance.trim().is_empty() {
        fields.guidance = Input::new()
            .with_prompt("Guidance (optional)")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read guidance")?;
    }

    if fields.provider.is_none() {
        let names: Vec<&str> = Provider::ALL.iter().map(|p| p.as_str()).collect();
        let idx = Select::new()
            .with_prompt("LLM provider")
            .items(&names)
            .default(0)
            .interact()
            .context("Failed to read provider selection")?;
        fields.provider = Some(Provider::ALL[idx]);
    }

    if fields.api_key.trim().is_empty() {
        fields.api_key = Password::new()
            .with_prompt("Provider API key")
            .allow_empty_password(true)
            .interact()
            .context("Failed to read API key")?;
    }

    if fields.template.is_none() {
        let template: String = Input::new()
            .with_prompt("Template file (.pptx/.potx, optional)")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read template path")?;
        let template = template.trim();
        if !template.is_empty() {
            fields.template = Some(expand_tilde(template));
        }
    }

    println!();
    Ok(())
}

/// Whether the template path, if any, points at an existing file
pub fn template_exists(fields: &FormFields) -> bool {
    fields.template.as_deref().map_or(true, Path::is_file)
}
