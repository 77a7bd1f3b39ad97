// Form submission controller
// Drives one submit: status label, submit control, request, download

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::disposition::filename_from_disposition;
use crate::download;
use crate::error::Result;
use crate::http_client::GenerateClient;
use crate::submission::{FormFields, SubmissionRequest};

/// Status shown while the request is outstanding
pub const IN_PROGRESS_STATUS: &str = "Generating…";

/// One change of the status label, with the submit control state at that moment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEvent {
    pub text: String,
    pub submit_enabled: bool,
}

/// The visible half of the form: status label and submit control
#[derive(Debug)]
pub struct FormView {
    status: String,
    submit_enabled: bool,
    history: Vec<StatusEvent>,
    echo: bool,
}

impl Default for FormView {
    fn default() -> Self {
        Self {
            status: String::new(),
            submit_enabled: true,
            history: Vec::new(),
            echo: false,
        }
    }
}

impl FormView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view that also prints every status change to stdout
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn history(&self) -> &[StatusEvent] {
        &self.history
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        if self.echo {
            println!("{}", self.status);
        }
        self.history.push(StatusEvent {
            text: self.status.clone(),
            submit_enabled: self.submit_enabled,
        });
    }
}

/// Keeps the submit control disabled for as long as it lives
pub struct SubmitGuard<'a> {
    view: &'a mut FormView,
}

impl<'a> SubmitGuard<'a> {
    pub fn engage(view: &'a mut FormView) -> Self {
        view.submit_enabled = false;
        Self { view }
    }
}

impl Deref for SubmitGuard<'_> {
    type Target = FormView;

    fn deref(&self) -> &FormView {
        self.view
    }
}

impl DerefMut for SubmitGuard<'_> {
    fn deref_mut(&mut self) -> &mut FormView {
        self.view
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.view.submit_enabled = true;
    }
}

/// How a submission ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Downloaded { filename: String, path: PathBuf },
    Failed { message: String },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Downloaded { .. })
    }
}

/// Submits forms to one backend and saves results into one directory
pub struct Controller {
    client: GenerateClient,
    api_base: String,
    output_dir: PathBuf,
}

impl Controller {
    pub fn new(
        client: GenerateClient,
        api_base: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Handle one submit of the form.
    ///
    /// Never fails: every error ends up in the status label as `Error: ...`.
    /// The submit control is disabled for the duration and enabled again on
    /// every exit path.
    pub async fn submit(&self, view: &mut FormView, fields: &FormFields) -> SubmitOutcome {
        let mut view = SubmitGuard::engage(view);
        view.set_status(IN_PROGRESS_STATUS);

        match self.generate_and_save(fields).await {
            Ok((filename, path)) => {
                view.set_status(format!("Done — downloaded: {}", filename));
                SubmitOutcome::Downloaded { filename, path }
            }
            Err(e) => {
                tracing::error!(error_kind = e.kind(), error = %e, "Submission failed");
                let message = e.to_string();
                view.set_status(format!("Error: {}", message));
                SubmitOutcome::Failed { message }
            }
        }
    }

    async fn generate_and_save(&self, fields: &FormFields) -> Result<(String, PathBuf)> {
        let request = SubmissionRequest::from_fields(fields).await?;
        tracing::info!(
            api_base = %self.api_base,
            provider = %request.provider,
            has_template = request.template.is_some(),
            "Submitting generation request"
        );

        let response = self.client.generate(&self.api_base, request).await?;

        let disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok());
        let suggested = filename_from_disposition(disposition);

        let path = download::save_response(response, &self.output_dir, &suggested).await?;

        // The saved name differs from the suggestion when a file was already there
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or(suggested);
        Ok((filename, path))
    }
}
