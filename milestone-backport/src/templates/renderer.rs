//! Template renderer.

use super::{
    TemplateError, CHERRY_PICK_RECOVERY_COMMENT, NO_MERGE_COMMIT_COMMENT, NO_MILESTONE_COMMENT,
    NO_OPEN_MILESTONES_COMMENT, PUBLISH_RECOVERY_COMMENT, SUCCESS_COMMENT,
};
use crate::attempt::{AttemptOutcome, BackportAttempt};
use crate::publish::RecoveryRecipe;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Value};

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Usage: `{{#if (eq variable "value")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Renders the comments posted on the source pull request.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the summary posted once every backport is published.
    ///
    /// # Arguments
    ///
    /// * `backports` - `(milestone, pull request URL)` pairs in milestone order
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_success_comment(
        &self,
        backports: &[(String, String)],
    ) -> Result<String, TemplateError> {
        let backports: Vec<Value> = backports
            .iter()
            .map(|(milestone, url)| json!({ "milestone": milestone, "url": url }))
            .collect();

        let rendered = self.render_template(SUCCESS_COMMENT, &json!({ "backports": backports }))?;
        Ok(rendered.trim_end().to_string())
    }

    /// Renders the comment for a pull request that has not been merged.
    pub fn render_no_merge_commit_comment(&self, workflow_url: &str) -> Result<String, TemplateError> {
        self.render_template(NO_MERGE_COMMIT_COMMENT, &json!({ "workflow_url": workflow_url }))
    }

    /// Renders the comment for a pull request without a milestone.
    pub fn render_no_milestone_comment(&self, workflow_url: &str) -> Result<String, TemplateError> {
        self.render_template(NO_MILESTONE_COMMENT, &json!({ "workflow_url": workflow_url }))
    }

    /// Renders the comment for a milestone that is not among the open ones.
    pub fn render_no_open_milestones_comment(
        &self,
        milestone: &str,
        workflow_url: &str,
    ) -> Result<String, TemplateError> {
        self.render_template(
            NO_OPEN_MILESTONES_COMMENT,
            &json!({ "milestone": milestone, "workflow_url": workflow_url }),
        )
    }

    /// Renders the recovery comment for a failed attempt.
    ///
    /// Publish failures get retry-publish guidance; every other failure gets
    /// the steps to redo the cherry-pick locally.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_recovery_comment(
        &self,
        attempt: &BackportAttempt,
        recipe: &RecoveryRecipe,
    ) -> Result<String, TemplateError> {
        let reason = match &attempt.outcome {
            AttemptOutcome::BranchFetchFailed { reason }
            | AttemptOutcome::PublishFailed { reason } => reason.as_str(),
            _ => "",
        };
        let data = json!({
            "milestone": attempt.milestone,
            "branch_name": attempt.branch_name,
            "outcome": attempt.outcome.as_str(),
            "reason": reason,
            "recipe": recipe.script(),
            "publish_command": recipe.publish_command(),
        });

        let template = match attempt.outcome {
            AttemptOutcome::PublishFailed { .. } => PUBLISH_RECOVERY_COMMENT,
            _ => CHERRY_PICK_RECOVERY_COMMENT,
        };
        self.render_template(template, &data)
    }

    fn render_template(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
