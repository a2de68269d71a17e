//! Comment and title rendering.
//!
//! Comments posted back on the source pull request are Handlebars templates
//! rendered without HTML escaping, since GitHub renders them as markdown.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};

use crate::locator::SourcePullRequest;

/// One line per published backport.
pub(crate) const SUCCESS_COMMENT: &str =
    "{{#each backports}}Cherry-pick to `{{this.milestone}}`: `{{this.url}}`\n{{/each}}";

pub(crate) const NO_MERGE_COMMIT_COMMENT: &str = "\
I was unable to cherry-pick this PR because it has no merge commit yet. \
Once it has been merged, please re-run the [Auto Cherry-Picker workflow]({{workflow_url}}).";

pub(crate) const NO_MILESTONE_COMMENT: &str = "\
I was unable to cherry-pick this PR because it has no milestone. \
Please set the milestone this change first landed in and then re-run the \
[Auto Cherry-Picker workflow]({{workflow_url}}).";

pub(crate) const NO_OPEN_MILESTONES_COMMENT: &str = "\
I was unable to cherry-pick this PR: its milestone `{{milestone}}` is not an open milestone, \
so there are no release branches to cherry-pick to. If the milestone is wrong, please fix it \
and then re-run the [Auto Cherry-Picker workflow]({{workflow_url}}).";

/// Recovery steps for an attempt that must redo the cherry-pick by hand.
pub(crate) const CHERRY_PICK_RECOVERY_COMMENT: &str = r#"{{#if (eq outcome "conflicted")}}I was unable to cherry-pick this PR to `{{milestone}}`, likely due to merge conflicts.{{else}}I was unable to prepare a branch for `{{milestone}}`: {{reason}}{{/if}}

Steps to cherry-pick locally:

1. Make sure your git working directory is clean.
2. Run these commands to reproduce the cherry-pick:
   ```bash
{{recipe}}
   ```
3. {{#if (eq outcome "conflicted")}}Resolve the merge conflicts and commit the result.{{else}}Fix whatever kept the branch from being created, then finish the cherry-pick.{{/if}}
4. Run `{{publish_command}}` to push the branch and open the pull request."#;

/// Recovery steps for an attempt whose cherry-pick applied but did not publish.
pub(crate) const PUBLISH_RECOVERY_COMMENT: &str = r#"I cherry-picked this PR onto `{{milestone}}` cleanly, but could not publish it: {{reason}}

The cherry-pick does not need to be redone. From the checkout it ran in, retry publishing with:
   ```bash
{{recipe}}
   ```
Otherwise re-running the workflow will redo the cherry-pick and publish it."#;

/// Generates the title of a backport pull request.
///
/// Format: "{source title} (Cherry-pick of #{number})"
#[must_use]
pub fn generate_pr_title(source: &SourcePullRequest) -> String {
    format!("{} (Cherry-pick of #{})", source.title, source.number)
}
