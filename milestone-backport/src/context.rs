//! The orchestration context shared by every backport component.

use crate::config::BackportConfig;
use crate::forge::{DryRunForge, Forge, RepoSlug};
use crate::templates::TemplateRenderer;
use crate::vcs::{DryRunVcs, Vcs};
use std::sync::Arc;

/// Everything a backport run needs, built once and passed by reference.
pub struct BackportContext {
    repo: RepoSlug,
    config: BackportConfig,
    forge: Arc<dyn Forge>,
    vcs: Arc<dyn Vcs>,
    renderer: TemplateRenderer,
    dry_run: bool,
}

impl BackportContext {
    /// Creates a context that performs real mutations.
    pub fn new(
        repo: RepoSlug,
        config: BackportConfig,
        forge: Arc<dyn Forge>,
        vcs: Arc<dyn Vcs>,
    ) -> Self {
        Self {
            repo,
            config,
            forge,
            vcs,
            renderer: TemplateRenderer::new(),
            dry_run: false,
        }
    }

    /// Switches to dry-run mode: forge writes and checkout changes are only logged.
    #[must_use]
    pub fn into_dry_run(mut self) -> Self {
        if !self.dry_run {
            self.forge = Arc::new(DryRunForge::new(self.forge));
            self.vcs = Arc::new(DryRunVcs::new(self.vcs));
            self.dry_run = true;
        }
        self
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    pub fn config(&self) -> &BackportConfig {
        &self.config
    }

    pub fn forge(&self) -> &dyn Forge {
        self.forge.as_ref()
    }

    pub fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
