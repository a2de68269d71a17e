//! In-memory forge and checkout fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use milestone_backport::forge::{
    LabelRecord, MilestoneRecord, NewPullRequest, OpenPullRequest, PullRequestRecord, UserRecord,
};
use milestone_backport::{
    BackportConfig, BackportContext, CherryPickResult, Forge, ForgeError, RepoSlug, Runner, Vcs,
    VcsError,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

/// A write made against the fake forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgeCall {
    AddLabels { number: u64, labels: Vec<String> },
    RemoveLabel { number: u64, label: String },
    Comment { number: u64, body: String },
    CreatePullRequest(NewPullRequest),
    RequestReviewers { number: u64, reviewers: Vec<String> },
    FindOpenPullRequest { head: String },
}

#[derive(Default)]
struct ForgeState {
    pull_requests: HashMap<u64, PullRequestRecord>,
    approvers: Vec<String>,
    milestones: Vec<MilestoneRecord>,
    open_by_head: HashMap<String, OpenPullRequest>,
    labels: HashMap<u64, HashSet<String>>,
    fail_create: bool,
    fail_backport_labels: bool,
    workflow_file: Option<String>,
    next_number: u64,
    calls: Vec<ForgeCall>,
}

/// Records every write; label mutations are idempotent like GitHub's.
pub struct FakeForge {
    state: Mutex<ForgeState>,
}

impl FakeForge {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ForgeState {
                next_number: 20000,
                ..ForgeState::default()
            }),
        }
    }

    pub fn with_pull_request(self, record: PullRequestRecord) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let labels = record.labels.iter().map(|l| l.name.clone()).collect();
            state.labels.insert(record.number, labels);
            state.pull_requests.insert(record.number, record);
        }
        self
    }

    pub fn with_approvers(self, approvers: &[&str]) -> Self {
        self.state.lock().unwrap().approvers = approvers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_milestones(self, titles: &[&str]) -> Self {
        self.state.lock().unwrap().milestones =
            titles.iter().map(|t| MilestoneRecord::titled(*t)).collect();
        self
    }

    pub fn with_untitled_milestone(self) -> Self {
        self.state
            .lock()
            .unwrap()
            .milestones
            .push(MilestoneRecord { title: None });
        self
    }

    pub fn with_open_pull_request(self, head: &str, number: u64) -> Self {
        self.state.lock().unwrap().open_by_head.insert(
            head.to_string(),
            OpenPullRequest {
                number,
                url: pull_url(number),
            },
        );
        self
    }

    pub fn failing_pull_request_creation(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    /// Labelling an opened backport fails; the source pull request still works.
    pub fn failing_backport_labels(self) -> Self {
        self.state.lock().unwrap().fail_backport_labels = true;
        self
    }

    /// Defines the workflow under a file name other than the configured one.
    pub fn with_workflow_file(self, file: &str) -> Self {
        self.state.lock().unwrap().workflow_file = Some(file.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ForgeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ForgeCall::Comment { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<NewPullRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ForgeCall::CreatePullRequest(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Calls that change something on the platform.
    pub fn writes(&self) -> Vec<ForgeCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, ForgeCall::FindOpenPullRequest { .. }))
            .collect()
    }

    /// Labels added to the seeded pull requests; opened backports are excluded.
    pub fn label_additions(&self) -> Vec<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .calls
            .iter()
            .filter_map(|call| match call {
                ForgeCall::AddLabels { number, labels }
                    if state.pull_requests.contains_key(number) =>
                {
                    Some(labels.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn label_removals(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ForgeCall::RemoveLabel { label, .. } => Some(label),
                _ => None,
            })
            .collect()
    }

    pub fn labels_of(&self, number: u64) -> HashSet<String> {
        self.state
            .lock()
            .unwrap()
            .labels
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }
}

pub fn pull_url(number: u64) -> String {
    format!("https://github.com/pantsbuild/pants/pull/{number}")
}

#[async_trait]
impl Forge for FakeForge {
    async fn pull_request(&self, number: u64) -> Result<PullRequestRecord, ForgeError> {
        self.state
            .lock()
            .unwrap()
            .pull_requests
            .get(&number)
            .cloned()
            .ok_or_else(|| ForgeError::RequestFailed {
                message: format!("pull request #{number} not found"),
            })
    }

    async fn approved_reviewers(&self, _number: u64) -> Result<Vec<String>, ForgeError> {
        Ok(self.state.lock().unwrap().approvers.clone())
    }

    async fn open_milestones(&self) -> Result<Vec<MilestoneRecord>, ForgeError> {
        Ok(self.state.lock().unwrap().milestones.clone())
    }

    async fn workflow_url(&self, workflow_file: &str) -> Result<Option<String>, ForgeError> {
        let state = self.state.lock().unwrap();
        let file = state.workflow_file.as_deref().unwrap_or(workflow_file);
        Ok(Some(format!(
            "https://github.com/pantsbuild/pants/actions/workflows/{file}"
        )))
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), ForgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ForgeCall::AddLabels {
            number,
            labels: labels.to_vec(),
        });
        if state.fail_backport_labels && !state.pull_requests.contains_key(&number) {
            return Err(ForgeError::RequestFailed {
                message: "API rate limit exceeded".to_string(),
            });
        }
        state
            .labels
            .entry(number)
            .or_default()
            .extend(labels.iter().cloned());
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), ForgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ForgeCall::RemoveLabel {
            number,
            label: label.to_string(),
        });
        if let Some(labels) = state.labels.get_mut(&number) {
            labels.remove(label);
        }
        Ok(())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<(), ForgeError> {
        self.state.lock().unwrap().calls.push(ForgeCall::Comment {
            number,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn create_pull_request(
        &self,
        request: &NewPullRequest,
    ) -> Result<OpenPullRequest, ForgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ForgeCall::CreatePullRequest(request.clone()));
        if state.fail_create {
            return Err(ForgeError::RequestFailed {
                message: "Validation Failed".to_string(),
            });
        }

        state.next_number += 1;
        let created = OpenPullRequest {
            number: state.next_number,
            url: pull_url(state.next_number),
        };
        state
            .open_by_head
            .insert(request.head.clone(), created.clone());
        Ok(created)
    }

    async fn request_reviewers(
        &self,
        number: u64,
        reviewers: &[String],
    ) -> Result<(), ForgeError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(ForgeCall::RequestReviewers {
                number,
                reviewers: reviewers.to_vec(),
            });
        Ok(())
    }

    async fn find_open_pull_request(
        &self,
        head_branch: &str,
    ) -> Result<Option<OpenPullRequest>, ForgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ForgeCall::FindOpenPullRequest {
            head: head_branch.to_string(),
        });
        Ok(state.open_by_head.get(head_branch).cloned())
    }

    async fn authenticated_login(&self) -> Result<String, ForgeError> {
        Ok("backport-bot".to_string())
    }
}

/// A git invocation made against the fake checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Fetch {
        remote: String,
        refspec: String,
        depth: u32,
    },
    CheckoutNewBranch {
        branch: String,
        start_point: String,
    },
    CherryPick(String),
    AbortCherryPick,
    Push {
        remote: String,
        branch: String,
    },
}

#[derive(Default)]
struct VcsState {
    missing_refs: HashSet<String>,
    conflicting_branches: HashSet<String>,
    stale_branches: HashSet<String>,
    dirty: bool,
    fail_push: bool,
    current_branch: Option<String>,
    calls: Vec<VcsCall>,
}

/// Scripted checkout: fetches, cherry-picks and pushes succeed unless told otherwise.
pub struct FakeVcs {
    state: Mutex<VcsState>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(VcsState::default()),
        }
    }

    pub fn with_missing_ref(self, refspec: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .missing_refs
            .insert(refspec.to_string());
        self
    }

    pub fn conflicting_on(self, branch: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .conflicting_branches
            .insert(branch.to_string());
        self
    }

    /// Leaves `branch` behind in the checkout, as an earlier run would.
    pub fn with_stale_branch(self, branch: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .stale_branches
            .insert(branch.to_string());
        self
    }

    pub fn dirty(self) -> Self {
        self.state.lock().unwrap().dirty = true;
        self
    }

    pub fn failing_push(self) -> Self {
        self.state.lock().unwrap().fail_push = true;
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                VcsCall::Push { branch, .. } => Some(branch),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Vcs for FakeVcs {
    async fn fetch(&self, remote: &str, refspec: &str, depth: u32) -> Result<(), VcsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::Fetch {
            remote: remote.to_string(),
            refspec: refspec.to_string(),
            depth,
        });
        if state.missing_refs.contains(refspec) {
            return Err(VcsError::CommandFailed {
                command: format!("fetch {remote} {refspec}"),
                stderr: format!("fatal: couldn't find remote ref {refspec}"),
            });
        }
        Ok(())
    }

    async fn checkout_new_branch(&self, branch: &str, start_point: &str) -> Result<(), VcsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::CheckoutNewBranch {
            branch: branch.to_string(),
            start_point: start_point.to_string(),
        });
        if state.stale_branches.contains(branch) {
            return Err(VcsError::BranchExists {
                branch: branch.to_string(),
            });
        }
        state.current_branch = Some(branch.to_string());
        Ok(())
    }

    async fn cherry_pick(&self, sha: &str) -> Result<CherryPickResult, VcsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::CherryPick(sha.to_string()));
        let conflicted = state
            .current_branch
            .as_ref()
            .is_some_and(|branch| state.conflicting_branches.contains(branch));
        if conflicted {
            Ok(CherryPickResult::Conflicted)
        } else {
            Ok(CherryPickResult::Applied)
        }
    }

    async fn abort_cherry_pick(&self) -> Result<(), VcsError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(VcsCall::AbortCherryPick);
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        if state.fail_push {
            return Err(VcsError::CommandFailed {
                command: format!("push -u {remote} {branch}"),
                stderr: "remote: Permission denied".to_string(),
            });
        }
        Ok(())
    }

    async fn is_clean(&self) -> Result<bool, VcsError> {
        Ok(!self.state.lock().unwrap().dirty)
    }
}

/// A merged pull request labelled `needs-cherrypick` and `category:bugfix`.
pub fn merged_pull_request(number: u64, milestone: Option<&str>) -> PullRequestRecord {
    PullRequestRecord {
        number,
        title: Some("Fix lockfile invalidation".to_string()),
        body: Some("Fixes #19000.".to_string()),
        merged: Some(true),
        merge_commit_sha: Some(SHA.to_string()),
        milestone: milestone.map(MilestoneRecord::titled),
        labels: vec![
            LabelRecord {
                name: "needs-cherrypick".to_string(),
            },
            LabelRecord {
                name: "category:bugfix".to_string(),
            },
        ],
        user: Some(UserRecord {
            login: "author".to_string(),
        }),
    }
}

/// Context over the fakes with default settings.
pub fn context(forge: &Arc<FakeForge>, vcs: &Arc<FakeVcs>) -> BackportContext {
    BackportContext::new(
        RepoSlug::new("pantsbuild", "pants"),
        BackportConfig::default(),
        forge.clone(),
        vcs.clone(),
    )
}

/// Runner over the fakes, returning handles to inspect them afterwards.
pub fn runner(forge: FakeForge, vcs: FakeVcs) -> (Runner, Arc<FakeForge>, Arc<FakeVcs>) {
    let forge = Arc::new(forge);
    let vcs = Arc::new(vcs);
    let runner = Runner::from_context(context(&forge, &vcs));
    (runner, forge, vcs)
}
