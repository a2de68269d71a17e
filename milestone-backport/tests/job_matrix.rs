mod common;

use common::{merged_pull_request, pull_url, runner, FakeForge, FakeVcs};
use milestone_backport::{AttemptOutcome, RunOutcome, RunnerError};

const PR: u64 = 19214;
const FAILURE_LABEL: &str = "auto-cherry-picking-failed";

fn forge_with(milestone: Option<&str>, open: &[&str]) -> FakeForge {
    FakeForge::new()
        .with_pull_request(merged_pull_request(PR, milestone))
        .with_approvers(&["reviewer"])
        .with_milestones(open)
}

fn milestones(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn plan_lists_milestones_without_writing() {
    let (runner, forge, vcs) = runner(
        forge_with(Some("2.16.x"), &["2.17.x", "2.16.x", "2.15.x"]),
        FakeVcs::new(),
    );

    let plan = runner.plan(PR).await.unwrap();

    assert_eq!(plan.outcome, RunOutcome::Done);
    assert!(plan.is_actionable());
    assert_eq!(plan.milestones, milestones(&["2.16.x", "2.17.x"]));
    assert!(forge.writes().is_empty());
    assert!(vcs.calls().is_empty());
}

#[tokio::test]
async fn plan_reports_missing_milestone() {
    let (runner, forge, _vcs) = runner(forge_with(None, &["2.16.x"]), FakeVcs::new());

    let plan = runner.plan(PR).await.unwrap();

    assert_eq!(plan.outcome, RunOutcome::FailedNoMilestone);
    assert!(!plan.is_actionable());
    assert!(plan.milestones.is_empty());
    assert_eq!(forge.comments().len(), 1);
    assert_eq!(forge.label_additions(), vec![vec![FAILURE_LABEL.to_string()]]);
}

#[tokio::test]
async fn successful_pick_leaves_reporting_to_the_finalizer() {
    let (runner, forge, vcs) = runner(forge_with(Some("2.16.x"), &["2.16.x"]), FakeVcs::new());

    let summary = runner.pick(PR, "2.16.x").await.unwrap();

    assert!(summary.all_success());
    assert_eq!(vcs.pushes(), vec!["cherry-pick-19214-to-2.16.x"]);
    assert_eq!(forge.created().len(), 1);
    assert!(forge.comments().is_empty());
    assert!(forge.label_additions().is_empty());
    assert!(forge.label_removals().is_empty());
}

#[tokio::test]
async fn failed_pick_reports_its_own_recipe() {
    let (runner, forge, _vcs) = runner(
        forge_with(Some("2.16.x"), &["2.17.x", "2.16.x"]),
        FakeVcs::new().conflicting_on("cherry-pick-19214-to-2.17.x"),
    );

    let summary = runner.pick(PR, "2.17.x").await.unwrap();

    assert_eq!(summary.attempts[0].outcome, AttemptOutcome::Conflicted);
    let comments = forge.comments();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].contains("git checkout -b cherry-pick-19214-to-2.17.x FETCH_HEAD"));
    assert_eq!(forge.label_additions(), vec![vec![FAILURE_LABEL.to_string()]]);
}

#[tokio::test]
async fn pick_does_not_repeat_locate_feedback() {
    let (runner, forge, _vcs) = runner(forge_with(None, &["2.16.x"]), FakeVcs::new());

    let summary = runner.pick(PR, "2.16.x").await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::FailedNoMilestone);
    assert!(forge.writes().is_empty());
}

#[tokio::test]
async fn report_summarizes_rediscovered_backports() {
    let (runner, forge, _vcs) = runner(
        forge_with(Some("2.16.x"), &["2.17.x", "2.16.x"])
            .with_open_pull_request("cherry-pick-19214-to-2.16.x", 20010)
            .with_open_pull_request("cherry-pick-19214-to-2.17.x", 20011),
        FakeVcs::new(),
    );

    let complete = runner
        .report(PR, &milestones(&["2.16.x", "2.17.x"]))
        .await
        .unwrap();

    assert!(complete);
    assert_eq!(
        forge.comments(),
        vec![format!(
            "Cherry-pick to `2.16.x`: `{}`\nCherry-pick to `2.17.x`: `{}`",
            pull_url(20010),
            pull_url(20011)
        )]
    );
    assert_eq!(forge.label_removals(), vec!["needs-cherrypick"]);
}

#[tokio::test]
async fn report_with_missing_backport_only_labels() {
    let (runner, forge, _vcs) = runner(
        forge_with(Some("2.16.x"), &["2.17.x", "2.16.x"])
            .with_open_pull_request("cherry-pick-19214-to-2.16.x", 20010),
        FakeVcs::new(),
    );

    let complete = runner
        .report(PR, &milestones(&["2.16.x", "2.17.x"]))
        .await
        .unwrap();

    assert!(!complete);
    assert!(forge.comments().is_empty());
    assert!(forge.label_removals().is_empty());
    assert_eq!(forge.label_additions(), vec![vec![FAILURE_LABEL.to_string()]]);
}

#[tokio::test]
async fn report_requires_milestones() {
    let (runner, forge, _vcs) = runner(forge_with(Some("2.16.x"), &["2.16.x"]), FakeVcs::new());

    let result = runner.report(PR, &[]).await;

    assert!(matches!(result, Err(RunnerError::Precondition { .. })));
    assert!(forge.calls().is_empty());
}

#[tokio::test]
async fn manual_publish_pushes_and_opens_the_backport() {
    let (runner, forge, vcs) = runner(forge_with(Some("2.16.x"), &["2.16.x"]), FakeVcs::new());

    let summary = runner.publish(PR, "2.16.x").await.unwrap();

    assert!(summary.all_success());
    assert_eq!(vcs.pushes(), vec!["cherry-pick-19214-to-2.16.x"]);
    let created = forge.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].base, "2.16.x");
    assert_eq!(created[0].reviewers, vec!["reviewer", "author"]);
}

#[tokio::test]
async fn manual_publish_reuses_open_backport() {
    let (runner, forge, vcs) = runner(
        forge_with(Some("2.16.x"), &["2.16.x"])
            .with_open_pull_request("cherry-pick-19214-to-2.16.x", 20010),
        FakeVcs::new(),
    );

    let summary = runner.publish(PR, "2.16.x").await.unwrap();

    assert_eq!(
        summary.attempts[0].outcome,
        AttemptOutcome::Published {
            number: 20010,
            url: pull_url(20010),
            reused: true,
        }
    );
    assert!(vcs.pushes().is_empty());
    assert!(forge.created().is_empty());
}
