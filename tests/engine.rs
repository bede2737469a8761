//! Engine behavior against a scripted in-memory tracker.
//!
//! The tracker answers searches from a fixed table, can be told to reject
//! specific calls, and keeps a log of every call it receives so tests can
//! assert what reached the tracker and in which order.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use buildlink::adapters::live::{BufferedLog, FixedClock, VariableExpander};
use buildlink::config::{CreateIssueOptions, JobConfig, SiteConfig, UpdateIssuesOptions};
use buildlink::context::ServiceContext;
use buildlink::engine::{Engine, Outcome};
use buildlink::error::EngineError;
use buildlink::model::{
    BuildInfo, BuildRun, BuildStatus, ChangeLogEntry, CommandResult, CommandStatus, Issue, User,
};
use buildlink::ports::{BuildLog, NewIssue, TrackerClient, TrackerError};
use buildlink::record::issue_url_for;

const SITE_URL: &str = "https://yt.example.com";

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
}

#[derive(Default)]
struct ScriptedTracker {
    user: Option<User>,
    login_error: bool,
    searches: HashMap<String, Vec<Issue>>,
    failing_searches: HashSet<String>,
    failing_commands: HashSet<(String, String)>,
    empty_comments: HashSet<String>,
    fail_create: bool,
    bundle_lookup_failures: Mutex<usize>,
    add_build_failures: Mutex<usize>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTracker {
    fn logged_in() -> Self {
        Self { user: Some(User { username: "ci".into(), logged_in: true }), ..Self::default() }
    }

    fn with_search(mut self, commit: &str, issues: &[(&str, &str)]) -> Self {
        self.searches.insert(
            format!("vcs changes: {commit}"),
            issues.iter().map(|(id, state)| Issue::new(*id, *state)).collect(),
        );
        self
    }

    fn failing_command(mut self, issue: &str, command: &str) -> Self {
        self.failing_commands.insert((issue.into(), command.into()));
        self
    }

    /// Fails the next `count` calls guarded by `counter`.
    fn take_failure(counter: &Mutex<usize>) -> bool {
        let mut left = counter.lock().unwrap();
        if *left == 0 {
            return false;
        }
        *left -= 1;
        true
    }

    fn call(&self, line: String) {
        self.calls.lock().unwrap().push(line);
    }

    fn ok(issue: Option<&str>, command: &str, user: &User) -> CommandResult {
        CommandResult::new(issue.map(str::to_string), command, at(), &user.username, CommandStatus::Ok)
    }
}

impl TrackerClient for ScriptedTracker {
    fn login(&self, username: &str, _password: &str) -> Result<Option<User>, TrackerError> {
        self.call(format!("login {username}"));
        if self.login_error {
            return Err("connection refused".into());
        }
        Ok(self.user.clone())
    }

    fn search(&self, _user: &User, query: &str) -> Result<Vec<Issue>, TrackerError> {
        self.call(format!("search {query}"));
        if self.failing_searches.contains(query) {
            return Err("search unavailable".into());
        }
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }

    fn create_issue(
        &self,
        _site: &str,
        user: &User,
        issue: &NewIssue<'_>,
    ) -> Result<CommandResult, TrackerError> {
        self.call(format!(
            "create {} | {} | {} | attachment={}",
            issue.project,
            issue.summary,
            issue.description,
            issue.attachment.is_some()
        ));
        if self.fail_create {
            return Err("project not found".into());
        }
        Ok(Self::ok(Some("NEW-1"), "create", user))
    }

    fn comment(
        &self,
        _site: &str,
        user: &User,
        issue: &Issue,
        body: &str,
        _visibility: Option<&str>,
        _silent: bool,
    ) -> Result<Option<CommandResult>, TrackerError> {
        self.call(format!("comment {}\n{body}", issue.id));
        if self.empty_comments.contains(&issue.id) {
            return Ok(None);
        }
        Ok(Some(Self::ok(Some(issue.id.as_str()), "comment", user).with_comment(body)))
    }

    fn apply_command(
        &self,
        _site: &str,
        user: &User,
        issue: &Issue,
        command: &str,
        comment: Option<&str>,
        _visibility: Option<&str>,
        _group: Option<&str>,
        _silent: bool,
    ) -> Result<CommandResult, TrackerError> {
        self.call(format!("apply {} {command} | {}", issue.id, comment.unwrap_or_default()));
        if self.failing_commands.contains(&(issue.id.clone(), command.to_string())) {
            return Err("command rejected".into());
        }
        Ok(Self::ok(Some(issue.id.as_str()), command, user))
    }

    fn build_bundle_name_for_field(
        &self,
        _user: &User,
        project: &str,
        field: &str,
    ) -> Result<Option<String>, TrackerError> {
        self.call(format!("bundle-name {project} {field}"));
        if Self::take_failure(&self.bundle_lookup_failures) {
            return Err("field not found".into());
        }
        Ok(Some("Builds".into()))
    }

    fn add_build_to_bundle(
        &self,
        _site: &str,
        _user: &User,
        bundle: &str,
        build_name: &str,
    ) -> Result<(), TrackerError> {
        self.call(format!("add-build {bundle} {build_name}"));
        if Self::take_failure(&self.add_build_failures) {
            return Err("bundle is archived".into());
        }
        Ok(())
    }
}

struct Harness {
    ctx: ServiceContext,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new(tracker: ScriptedTracker) -> Self {
        let calls = Arc::clone(&tracker.calls);
        let ctx = ServiceContext::new(Box::new(tracker), Box::new(FixedClock(at())));
        Self { ctx, calls }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.starts_with(prefix)).collect()
    }
}

fn build_info() -> BuildInfo {
    BuildInfo {
        number: 1,
        tag: "jenkins-demo-1".into(),
        url: "https://ci.example.com/job/demo/1/".into(),
        result: "SUCCESS".into(),
        log_file: Some("/var/jenkins/jobs/demo/builds/1/log".into()),
    }
}

fn new_run() -> BuildRun {
    BuildRun::new(build_info(), issue_url_for(SITE_URL))
}

fn site() -> SiteConfig {
    let mut site = SiteConfig::new("yt", SITE_URL);
    site.username = "ci".into();
    site.password = Some("secret".into());
    site.project = "TEST".into();
    site.fixed_values = "Fixed,Done,Verified,Won't Fix".into();
    site
}

fn config(site: Option<SiteConfig>, update_issues: UpdateIssuesOptions) -> JobConfig {
    JobConfig { site, update_issues, create_issue: CreateIssueOptions::default() }
}

fn comments_only() -> UpdateIssuesOptions {
    UpdateIssuesOptions::builder()
        .description("")
        .fixed_in_builds_field(None)
        .build()
        .unwrap()
}

fn commands_only(commands: &[&str]) -> UpdateIssuesOptions {
    UpdateIssuesOptions::builder()
        .add_comment(false)
        .fixed_in_builds_field(None)
        .commands(commands.iter().copied())
        .build()
        .unwrap()
}

fn with_commands_enabled() -> SiteConfig {
    let mut site = site();
    site.commands_enabled = true;
    site
}

fn expander() -> VariableExpander {
    VariableExpander::for_build(&build_info(), &BTreeMap::new())
}

fn two_commit_changelog() -> Vec<ChangeLogEntry> {
    vec![ChangeLogEntry::new("test1", "jo", "commit 1"), ChangeLogEntry::new("test2", "al", "commit 2 ^TEST-2")]
}

fn e2e_tracker() -> ScriptedTracker {
    ScriptedTracker::logged_in()
        .with_search("test1", &[("TEST-1", "Fixed"), ("TEST-2", "In Progress"), ("TEST-3", "Won't Fix")])
        .with_search("test2", &[("TEST-2", "In Progress")])
}

fn three_issue_tracker() -> ScriptedTracker {
    ScriptedTracker::logged_in().with_search(
        "test1",
        &[("TEST-1", "Open"), ("TEST-2", "Open"), ("TEST-3", "Open")],
    )
}

fn record_pairs(run: &BuildRun) -> Vec<(String, String)> {
    run.record()
        .unwrap()
        .commands()
        .iter()
        .map(|c| (c.issue_id().unwrap_or_default().to_string(), c.command().to_string()))
        .collect()
}

#[test]
fn links_changesets_to_issues_and_marks_resolved_ones() {
    let harness = Harness::new(e2e_tracker());
    let config = config(Some(site()), comments_only());
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &two_commit_changelog(), &expander(), &log)
        .unwrap();

    let lines = log.lines();
    assert!(lines.contains(&"Looking for issues about changeset: test1".to_string()));
    assert!(lines.contains(&"Looking for issues about changeset: test2".to_string()));
    assert!(lines.contains(&"- found issue: TEST-1 [RESOLVED]".to_string()));
    assert!(lines.contains(&"- found issue: TEST-2".to_string()));
    assert!(lines.contains(&"- found issue: TEST-3 [RESOLVED]".to_string()));
    assert!(lines.contains(&"Commented on TEST-2".to_string()));
    assert_eq!(run.status(), BuildStatus::Success);

    let Outcome::Updated(summary) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(summary.issues, 3);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        harness.calls_starting_with("search"),
        ["search vcs changes: test1", "search vcs changes: test2"]
    );
}

#[test]
fn record_follows_discovery_then_command_order_and_is_repeatable() {
    let run_once = || {
        let tracker = ScriptedTracker::logged_in()
            .with_search("test1", &[("TEST-3", "Open"), ("TEST-1", "Open")])
            .with_search("test2", &[("TEST-2", "Open"), ("TEST-3", "Open")]);
        let harness = Harness::new(tracker);
        let config = config(Some(with_commands_enabled()), commands_only(&["Fixed", "Assignee me"]));
        let mut run = new_run();
        Engine::new(&harness.ctx, &config)
            .update_issues(&mut run, &two_commit_changelog(), &expander(), &BufferedLog::new())
            .unwrap();
        run
    };

    let first = run_once();
    let pairs = record_pairs(&first);
    let expected: Vec<(String, String)> = [
        ("TEST-3", "Fixed"),
        ("TEST-3", "Assignee me"),
        ("TEST-1", "Fixed"),
        ("TEST-1", "Assignee me"),
        ("TEST-2", "Fixed"),
        ("TEST-2", "Assignee me"),
    ]
    .iter()
    .map(|(i, c)| ((*i).to_string(), (*c).to_string()))
    .collect();
    assert_eq!(pairs, expected);

    let second = run_once();
    assert_eq!(first.record(), second.record());
}

#[test]
fn issue_found_twice_gets_one_comment_listing_both_commits() {
    let harness = Harness::new(e2e_tracker());
    let mut site = site();
    site.commands_enabled = true;
    let options = UpdateIssuesOptions::builder()
        .description("")
        .fixed_in_builds_field(None)
        .commands(["Fixed"])
        .build()
        .unwrap();
    let config = config(Some(site), options);
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &two_commit_changelog(), &expander(), &BufferedLog::new())
        .unwrap();

    let record = run.record().unwrap();
    let test2: Vec<_> =
        record.commands().iter().filter(|c| c.issue_id() == Some("TEST-2")).collect();
    assert_eq!(test2.len(), 2);
    assert_eq!(test2[0].command(), "comment");
    assert_eq!(test2[1].command(), "Fixed");

    let comment = test2[0].comment().unwrap();
    assert!(comment.contains("SHA: test1:\ncommit 1\nby jo\n"));
    assert!(comment.contains("SHA: test2:\ncommit 2 ^TEST-2\nby al\n"));
    assert_eq!(harness.calls_starting_with("comment TEST-2").len(), 1);
}

#[test]
fn no_site_means_no_tracker_calls() {
    let harness = Harness::new(e2e_tracker());
    let config = config(None, UpdateIssuesOptions::default());
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &two_commit_changelog(), &expander(), &log)
        .unwrap();

    assert_eq!(outcome, Outcome::Skipped);
    assert!(harness.calls().is_empty());
    assert!(run.record().is_none());
    assert_eq!(run.status(), BuildStatus::Success);
    assert!(log.contains("No YouTrack site configured"));
}

#[test]
fn rejected_login_fails_the_build_without_dispatching() {
    let mut tracker = e2e_tracker();
    tracker.user = Some(User { username: "ci".into(), logged_in: false });
    let harness = Harness::new(tracker);
    let config = config(Some(with_commands_enabled()), commands_only(&["Fixed"]));
    let log = BufferedLog::new();
    let mut run = new_run();

    let result = Engine::new(&harness.ctx, &config).update_issues(
        &mut run,
        &two_commit_changelog(),
        &expander(),
        &log,
    );

    assert!(matches!(result, Err(EngineError::Authentication { ref username }) if username == "ci"));
    assert_eq!(harness.calls(), ["login ci"]);
    assert_eq!(run.status(), BuildStatus::Failure);
    assert!(run.record().is_none());
    assert!(log.contains("Could not login user to YouTrack"));
}

#[test]
fn unreachable_tracker_at_login_fails_the_build() {
    let mut tracker = e2e_tracker();
    tracker.login_error = true;
    let harness = Harness::new(tracker);
    let config = config(Some(site()), comments_only());
    let log = BufferedLog::new();
    let mut run = new_run();

    let result = Engine::new(&harness.ctx, &config).create_issue(&mut run, &expander(), &log);

    assert!(matches!(result, Err(EngineError::Authentication { .. })));
    assert_eq!(run.status(), BuildStatus::Failure);
    assert!(log.contains("Could not login user to YouTrack"));
}

#[test]
fn one_failing_command_does_not_stop_dispatch() {
    let tracker = three_issue_tracker().failing_command("TEST-2", "Assignee me");
    let harness = Harness::new(tracker);
    let config = config(Some(with_commands_enabled()), commands_only(&["Fixed", "Assignee me"]));
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &[ChangeLogEntry::new("test1", "jo", "commit 1")], &expander(), &log)
        .unwrap();

    let record = run.record().unwrap();
    assert_eq!(record.num_commands(), 6);
    let failed: Vec<_> = record.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].issue_id(), Some("TEST-2"));
    assert_eq!(failed[0].command(), "Assignee me");
    assert_eq!(failed[0].date(), at());

    assert!(matches!(outcome, Outcome::Updated(s) if s.attempted == 6 && s.failed == 1));
    assert_eq!(run.status(), BuildStatus::Success);
    assert!(log.contains("FAILED: Applying command: Assignee me, to issue TEST-2"));
}

#[test]
fn every_command_is_logged_per_issue() {
    let harness = Harness::new(three_issue_tracker());
    let commands = ["Fixed", "Assignee me", "tag ci"];
    let config = config(Some(with_commands_enabled()), commands_only(&commands));
    let log = BufferedLog::new();
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &[ChangeLogEntry::new("test1", "jo", "commit 1")], &expander(), &log)
        .unwrap();

    for issue in ["TEST-1", "TEST-2", "TEST-3"] {
        for command in commands {
            let line = format!("Applying command: {command}, to issue {issue}");
            assert!(log.contains(&line), "missing log line: {line}");
        }
    }
    assert!(harness
        .calls_starting_with("apply")
        .iter()
        .all(|c| c.ends_with("| By build jenkins-demo-1.")));
}

#[test]
fn commands_are_skipped_when_the_site_disables_them() {
    let harness = Harness::new(three_issue_tracker());
    let config = config(Some(site()), commands_only(&["Fixed"]));
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config)
        .update_issues(
            &mut run,
            &[ChangeLogEntry::new("test1", "jo", "commit 1")],
            &expander(),
            &BufferedLog::new(),
        )
        .unwrap();

    assert!(harness.calls_starting_with("apply").is_empty());
    assert!(matches!(outcome, Outcome::Updated(s) if s.issues == 3 && s.attempted == 0));
}

#[test]
fn comment_description_expands_build_variables() {
    let tracker = ScriptedTracker::logged_in().with_search("test1", &[("TEST-1", "Open")]);
    let harness = Harness::new(tracker);
    let options = UpdateIssuesOptions::builder()
        .add_commit_summary(false)
        .description("for ${BUILD_NUMBER}")
        .fixed_in_builds_field(None)
        .build()
        .unwrap();
    let config = config(Some(site()), options);
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(
            &mut run,
            &[ChangeLogEntry::new("test1", "jo", "commit 1")],
            &expander(),
            &BufferedLog::new(),
        )
        .unwrap();

    let comments = harness.calls_starting_with("comment TEST-1");
    assert_eq!(
        comments,
        ["comment TEST-1\nRelated build: https://ci.example.com/job/demo/1/\nBuild Result: SUCCESS\nfor 1"]
    );
}

#[test]
fn comments_are_skipped_when_the_site_disables_them() {
    let harness = Harness::new(e2e_tracker());
    let mut site = site();
    site.comments_enabled = false;
    let config = config(Some(site), comments_only());
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &two_commit_changelog(), &expander(), &BufferedLog::new())
        .unwrap();

    assert!(harness.calls_starting_with("comment").is_empty());
    assert_eq!(run.record().unwrap().num_commands(), 0);
}

#[test]
fn missing_comment_result_is_recorded_as_failed() {
    let mut tracker = e2e_tracker();
    tracker.empty_comments.insert("TEST-3".into());
    let harness = Harness::new(tracker);
    let config = config(Some(site()), comments_only());
    let log = BufferedLog::new();
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &two_commit_changelog(), &expander(), &log)
        .unwrap();

    let failed: Vec<_> = run.record().unwrap().failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].issue_id(), Some("TEST-3"));
    assert_eq!(failed[0].command(), "comment");
    assert!(log.contains("FAILED: Commented on TEST-3"));
    assert_eq!(run.status(), BuildStatus::Success);
}

#[test]
fn failed_search_is_recorded_and_other_changesets_continue() {
    let mut tracker = e2e_tracker();
    tracker.failing_searches.insert("vcs changes: test1".into());
    let harness = Harness::new(tracker);
    let config = config(Some(site()), comments_only());
    let log = BufferedLog::new();
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &two_commit_changelog(), &expander(), &log)
        .unwrap();

    assert_eq!(
        record_pairs(&run),
        [(String::new(), "search".to_string()), ("TEST-2".to_string(), "comment".to_string())]
    );
    assert!(log.contains("FAILED: search \"vcs changes: test1\""));
    assert_eq!(run.status(), BuildStatus::Success);
}

#[test]
fn empty_changelog_has_nothing_to_update() {
    let harness = Harness::new(e2e_tracker());
    let config = config(Some(site()), comments_only());
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome =
        Engine::new(&harness.ctx, &config).update_issues(&mut run, &[], &expander(), &log).unwrap();

    assert_eq!(outcome, Outcome::NothingToUpdate);
    assert_eq!(harness.calls(), ["login ci"]);
    assert!(log.contains("No issues to update"));
    let record = run.record().unwrap();
    assert_eq!(record.num_commands(), 0);
    assert_eq!(record.issue_url(), "https://yt.example.com/issue/");
}

#[test]
fn build_is_added_to_fixed_in_builds_bundle() {
    let tracker = ScriptedTracker::logged_in().with_search("test1", &[("TEST-1", "Fixed")]);
    let harness = Harness::new(tracker);
    let options = UpdateIssuesOptions::builder().add_comment(false).build().unwrap();
    let config = config(Some(site()), options);
    let log = BufferedLog::new();
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &[ChangeLogEntry::new("test1", "jo", "commit 1")], &expander(), &log)
        .unwrap();

    assert_eq!(
        harness.calls_starting_with("add-build"),
        ["add-build Builds jenkins-demo-1"]
    );
    assert_eq!(
        harness.calls_starting_with("bundle-name"),
        ["bundle-name TEST Fixed in builds"]
    );
    assert!(log.contains("Added build jenkins-demo-1 to bundle Builds"));
    assert_eq!(run.record().unwrap().num_commands(), 0);
}

#[test]
fn interrupt_stops_before_the_next_tracker_call() {
    let harness = Harness::new(e2e_tracker());
    let config = config(Some(site()), comments_only());
    let mut run = new_run();
    let flag = Arc::new(AtomicBool::new(true));

    let result = Engine::new(&harness.ctx, &config).with_interrupt(flag).update_issues(
        &mut run,
        &two_commit_changelog(),
        &expander(),
        &BufferedLog::new(),
    );

    assert!(matches!(result, Err(EngineError::Interrupted { completed: 0 })));
    assert_eq!(harness.calls(), ["login ci"]);
    assert_eq!(run.record().unwrap().num_commands(), 0);
}

#[test]
fn create_issue_files_and_logs_new_id() {
    let harness = Harness::new(ScriptedTracker::logged_in());
    let config = config(Some(site()), UpdateIssuesOptions::default());
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config).create_issue(&mut run, &expander(), &log).unwrap();

    assert_eq!(
        outcome,
        Outcome::IssueFiled { issue_id: Some("NEW-1".into()), status: CommandStatus::Ok }
    );
    assert!(log.contains("Created new YouTrack issue NEW-1"));
    assert_eq!(
        harness.calls_starting_with("create"),
        ["create TEST | Build jenkins-demo-1 on Jenkins | Automatic issue created by Jenkins for build jenkins-demo-1: https://ci.example.com/job/demo/1/ | attachment=true"]
    );
    assert_eq!(run.record().unwrap().num_commands(), 1);
}

#[test]
fn create_issue_without_build_log_attachment() {
    let harness = Harness::new(ScriptedTracker::logged_in());
    let mut config = config(Some(site()), UpdateIssuesOptions::default());
    config.create_issue.attach_build_log = false;
    config.create_issue.project = Some("OPS".into());
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .create_issue(&mut run, &expander(), &BufferedLog::new())
        .unwrap();

    let calls = harness.calls_starting_with("create");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("create OPS |"));
    assert!(calls[0].ends_with("attachment=false"));
}

#[test]
fn rejected_creation_is_recorded_not_fatal() {
    let mut tracker = ScriptedTracker::logged_in();
    tracker.fail_create = true;
    let harness = Harness::new(tracker);
    let config = config(Some(site()), UpdateIssuesOptions::default());
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config).create_issue(&mut run, &expander(), &log).unwrap();

    assert_eq!(outcome, Outcome::IssueFiled { issue_id: None, status: CommandStatus::Failed });
    assert!(log.contains("FAILED: Creating new YouTrack issue in project TEST"));
    let record = run.record().unwrap();
    assert_eq!(record.failures().count(), 1);
    assert_eq!(record.commands()[0].command(), "create");
    assert_eq!(run.status(), BuildStatus::Success);
}

#[test]
fn create_issue_without_site_is_skipped() {
    let harness = Harness::new(ScriptedTracker::logged_in());
    let config = config(None, UpdateIssuesOptions::default());
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config).create_issue(&mut run, &expander(), &log).unwrap();

    assert_eq!(outcome, Outcome::Skipped);
    assert!(harness.calls().is_empty());
    assert!(log.contains("No YouTrack site configured"));
}

#[test]
fn blank_command_is_rejected_before_any_tracker_call() {
    let harness = Harness::new(three_issue_tracker());
    let mut options = commands_only(&["Fixed"]);
    options.commands.push("  ".into());
    let config = config(Some(with_commands_enabled()), options);
    let mut run = new_run();

    let result = Engine::new(&harness.ctx, &config).update_issues(
        &mut run,
        &[ChangeLogEntry::new("test1", "jo", "commit 1")],
        &expander(),
        &BufferedLog::new(),
    );

    assert!(matches!(result, Err(EngineError::Config(_))));
    assert!(harness.calls().is_empty());
    assert_eq!(run.status(), BuildStatus::Success);
}

#[test]
fn configured_commands_expand_build_variables() {
    let tracker = ScriptedTracker::logged_in().with_search("test2", &[("TEST-2", "Open")]);
    let harness = Harness::new(tracker);
    let config = config(Some(with_commands_enabled()), commands_only(&["for ${BUILD_NUMBER}"]));
    let log = BufferedLog::new();
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &[ChangeLogEntry::new("test2", "al", "commit 2")], &expander(), &log)
        .unwrap();

    assert_eq!(
        log.lines(),
        [
            "Looking for issues about changeset: test2",
            "- found issue: TEST-2",
            "Applying command: for 1, to issue TEST-2",
        ]
    );
    assert_eq!(harness.calls_starting_with("apply"), ["apply TEST-2 for 1 | By build jenkins-demo-1."]);
    assert_eq!(record_pairs(&run), [("TEST-2".to_string(), "for 1".to_string())]);
}

#[test]
fn bundle_failures_do_not_block_later_issues() {
    let tracker = ScriptedTracker::logged_in().with_search("test1", &[("TEST-1", "Open"), ("TEST-2", "Open")]);
    *tracker.bundle_lookup_failures.lock().unwrap() = 1;
    let harness = Harness::new(tracker);
    let options = UpdateIssuesOptions::builder().description("").commands(["Fixed"]).build().unwrap();
    let config = config(Some(with_commands_enabled()), options);
    let log = BufferedLog::new();
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &[ChangeLogEntry::new("test1", "jo", "commit 1")], &expander(), &log)
        .unwrap();

    assert!(log.contains("FAILED: looking up build bundle for field \"Fixed in builds\" in project TEST"));
    assert_eq!(
        record_pairs(&run),
        [
            ("TEST-1".to_string(), "comment".to_string()),
            ("TEST-1".to_string(), "Fixed".to_string()),
            ("TEST-2".to_string(), "comment".to_string()),
            ("TEST-2".to_string(), "Fixed".to_string()),
        ]
    );
    assert_eq!(harness.calls_starting_with("bundle-name").len(), 2);
    assert_eq!(harness.calls_starting_with("add-build"), ["add-build Builds jenkins-demo-1"]);
    assert!(log.contains("Added build jenkins-demo-1 to bundle Builds"));
    assert!(matches!(outcome, Outcome::Updated(s) if s.failed == 0));
    assert_eq!(run.status(), BuildStatus::Success);
}

#[test]
fn failed_add_to_bundle_is_logged_and_dispatch_continues() {
    let tracker = ScriptedTracker::logged_in().with_search("test1", &[("TEST-1", "Open"), ("TEST-2", "Open")]);
    *tracker.add_build_failures.lock().unwrap() = 1;
    let harness = Harness::new(tracker);
    let options = UpdateIssuesOptions::builder().add_comment(false).build().unwrap();
    let config = config(Some(site()), options);
    let log = BufferedLog::new();
    let mut run = new_run();

    Engine::new(&harness.ctx, &config)
        .update_issues(&mut run, &[ChangeLogEntry::new("test1", "jo", "commit 1")], &expander(), &log)
        .unwrap();

    assert!(log.contains("FAILED: Adding build jenkins-demo-1 to bundle Builds: bundle is archived"));
    assert!(log.contains("Added build jenkins-demo-1 to bundle Builds"));
    assert_eq!(harness.calls_starting_with("add-build").len(), 2);
    assert_eq!(run.status(), BuildStatus::Success);
}

/// Build log that raises an interrupt flag when it sees a given line.
struct InterruptOnLine {
    log: BufferedLog,
    trigger: &'static str,
    flag: Arc<AtomicBool>,
}

impl BuildLog for InterruptOnLine {
    fn log(&self, line: &str) {
        if line == self.trigger {
            self.flag.store(true, Ordering::SeqCst);
        }
        self.log.log(line);
    }
}

#[test]
fn interrupt_mid_dispatch_keeps_recorded_results() {
    let harness = Harness::new(three_issue_tracker());
    let config = config(Some(with_commands_enabled()), commands_only(&["Fixed", "Assignee me"]));
    let flag = Arc::new(AtomicBool::new(false));
    let log = InterruptOnLine {
        log: BufferedLog::new(),
        trigger: "Applying command: Fixed, to issue TEST-2",
        flag: Arc::clone(&flag),
    };
    let mut run = new_run();

    let result = Engine::new(&harness.ctx, &config).with_interrupt(flag).update_issues(
        &mut run,
        &[ChangeLogEntry::new("test1", "jo", "commit 1")],
        &expander(),
        &log,
    );

    assert!(matches!(result, Err(EngineError::Interrupted { completed: 2 })));
    assert_eq!(
        record_pairs(&run),
        [("TEST-1".to_string(), "Fixed".to_string()), ("TEST-1".to_string(), "Assignee me".to_string())]
    );
    assert!(harness.calls_starting_with("apply TEST-2").is_empty());
    assert!(harness.calls_starting_with("apply TEST-3").is_empty());
}

#[test]
fn blank_update_command_does_not_block_create_issue() {
    let harness = Harness::new(ScriptedTracker::logged_in());
    let mut options = UpdateIssuesOptions::default();
    options.commands.push(String::new());
    let config = config(Some(site()), options);
    let mut run = new_run();

    let outcome = Engine::new(&harness.ctx, &config)
        .create_issue(&mut run, &expander(), &BufferedLog::new())
        .unwrap();

    assert!(matches!(outcome, Outcome::IssueFiled { status: CommandStatus::Ok, .. }));
}
