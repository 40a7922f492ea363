use super::*;
use std::time::Duration;

use serde_json::json;
use shared::{
    domain::{HistoryFormat, PlaybookId},
    protocol::{AckReply, ContentReply, RunReply, SystemStatusReply},
};

use crate::{
    error::ControllerError,
    test_support::{
        ack_error, content, content_error, fixture, immediate, run_error, run_output,
        settle_tasks,
    },
    view::{Markup, Region, SidebarStyle},
};

fn page() -> Markup {
    Markup::console(["site.yml", "db.yml"])
}

fn site() -> PlaybookId {
    PlaybookId::new("site.yml")
}

#[tokio::test]
async fn run_shows_placeholder_before_reply_arrives() {
    let fx = fixture(page(), immediate());
    let release = fx.gateway.run.gate();

    let console = fx.console.clone();
    let task = tokio::spawn(async move { console.run(&site()).await });
    settle_tasks().await;

    assert_eq!(
        fx.view.region(&site().region_key()),
        Some(Region {
            visible: true,
            text: RUN_PLACEHOLDER.to_string()
        })
    );

    release.send(Ok(run_output("PLAY RECAP ok=3"))).expect("release");
    let settled = task.await.expect("join").expect("run");
    assert_eq!(settled, Settled::Output("PLAY RECAP ok=3".into()));
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        "PLAY RECAP ok=3"
    );
}

#[tokio::test]
async fn run_commits_error_when_only_error_present() {
    let fx = fixture(page(), immediate());
    fx.gateway.run.reply(run_error("Playbook does not exist"));

    let settled = fx.console.run(&site()).await.expect("run");

    assert_eq!(settled, Settled::Error("Playbook does not exist".into()));
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        "Playbook does not exist"
    );
}

#[tokio::test(start_paused = true)]
async fn run_holds_reply_for_settle_delay() {
    let options = ConsoleOptions {
        run_settle_delay: Duration::from_secs(1),
        ..ConsoleOptions::default()
    };
    let fx = fixture(page(), options);
    fx.gateway.run.reply(run_output("done"));

    let console = fx.console.clone();
    let task = tokio::spawn(async move { console.run(&site()).await });
    settle_tasks().await;

    tokio::time::advance(Duration::from_millis(900)).await;
    settle_tasks().await;
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        RUN_PLACEHOLDER
    );

    tokio::time::advance(Duration::from_millis(200)).await;
    let settled = task.await.expect("join").expect("run");
    assert_eq!(settled, Settled::Output("done".into()));
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        "done"
    );
}

#[tokio::test]
async fn overlapping_runs_leave_last_settled_reply() {
    let fx = fixture(page(), immediate());
    let first = fx.gateway.run.gate();
    let second = fx.gateway.run.gate();

    let console = fx.console.clone();
    let first_task = tokio::spawn(async move { console.run(&site()).await });
    settle_tasks().await;
    let console = fx.console.clone();
    let second_task = tokio::spawn(async move { console.run(&site()).await });
    settle_tasks().await;

    second.send(Ok(run_output("second run"))).expect("release second");
    second_task.await.expect("join").expect("second");
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        "second run"
    );

    first.send(Ok(run_output("first run"))).expect("release first");
    first_task.await.expect("join").expect("first");
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        "first run"
    );
}

#[tokio::test]
async fn runs_for_different_playbooks_touch_only_their_region() {
    let fx = fixture(page(), immediate());
    let db = PlaybookId::new("db.yml");
    fx.gateway.run.reply(run_output("site ok"));

    fx.console.run(&site()).await.expect("run");

    assert_eq!(
        fx.view.region(&db.region_key()),
        Some(Region::default())
    );
}

#[tokio::test]
async fn run_without_region_is_rejected_before_any_request() {
    let fx = fixture(page(), immediate());

    let err = fx
        .console
        .run(&PlaybookId::new("absent.yml"))
        .await
        .expect_err("no region");

    assert!(matches!(err, ControllerError::MissingRegion(_)));
    assert!(fx.gateway.calls().is_empty());
}

#[tokio::test]
async fn silent_transport_failure_keeps_placeholder() {
    let fx = fixture(page(), immediate());
    fx.gateway.run.fail("connection refused");

    let settled = fx.console.run(&site()).await.expect("run");

    assert!(settled.is_pending());
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        RUN_PLACEHOLDER
    );
}

#[tokio::test]
async fn surfaced_transport_failure_replaces_placeholder() {
    let options = ConsoleOptions {
        transport_policy: TransportPolicy::Surface,
        ..immediate()
    };
    let fx = fixture(page(), options);
    fx.gateway.show.fail("connection refused");

    let settled = fx.console.show(&site()).await.expect("show");

    let text = settled.text().expect("surfaced text");
    assert!(text.starts_with("Request failed: "));
    assert!(text.contains("connection refused"));
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        text
    );
}

#[tokio::test]
async fn empty_run_reply_follows_fallback_policy() {
    let fx = fixture(page(), immediate());
    fx.gateway.run.reply(RunReply::default());
    assert!(fx.console.run(&site()).await.expect("run").is_pending());

    let options = ConsoleOptions {
        fallback_policy: FallbackPolicy::Surface,
        ..immediate()
    };
    let fx = fixture(page(), options);
    fx.gateway.run.reply(RunReply::default());
    assert_eq!(
        fx.console.run(&site()).await.expect("run"),
        Settled::Error(FETCH_FALLBACK.into())
    );
}

#[tokio::test]
async fn preview_commits_content_error_or_fallback() {
    let fx = fixture(page(), immediate());
    fx.gateway.show.reply(content("- hosts: all\n"));
    fx.gateway.show.reply(content_error("Error reading playbook"));
    fx.gateway.show.reply(ContentReply::default());

    let region = site().region_key();
    fx.console.show(&site()).await.expect("content");
    assert_eq!(fx.view.region(&region).expect("region").text, "- hosts: all\n");

    fx.console.show(&site()).await.expect("error");
    assert_eq!(
        fx.view.region(&region).expect("region").text,
        "Error reading playbook"
    );

    fx.console.show(&site()).await.expect("fallback");
    assert_eq!(fx.view.region(&region).expect("region").text, FETCH_FALLBACK);
}

#[tokio::test]
async fn preview_shows_loading_while_pending() {
    let fx = fixture(page(), immediate());
    let release = fx.gateway.show.gate();

    let console = fx.console.clone();
    let task = tokio::spawn(async move { console.show(&site()).await });
    settle_tasks().await;
    assert_eq!(
        fx.view.region(&site().region_key()).expect("region").text,
        PREVIEW_PLACEHOLDER
    );

    release.send(Ok(content("---"))).expect("release");
    task.await.expect("join").expect("show");
}

#[tokio::test]
async fn show_then_edit_unlocks_buffer_and_save_keeps_mode() {
    let fx = fixture(page(), immediate());
    fx.gateway.hosts.reply(content("[web]\nweb01\n"));
    fx.gateway.hosts.reply(content("[web]\nweb01\n"));
    fx.gateway.save.reply(AckReply::ok());

    let state = fx.console.show_hosts().await.expect("show hosts");
    assert_eq!(state, HostsState::Visible(HostsMode::ReadOnly));
    let panel = fx.view.hosts().expect("panel");
    assert!(panel.box_visible && panel.readonly && !panel.save_visible);
    assert!(fx.view.type_hosts("tampered").is_err());

    let state = fx.console.edit_hosts().await.expect("edit hosts");
    assert_eq!(state, HostsState::Visible(HostsMode::Editable));
    let panel = fx.view.hosts().expect("panel");
    assert!(panel.box_visible && !panel.readonly && panel.save_visible);

    fx.view
        .type_hosts("[web]\nweb01\nweb02\n")
        .expect("editable buffer");
    let settled = fx.console.save_hosts().await.expect("save");

    assert_eq!(settled, Settled::Output(HOSTS_SAVED.into()));
    assert_eq!(fx.view.notifications(), vec![HOSTS_SAVED.to_string()]);
    assert_eq!(
        fx.console.hosts_state(),
        HostsState::Visible(HostsMode::Editable)
    );
    assert!(fx
        .gateway
        .calls()
        .contains(&"save_hosts:[web]\nweb01\nweb02\n".to_string()));
}

#[tokio::test]
async fn hosts_fetch_failure_hides_box_and_reports_error() {
    let fx = fixture(page(), immediate());
    fx.gateway.hosts.reply(content("[web]\nweb01\n"));
    fx.gateway
        .hosts
        .reply(content_error("Add read permission to user to file"));

    fx.console.edit_hosts().await.expect("edit");
    let state = fx.console.show_hosts().await.expect("show");

    assert_eq!(state, HostsState::Hidden);
    let panel = fx.view.hosts().expect("panel");
    assert!(!panel.box_visible);
    assert_eq!(panel.error, "Add read permission to user to file");
}

#[tokio::test]
async fn successful_fetch_clears_previous_error() {
    let fx = fixture(page(), immediate());
    fx.gateway.hosts.reply(content_error("Hosts file not found"));
    fx.gateway.hosts.reply(content(""));

    fx.console.show_hosts().await.expect("failed show");
    let state = fx.console.show_hosts().await.expect("empty inventory");

    assert_eq!(state, HostsState::Visible(HostsMode::ReadOnly));
    let panel = fx.view.hosts().expect("panel");
    assert!(panel.box_visible);
    assert!(panel.error.is_empty());
    assert!(panel.content.is_empty());
}

#[tokio::test]
async fn save_outside_editable_mode_is_rejected() {
    let fx = fixture(page(), immediate());
    fx.gateway.hosts.reply(content("[web]\n"));
    fx.console.show_hosts().await.expect("show");

    let err = fx.console.save_hosts().await.expect_err("read-only");

    assert!(matches!(err, ControllerError::NotEditable));
    assert_eq!(fx.gateway.calls(), vec!["get_hosts".to_string()]);
}

#[tokio::test]
async fn save_failure_notifies_backend_error() {
    let fx = fixture(page(), immediate());
    fx.gateway.hosts.reply(content("[web]\n"));
    fx.gateway
        .save
        .reply(ack_error("Please add write permission to host file"));

    fx.console.edit_hosts().await.expect("edit");
    let settled = fx.console.save_hosts().await.expect("save");

    assert_eq!(
        settled,
        Settled::Error("Please add write permission to host file".into())
    );
    assert_eq!(
        fx.view.notifications(),
        vec!["Please add write permission to host file".to_string()]
    );
    assert_eq!(
        fx.console.hosts_state(),
        HostsState::Visible(HostsMode::Editable)
    );
}

#[tokio::test]
async fn status_renders_percentages() {
    let fx = fixture(page(), immediate());
    fx.gateway.status.reply(SystemStatusReply {
        cpu: Some(json!(42)),
        memory: Some(json!(77.0)),
        error: None,
    });

    let settled = fx.console.check_status().await.expect("status");

    assert_eq!(settled, Settled::Output("CPU: 42% | Memory: 77%".into()));
    assert_eq!(
        fx.view.status(),
        Some(Region {
            visible: true,
            text: "CPU: 42% | Memory: 77%".into()
        })
    );
}

#[test]
fn status_format_keeps_fractions_and_marks_missing_fields() {
    let reply = SystemStatusReply {
        cpu: Some(json!(12.5)),
        memory: None,
        error: None,
    };
    assert_eq!(format_status(&reply), "CPU: 12.5% | Memory: undefined%");
}

#[tokio::test]
async fn non_numeric_percentages_render_as_sent() {
    let fx = fixture(page(), immediate());
    let reply: SystemStatusReply =
        serde_json::from_value(json!({ "cpu": "42", "memory": 77 })).expect("decode");
    fx.gateway.status.reply(reply);

    let settled = fx.console.check_status().await.expect("status");

    assert_eq!(settled, Settled::Output("CPU: 42% | Memory: 77%".into()));
}

#[tokio::test]
async fn incomplete_status_follows_fallback_policy() {
    let options = ConsoleOptions {
        fallback_policy: FallbackPolicy::Surface,
        ..immediate()
    };
    let fx = fixture(page(), options);
    fx.gateway.status.reply(SystemStatusReply {
        cpu: None,
        memory: None,
        error: Some("Error fetching system status".into()),
    });

    let settled = fx.console.check_status().await.expect("status");

    assert_eq!(settled, Settled::Error("Error fetching system status".into()));
    assert_eq!(
        fx.view.status().expect("status box").text,
        "Error fetching system status"
    );
}

#[tokio::test]
async fn clear_history_confirmed_reloads_page() {
    let fx = fixture(page(), immediate());
    fx.gateway.hosts.reply(content("[web]\n"));
    fx.gateway.clear.reply(AckReply::ok());
    fx.console.edit_hosts().await.expect("edit");

    let settled = fx.console.clear_history().await.expect("clear");

    assert_eq!(settled, Settled::Output(HISTORY_CLEARED.into()));
    assert_eq!(fx.view.notifications(), vec![HISTORY_CLEARED.to_string()]);
    assert_eq!(fx.view.reloads(), 1);
    assert_eq!(fx.console.hosts_state(), HostsState::Hidden);
}

#[tokio::test]
async fn run_in_flight_across_reload_does_not_write_into_new_page() {
    let fx = fixture(page(), immediate());
    let release = fx.gateway.run.gate();
    fx.gateway.clear.reply(AckReply::ok());

    let console = fx.console.clone();
    let task = tokio::spawn(async move { console.run(&site()).await });
    settle_tasks().await;

    fx.console.clear_history().await.expect("clear");
    assert_eq!(fx.view.region(&site().region_key()), Some(Region::default()));

    release
        .send(Ok(run_output("stale output")))
        .expect("release");
    let settled = task.await.expect("join").expect("run");

    assert!(settled.is_pending());
    assert_eq!(fx.view.region(&site().region_key()), Some(Region::default()));
}

#[tokio::test]
async fn hosts_and_status_replies_outliving_their_page_are_dropped() {
    let fx = fixture(page(), immediate());
    let hosts = fx.gateway.hosts.gate();
    let status = fx.gateway.status.gate();
    let save = fx.gateway.save.gate();
    fx.gateway.hosts.reply(content("[web]\n"));
    fx.gateway.theme.reply(json!({}));

    let console = fx.console.clone();
    let edit = tokio::spawn(async move { console.edit_hosts().await });
    let console = fx.console.clone();
    let check = tokio::spawn(async move { console.check_status().await });
    settle_tasks().await;

    fx.console.toggle_theme().await.expect("theme");
    hosts.send(Ok(content("[db]\n"))).expect("release hosts");
    status
        .send(Ok(SystemStatusReply {
            cpu: Some(json!(1)),
            memory: Some(json!(2)),
            error: None,
        }))
        .expect("release status");

    assert_eq!(edit.await.expect("join").expect("edit"), HostsState::Hidden);
    assert!(check.await.expect("join").expect("status").is_pending());
    assert!(!fx.view.hosts().expect("panel").box_visible);
    assert_eq!(fx.view.status(), Some(Region::default()));

    fx.console.edit_hosts().await.expect("edit after reload");
    let console = fx.console.clone();
    let saving = tokio::spawn(async move { console.save_hosts().await });
    settle_tasks().await;
    fx.gateway.theme.reply(json!({}));
    fx.console.toggle_theme().await.expect("second theme");
    save.send(Ok(AckReply::ok())).expect("release save");

    assert!(saving.await.expect("join").expect("save").is_pending());
    assert!(fx.view.notifications().is_empty());
}

#[tokio::test]
async fn clear_history_unconfirmed_does_nothing_visible() {
    let fx = fixture(page(), immediate());
    fx.gateway.clear.reply(ack_error("x"));

    let settled = fx.console.clear_history().await.expect("clear");

    assert!(settled.is_pending());
    assert!(fx.view.notifications().is_empty());
    assert_eq!(fx.view.reloads(), 0);
}

#[tokio::test]
async fn toggle_theme_reloads_for_any_payload() {
    let fx = fixture(page(), immediate());
    fx.gateway.theme.reply(json!({}));
    fx.gateway.theme.reply(json!({ "dark_mode": true }));
    fx.gateway.theme.reply(json!({ "error": "Error toggling dark mode" }));

    for _ in 0..3 {
        fx.console.toggle_theme().await.expect("toggle");
    }

    assert_eq!(fx.view.reloads(), 3);
    assert!(fx.view.notifications().is_empty());
}

#[tokio::test]
async fn toggle_theme_transport_failure_does_not_reload() {
    let fx = fixture(page(), immediate());
    fx.gateway.theme.fail("connection reset");

    let settled = fx.console.toggle_theme().await.expect("toggle");

    assert!(settled.is_pending());
    assert_eq!(fx.view.reloads(), 0);
}

#[test]
fn display_sidebar_first_toggle_sets_it_shown() {
    let fx = fixture(page(), immediate());

    assert_eq!(
        fx.console.toggle_sidebar(),
        Settled::Output("display: block".into())
    );
    assert_eq!(fx.view.sidebar(), Some(SidebarStyle::Shown));
    assert_eq!(
        fx.console.toggle_sidebar(),
        Settled::Output("display: none".into())
    );
    assert_eq!(fx.console.state().sidebar, Some(SidebarStyle::Hidden));
    fx.console.toggle_sidebar();
    assert_eq!(fx.view.sidebar(), Some(SidebarStyle::Shown));
}

#[test]
fn slide_sidebar_starts_visible() {
    let fx = fixture(
        page(),
        ConsoleOptions {
            sidebar: SidebarKind::Slide,
            ..immediate()
        },
    );

    fx.console.toggle_sidebar();
    assert_eq!(fx.view.sidebar(), Some(SidebarStyle::SlidOut));
    fx.console.toggle_sidebar();
    assert_eq!(fx.view.sidebar(), Some(SidebarStyle::SlidIn));
}

#[tokio::test]
async fn playbooks_dir_update_notifies_backend_message() {
    let fx = fixture(page(), immediate());
    fx.gateway.playbooks_dir.reply(AckReply {
        status: Some("ok".into()),
        message: Some("Playbooks directory updated successfully".into()),
        error: None,
    });
    fx.gateway
        .playbooks_dir
        .reply(ack_error("Directory path cannot be empty"));

    fx.console
        .update_playbooks_dir("/srv/playbooks")
        .await
        .expect("update");
    fx.console.update_playbooks_dir("").await.expect("empty");

    assert_eq!(
        fx.view.notifications(),
        vec![
            "Playbooks directory updated successfully".to_string(),
            "Directory path cannot be empty".to_string(),
        ]
    );
}

#[tokio::test]
async fn export_history_passes_body_and_errors_through() {
    let fx = fixture(page(), immediate());
    fx.gateway.export.reply("time,playbook,action,output\n".into());
    fx.gateway.export.fail("connection refused");

    let body = fx
        .console
        .export_history(HistoryFormat::Csv)
        .await
        .expect("export");
    assert!(body.starts_with("time,playbook"));

    let err = fx
        .console
        .export_history(HistoryFormat::Json)
        .await
        .expect_err("transport failure");
    assert!(matches!(err, ControllerError::Gateway(_)));
    assert_eq!(
        fx.gateway.calls(),
        vec![
            "export_history:csv".to_string(),
            "export_history:json".to_string()
        ]
    );
}

#[tokio::test]
async fn import_history_notifies_outcome() {
    let fx = fixture(page(), immediate());
    fx.gateway.import.reply(AckReply {
        status: Some("ok".into()),
        message: Some("History imported successfully.".into()),
        error: None,
    });
    fx.gateway
        .import
        .reply(ack_error("Unsupported file type. Only .json and .csv allowed."));
    fx.gateway.import.reply(AckReply::ok());

    let imported = fx
        .console
        .import_history("history.json", b"[]".to_vec())
        .await
        .expect("import");
    let rejected = fx
        .console
        .import_history("history.txt", b"x".to_vec())
        .await
        .expect("reject");
    let bare = fx
        .console
        .import_history("history.csv", Vec::new())
        .await
        .expect("bare ack");

    assert_eq!(
        imported,
        Settled::Output("History imported successfully.".into())
    );
    assert_eq!(
        rejected,
        Settled::Error("Unsupported file type. Only .json and .csv allowed.".into())
    );
    assert_eq!(bare, Settled::Output(HISTORY_IMPORTED.into()));
    assert_eq!(
        fx.gateway.calls(),
        vec![
            "import_history:history.json:2".to_string(),
            "import_history:history.txt:1".to_string(),
            "import_history:history.csv:0".to_string(),
        ]
    );
    assert_eq!(fx.view.notifications().len(), 3);
}
