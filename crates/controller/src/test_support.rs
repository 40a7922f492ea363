//! Scripted gateway and page fixtures shared by the controller tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use client_core::Gateway;
use shared::{
    domain::{HistoryFormat, PlaybookId},
    error::GatewayError,
    protocol::{AckReply, ContentReply, Endpoint, RunReply, SystemStatusReply, ThemeReply},
};
use tokio::sync::oneshot;

use crate::{
    controller::{Console, ConsoleOptions},
    view::{Markup, PageView},
};

enum Step<T> {
    Ready(Result<T, GatewayError>),
    Gated(oneshot::Receiver<Result<T, GatewayError>>),
}

/// Queue of replies for one backend operation, consumed in call order.
pub(crate) struct Script<T> {
    endpoint: Endpoint,
    steps: Mutex<VecDeque<Step<T>>>,
}

impl<T> Script<T> {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            steps: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn reply(&self, value: T) {
        self.push(Step::Ready(Ok(value)));
    }

    pub(crate) fn fail(&self, message: &str) {
        self.push(Step::Ready(Err(GatewayError::transport(
            self.endpoint,
            message,
        ))));
    }

    /// Queue a reply released later through the returned sender.
    pub(crate) fn gate(&self) -> oneshot::Sender<Result<T, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.push(Step::Gated(rx));
        tx
    }

    fn push(&self, step: Step<T>) {
        self.steps.lock().expect("script lock").push_back(step);
    }

    async fn next(&self) -> Result<T, GatewayError> {
        let step = self.steps.lock().expect("script lock").pop_front();
        match step {
            Some(Step::Ready(result)) => result,
            Some(Step::Gated(rx)) => rx.await.unwrap_or_else(|_| {
                Err(GatewayError::transport(self.endpoint, "gate dropped"))
            }),
            None => Err(GatewayError::transport(
                self.endpoint,
                "no scripted reply",
            )),
        }
    }
}

pub(crate) struct ScriptedGateway {
    pub run: Script<RunReply>,
    pub show: Script<ContentReply>,
    pub hosts: Script<ContentReply>,
    pub save: Script<AckReply>,
    pub status: Script<SystemStatusReply>,
    pub clear: Script<AckReply>,
    pub theme: Script<ThemeReply>,
    pub playbooks_dir: Script<AckReply>,
    pub export: Script<String>,
    pub import: Script<AckReply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            run: Script::new(Endpoint::RunPlaybook),
            show: Script::new(Endpoint::ShowPlaybook),
            hosts: Script::new(Endpoint::GetHosts),
            save: Script::new(Endpoint::SaveHosts),
            status: Script::new(Endpoint::SystemStatus),
            clear: Script::new(Endpoint::ClearHistory),
            theme: Script::new(Endpoint::ToggleTheme),
            playbooks_dir: Script::new(Endpoint::UpdatePlaybooksDir),
            export: Script::new(Endpoint::ExportHistory),
            import: Script::new(Endpoint::ImportHistory),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn run_playbook(&self, playbook: &PlaybookId) -> Result<RunReply, GatewayError> {
        self.record(format!("run_playbook:{playbook}"));
        self.run.next().await
    }

    async fn show_playbook(&self, playbook: &PlaybookId) -> Result<ContentReply, GatewayError> {
        self.record(format!("show_playbook:{playbook}"));
        self.show.next().await
    }

    async fn get_hosts(&self) -> Result<ContentReply, GatewayError> {
        self.record("get_hosts".to_string());
        self.hosts.next().await
    }

    async fn save_hosts(&self, content: &str) -> Result<AckReply, GatewayError> {
        self.record(format!("save_hosts:{content}"));
        self.save.next().await
    }

    async fn system_status(&self) -> Result<SystemStatusReply, GatewayError> {
        self.record("system_status".to_string());
        self.status.next().await
    }

    async fn clear_history(&self) -> Result<AckReply, GatewayError> {
        self.record("clear_history".to_string());
        self.clear.next().await
    }

    async fn toggle_theme(&self) -> Result<ThemeReply, GatewayError> {
        self.record("toggle_theme".to_string());
        self.theme.next().await
    }

    async fn update_playbooks_dir(&self, playbooks_dir: &str) -> Result<AckReply, GatewayError> {
        self.record(format!("update_playbooks_dir:{playbooks_dir}"));
        self.playbooks_dir.next().await
    }

    async fn export_history(&self, format: HistoryFormat) -> Result<String, GatewayError> {
        self.record(format!("export_history:{}", format.as_query()));
        self.export.next().await
    }

    async fn import_history(
        &self,
        filename: &str,
        contents: Vec<u8>,
    ) -> Result<AckReply, GatewayError> {
        self.record(format!("import_history:{filename}:{}", contents.len()));
        self.import.next().await
    }
}

pub(crate) fn run_output(output: &str) -> RunReply {
    RunReply {
        output: Some(output.to_string()),
        error: None,
    }
}

pub(crate) fn run_error(error: &str) -> RunReply {
    RunReply {
        output: None,
        error: Some(error.to_string()),
    }
}

pub(crate) fn content(content: &str) -> ContentReply {
    ContentReply {
        content: Some(content.to_string()),
        error: None,
    }
}

pub(crate) fn content_error(error: &str) -> ContentReply {
    ContentReply {
        content: None,
        error: Some(error.to_string()),
    }
}

pub(crate) fn ack_error(error: &str) -> AckReply {
    AckReply {
        status: Some("error".to_string()),
        message: None,
        error: Some(error.to_string()),
    }
}

pub(crate) fn immediate() -> ConsoleOptions {
    ConsoleOptions {
        run_settle_delay: Duration::ZERO,
        ..ConsoleOptions::default()
    }
}

pub(crate) struct Fixture {
    pub gateway: Arc<ScriptedGateway>,
    pub view: Arc<PageView>,
    pub console: Arc<Console>,
}

pub(crate) fn fixture(markup: Markup, options: ConsoleOptions) -> Fixture {
    let gateway = ScriptedGateway::new();
    let view = Arc::new(PageView::new(markup));
    let console = Arc::new(Console::with_options(
        gateway.clone(),
        view.clone(),
        options,
    ));
    Fixture {
        gateway,
        view,
        console,
    }
}

/// Let spawned tasks run up to their next suspension point.
pub(crate) async fn settle_tasks() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
