use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PlaybookId;

/// Backend operations consumed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    RunPlaybook,
    ShowPlaybook,
    GetHosts,
    SaveHosts,
    SystemStatus,
    ClearHistory,
    ToggleTheme,
    UpdatePlaybooksDir,
    ExportHistory,
    ImportHistory,
}

impl Endpoint {
    pub const ALL: [Endpoint; 10] = [
        Endpoint::RunPlaybook,
        Endpoint::ShowPlaybook,
        Endpoint::GetHosts,
        Endpoint::SaveHosts,
        Endpoint::SystemStatus,
        Endpoint::ClearHistory,
        Endpoint::ToggleTheme,
        Endpoint::UpdatePlaybooksDir,
        Endpoint::ExportHistory,
        Endpoint::ImportHistory,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RunPlaybook => "run_playbook",
            Self::ShowPlaybook => "show_playbook",
            Self::GetHosts => "get_hosts",
            Self::SaveHosts => "save_hosts",
            Self::SystemStatus => "system_status",
            Self::ClearHistory => "clear_history",
            Self::ToggleTheme => "toggle_theme",
            Self::UpdatePlaybooksDir => "update_playbooks_dir",
            Self::ExportHistory => "export_history",
            Self::ImportHistory => "import_history",
        }
    }

    pub fn is_post(self) -> bool {
        !matches!(
            self,
            Self::GetHosts | Self::SystemStatus | Self::ExportHistory
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Path of every backend operation, relative to the server url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub run_playbook: String,
    pub show_playbook: String,
    pub get_hosts: String,
    pub save_hosts: String,
    pub system_status: String,
    pub clear_history: String,
    pub toggle_theme: String,
    pub update_playbooks_dir: String,
    pub export_history: String,
    pub import_history: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            run_playbook: "/run_playbook".into(),
            show_playbook: "/show_playbook".into(),
            get_hosts: "/get_hosts".into(),
            save_hosts: "/save_hosts".into(),
            system_status: "/system_status".into(),
            clear_history: "/clear_history".into(),
            toggle_theme: "/toggle_dark_mode".into(),
            update_playbooks_dir: "/settings/update_playbooks_dir".into(),
            export_history: "/history/export_history".into(),
            import_history: "/history/import_history".into(),
        }
    }
}

impl Routes {
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::RunPlaybook => &self.run_playbook,
            Endpoint::ShowPlaybook => &self.show_playbook,
            Endpoint::GetHosts => &self.get_hosts,
            Endpoint::SaveHosts => &self.save_hosts,
            Endpoint::SystemStatus => &self.system_status,
            Endpoint::ClearHistory => &self.clear_history,
            Endpoint::ToggleTheme => &self.toggle_theme,
            Endpoint::UpdatePlaybooksDir => &self.update_playbooks_dir,
            Endpoint::ExportHistory => &self.export_history,
            Endpoint::ImportHistory => &self.import_history,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookForm {
    pub playbook: String,
}

impl From<&PlaybookId> for PlaybookForm {
    fn from(value: &PlaybookId) -> Self {
        Self {
            playbook: value.0.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostsForm {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybooksDirForm {
    pub playbooks_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Reply of the run-playbook operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReply {
    pub fn output(&self) -> Option<&str> {
        present(&self.output)
    }

    pub fn error(&self) -> Option<&str> {
        present(&self.error)
    }
}

/// Reply carrying a text body: playbook preview and hosts fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContentReply {
    pub fn content(&self) -> Option<&str> {
        present(&self.content)
    }

    pub fn error(&self) -> Option<&str> {
        present(&self.error)
    }
}

/// Acknowledgement reply: save hosts, clear or import history, update playbooks dir.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AckReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckReply {
    pub fn ok() -> Self {
        Self {
            status: Some("ok".into()),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }

    pub fn message(&self) -> Option<&str> {
        present(&self.message)
    }

    pub fn error(&self) -> Option<&str> {
        present(&self.error)
    }
}

/// Usage snapshot. Percentages are kept as sent, numeric or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatusReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SystemStatusReply {
    pub fn is_complete(&self) -> bool {
        self.cpu.is_some() && self.memory.is_some()
    }
}

/// The theme toggle reply is never inspected; any JSON value is accepted.
pub type ThemeReply = serde_json::Value;
