use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use easy_compile::config::options_from_payload;
use easy_compile::{CompileOptions, EasyCompile, Host};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tower_lsp::lsp_types::{MessageType, Url};
use tower_lsp::Client;

use crate::diagnostics::to_lsp;

/// The editor side of the commands: focus tracking plus message popups
pub struct LspHost {
    client: Client,
    active: RwLock<Option<PathBuf>>,
}

impl LspHost {
    pub fn new(client: Client) -> Self {
        Self { client, active: RwLock::new(None) }
    }

    pub fn focus(&self, path: Option<PathBuf>) {
        match self.active.write() {
            Ok(mut active) => *active = path,
            Err(poisoned) => *poisoned.into_inner() = path,
        }
    }

    fn show(&self, kind: MessageType, message: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(text = message, "no runtime to show message");
            return;
        };
        let client = self.client.clone();
        let message = message.to_string();
        handle.spawn(async move { client.show_message(kind, message).await });
    }
}

impl Host for LspHost {
    fn active_document(&self) -> Option<PathBuf> {
        match self.active.read() {
            Ok(active) => active.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn show_information(&self, message: &str) {
        self.show(MessageType::INFO, message);
    }

    fn show_warning(&self, message: &str) {
        self.show(MessageType::WARNING, message);
    }
}

#[derive(Debug, Deserialize)]
pub struct ActiveEditorParams {
    pub uri: Option<Url>,
}

pub struct Backend {
    pub client: Client,
    pub easy: Arc<EasyCompile<Arc<LspHost>>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let host = Arc::new(LspHost::new(client.clone()));
        let easy = Arc::new(easy_compile::activate(host, CompileOptions::default()));
        Self { client, easy }
    }

    pub fn focus(&self, uri: &Url) {
        if let Some(path) = file_path(uri) {
            self.easy.host().focus(Some(path));
        }
    }

    /// `easyCompile/didChangeActiveEditor`
    pub async fn did_change_active_editor(&self, params: ActiveEditorParams) {
        let path = params.uri.as_ref().and_then(file_path);
        tracing::debug!(path = ?path, "active editor changed");
        self.easy.host().focus(path);
    }

    /// Replace the user options from an editor settings payload
    pub fn apply_settings(&self, settings: &Value) {
        match options_from_payload(settings) {
            Some(options) => {
                tracing::info!(?options, "user settings updated");
                self.easy.resolver().set_user_options(options);
            }
            None => tracing::debug!("no easy-compile settings in payload"),
        }
    }

    /// Forward every change in the diagnostics sink to the client
    pub fn spawn_publisher(&self) {
        let sink = self.easy.dispatcher().sink().clone();
        let client = self.client.clone();
        let mut changes = sink.subscribe();

        tokio::spawn(async move {
            loop {
                let paths = match changes.recv().await {
                    Ok(path) => vec![path],
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "diagnostic publisher lagged; republishing all");
                        sink.paths()
                    }
                    Err(RecvError::Closed) => break,
                };

                for path in paths {
                    let Ok(uri) = Url::from_file_path(&path) else {
                        tracing::warn!(path = %path.display(), "cannot express path as a uri");
                        continue;
                    };
                    let diagnostics = sink.get(&path).unwrap_or_default().iter().map(to_lsp).collect();
                    client.publish_diagnostics(uri, diagnostics, None).await;
                }
            }
        });
    }
}

pub fn file_path(uri: &Url) -> Option<PathBuf> {
    match uri.to_file_path() {
        Ok(path) => Some(path),
        Err(()) => {
            tracing::debug!(%uri, "not a file uri");
            None
        }
    }
}

/// The optional first command argument naming the target file
pub fn command_target(arguments: &[Value]) -> Option<PathBuf> {
    let uri = arguments.first()?.as_str()?;
    Url::parse(uri).ok().as_ref().and_then(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_target_from_uri_argument() {
        let target = command_target(&[json!("file:///p/site.scss")]);
        assert_eq!(target, Some(PathBuf::from("/p/site.scss")));
    }

    #[test]
    fn test_command_target_missing_or_invalid() {
        assert_eq!(command_target(&[]), None);
        assert_eq!(command_target(&[json!(42)]), None);
        assert_eq!(command_target(&[json!("not a uri")]), None);
        assert_eq!(command_target(&[json!("https://example.com/a.less")]), None);
    }

    #[tokio::test]
    async fn test_unrelated_settings_keep_user_options() {
        let (service, _socket) = tower_lsp::LspService::new(Backend::new);
        let backend = service.inner();

        backend.apply_settings(&json!({ "easycompile.compile": { "less": false } }));
        assert_eq!(backend.easy.resolver().user_options().less, Some(false));

        backend.apply_settings(&json!({ "editor": { "tabSize": 2 } }));
        assert_eq!(backend.easy.resolver().user_options().less, Some(false));

        backend.apply_settings(&json!({ "sass": false }));
        assert_eq!(backend.easy.resolver().user_options().sass, Some(false));
        assert_eq!(backend.easy.resolver().user_options().less, None);
    }

    #[test]
    fn test_active_editor_params() {
        let params: ActiveEditorParams = serde_json::from_value(json!({ "uri": "file:///p/a.ts" })).unwrap();
        assert_eq!(params.uri.as_ref().and_then(file_path), Some(PathBuf::from("/p/a.ts")));

        let params: ActiveEditorParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.uri.is_none());
    }
}
