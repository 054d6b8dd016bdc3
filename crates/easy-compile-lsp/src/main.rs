mod backend;
mod diagnostics;

use easy_compile::types::{COMPILE_COMMAND, MINIFYDIR_COMMAND, MINIFY_COMMAND};
use serde_json::Value;
use tower_lsp::{jsonrpc::Result, lsp_types::*, LanguageServer, LspService, Server};
use tracing_subscriber::EnvFilter;

use crate::backend::{command_target, file_path, Backend};

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(settings) = &params.initialization_options {
            self.apply_settings(settings);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        COMPILE_COMMAND.to_string(),
                        MINIFY_COMMAND.to_string(),
                        MINIFYDIR_COMMAND.to_string(),
                    ],
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.spawn_publisher();
        self.client.log_message(MessageType::INFO, "easy-compile initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.easy.deactivate();
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.focus(&params.text_document.uri);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.focus(&params.text_document.uri);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(path) = file_path(&params.text_document.uri) {
            self.easy.did_save(&path);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        if let Some(path) = file_path(&params.text_document.uri) {
            self.easy.did_close(&path);
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_settings(&params.settings);
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let target = command_target(&params.arguments);
        match params.command.as_str() {
            COMPILE_COMMAND => self.easy.compile_command(target.as_deref()),
            MINIFY_COMMAND => self.easy.minify_command(target.as_deref()),
            MINIFYDIR_COMMAND => self.easy.minify_dir_command(),
            other => tracing::warn!(command = other, "unknown command"),
        }
        Ok(None)
    }
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method("easyCompile/didChangeActiveEditor", Backend::did_change_active_editor)
        .finish();

    Server::new(stdin, stdout, socket).serve(service).await;
}
