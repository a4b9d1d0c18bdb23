//! Command-line surface of the native client.

use clap::{Parser, Subcommand};
use desktop_runtime::{DesktopController, DesktopView, OutboundCommand, DEFAULT_MIN_SEND_INTERVAL_MS};
use desktop_sync_contract::{
    CreateWindowRequest, Point, Size, Theme, WindowId, WindowPatch,
};
use tracing::info;

use crate::{sync_loop::follow, transport::HttpCommandTransport, SyncClientError};

/// Native client for the synchronized desktop.
#[derive(Debug, Parser)]
#[command(name = "desktop_sync_client", version, about)]
pub struct Cli {
    /// Base URL of the sync server.
    #[arg(long, env = "DESKTOP_SYNC_URL", default_value = "http://127.0.0.1:3001")]
    pub server_url: String,

    /// Log filter directive; `RUST_LOG` wins when set.
    #[arg(long, env = "DESKTOP_SYNC_LOG", default_value = "info")]
    pub log_filter: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Client subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow the push channel and print every accepted snapshot.
    Watch,
    /// Print the current snapshot as JSON.
    State,
    /// Create a window.
    Create {
        /// Content-provider tag, e.g. `text-editor`.
        #[arg(long = "type", default_value = "text-editor")]
        kind: String,
        /// Window title.
        #[arg(long, default_value = "Text Editor")]
        title: String,
    },
    /// Move a window.
    Move {
        /// Window id.
        id: String,
        /// New left edge.
        #[arg(allow_negative_numbers = true)]
        x: i32,
        /// New top edge.
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },
    /// Resize a window; sizes below the minimum are clamped by the server.
    Resize {
        /// Window id.
        id: String,
        /// New width.
        width: i32,
        /// New height.
        height: i32,
    },
    /// Minimize (or with `--restore`, un-minimize) a window.
    Minimize {
        /// Window id.
        id: String,
        /// Clear the minimized flag instead of setting it.
        #[arg(long)]
        restore: bool,
    },
    /// Close a window.
    Close {
        /// Window id.
        id: String,
    },
    /// Raise a window to the top of the stack.
    Focus {
        /// Window id.
        id: String,
    },
    /// Set the desktop theme (`system7` or `windows-xp`).
    Theme {
        /// Theme name.
        theme: Theme,
    },
}

impl Command {
    /// Builds the gateway command for a mutating subcommand; `None` for `watch` and `state`.
    pub fn to_outbound(&self, correlation_id: String) -> Option<OutboundCommand> {
        let update = |id: &str, patch: WindowPatch| OutboundCommand::UpdateWindow {
            correlation_id: correlation_id.clone(),
            window_id: WindowId::new(id),
            patch,
        };
        let command = match self {
            Self::Watch | Self::State => return None,
            Self::Create { kind, title } => OutboundCommand::CreateWindow {
                correlation_id: correlation_id.clone(),
                request: CreateWindowRequest::new(kind.clone(), title.clone()),
            },
            Self::Move { id, x, y } => update(id, WindowPatch::position(Point { x: *x, y: *y })),
            Self::Resize { id, width, height } => update(
                id,
                WindowPatch::size(Size {
                    width: *width,
                    height: *height,
                }),
            ),
            Self::Minimize { id, restore } => update(id, WindowPatch::minimized(!restore)),
            Self::Close { id } => OutboundCommand::CloseWindow {
                correlation_id: correlation_id.clone(),
                window_id: WindowId::new(id.as_str()),
            },
            Self::Focus { id } => OutboundCommand::FocusWindow {
                correlation_id: correlation_id.clone(),
                window_id: WindowId::new(id.as_str()),
            },
            Self::Theme { theme } => OutboundCommand::SetTheme {
                correlation_id: correlation_id.clone(),
                theme: *theme,
            },
        };
        Some(command)
    }
}

/// Runs the parsed command line.
///
/// # Errors
///
/// Returns the first transport or gateway error; `watch` only fails on an invalid URL.
pub async fn run(cli: Cli) -> Result<(), SyncClientError> {
    match &cli.command {
        Command::Watch => {
            let mut controller = DesktopController::new(DEFAULT_MIN_SEND_INTERVAL_MS);
            return follow(&cli.server_url, &mut controller, print_view, shutdown_signal()).await;
        }
        Command::State => {
            let snapshot = HttpCommandTransport::new(&cli.server_url)?.fetch_state().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            return Ok(());
        }
        _ => {}
    }

    let correlation_id = format!("cli-{}", std::process::id());
    let Some(command) = cli.command.to_outbound(correlation_id) else {
        return Ok(());
    };
    let transport = HttpCommandTransport::new(&cli.server_url)?;
    let ack = transport.execute(&command).await?;
    info!(outcome = ?ack.outcome, version = ack.version, "command acknowledged");
    println!("{}", serde_json::to_string_pretty(&ack)?);
    Ok(())
}

fn print_view(view: &DesktopView) {
    if let Some(banner) = view.banner {
        println!("[{}]", banner.message());
        return;
    }
    println!(
        "theme={} windows={} minimized={}",
        view.theme,
        view.windows.len(),
        view.minimized.len()
    );
    for window in &view.windows {
        println!(
            "  z{:<3} {:<12} {:<20} {}x{} at ({}, {})",
            window.z_index,
            window.id,
            window.title,
            window.width,
            window.height,
            window.x,
            window.y
        );
    }
    for window in &view.minimized {
        println!("  (min) {:<12} {}", window.id, window.title);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
