use super::*;

fn unsupported() -> String {
    "browser networking APIs are only available when compiled for wasm32".to_string()
}

/// Placeholder socket; never constructed off wasm32.
pub struct SyncSocket;

impl SyncSocket {
    pub fn send_text(&self, _text: &str) -> Result<(), String> {
        Err(unsupported())
    }
}

pub fn query_param(_name: &str) -> Option<String> {
    None
}

pub fn open_sync_socket(_url: &str, _handlers: SyncSocketHandlers) -> Result<SyncSocket, String> {
    Err(unsupported())
}

pub async fn send_command(_base: &str, _request: &CommandRequest) -> Result<CommandAck, String> {
    Err(unsupported())
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
