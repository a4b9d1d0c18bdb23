use desktop_sync_contract::CORRELATION_ID_HEADER;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::*;

fn js_error(context: &str, err: JsValue) -> String {
    format!("{context}: {err:?}")
}

fn browser_window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable".to_string())
}

/// Open browser WebSocket plus the callbacks bound to it.
pub struct SyncSocket {
    socket: web_sys::WebSocket,
    _on_open: Closure<dyn FnMut(web_sys::Event)>,
    _on_message: Closure<dyn FnMut(web_sys::MessageEvent)>,
    _on_close: Closure<dyn FnMut(web_sys::CloseEvent)>,
}

impl SyncSocket {
    pub fn send_text(&self, text: &str) -> Result<(), String> {
        self.socket
            .send_with_str(text)
            .map_err(|err| js_error("websocket send failed", err))
    }
}

impl Drop for SyncSocket {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        let _ = self.socket.close();
    }
}

pub fn query_param(name: &str) -> Option<String> {
    let search = browser_window().ok()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search)
        .ok()?
        .get(name)
}

pub fn open_sync_socket(url: &str, handlers: SyncSocketHandlers) -> Result<SyncSocket, String> {
    let socket =
        web_sys::WebSocket::new(url).map_err(|err| js_error("websocket open failed", err))?;
    let SyncSocketHandlers {
        on_open,
        on_text,
        on_close,
    } = handlers;

    let on_open = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_| on_open()));
    let on_message =
        Closure::<dyn FnMut(web_sys::MessageEvent)>::wrap(Box::new(move |ev: web_sys::MessageEvent| {
            if let Some(text) = ev.data().as_string() {
                on_text(text);
            }
        }));
    let on_close = Closure::<dyn FnMut(web_sys::CloseEvent)>::wrap(Box::new(move |_| on_close()));

    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    Ok(SyncSocket {
        socket,
        _on_open: on_open,
        _on_message: on_message,
        _on_close: on_close,
    })
}

pub async fn send_command(base: &str, request: &CommandRequest) -> Result<CommandAck, String> {
    let headers = web_sys::Headers::new().map_err(|err| js_error("headers", err))?;
    headers
        .set(CORRELATION_ID_HEADER, &request.correlation_id)
        .map_err(|err| js_error("headers", err))?;

    let init = web_sys::RequestInit::new();
    init.set_method(request.method.as_str());
    if let Some(body) = request.body.as_ref() {
        headers
            .set("content-type", "application/json")
            .map_err(|err| js_error("headers", err))?;
        let raw = serde_json::to_string(body).map_err(|err| err.to_string())?;
        init.set_body(&JsValue::from_str(&raw));
    }
    init.set_headers(&headers);

    let url = join_url(base, &request.path);
    let fetch_request = web_sys::Request::new_with_str_and_init(&url, &init)
        .map_err(|err| js_error("request build failed", err))?;
    let response = JsFuture::from(browser_window()?.fetch_with_request(&fetch_request))
        .await
        .map_err(|err| js_error("fetch failed", err))?
        .dyn_into::<web_sys::Response>()
        .map_err(|err| js_error("fetch returned a non-response", err))?;

    let text = JsFuture::from(
        response
            .text()
            .map_err(|err| js_error("response body unavailable", err))?,
    )
    .await
    .map_err(|err| js_error("response body read failed", err))?
    .as_string()
    .unwrap_or_default();

    if !response.ok() {
        return Err(format!("{} {} -> {}: {text}", request.method.as_str(), url, response.status()));
    }
    serde_json::from_str(&text).map_err(|err| format!("malformed ack: {err}"))
}

pub fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now().max(0.0) as u64)
        .unwrap_or_else(|| js_sys::Date::now().max(0.0) as u64)
}
