//! Binary entrypoint for the browser-hosted desktop shell.

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn main() {
    console_error_panic_hook::set_once();
    site::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!(
        "This binary is intended for the browser/WASM workflow. Build `site_app` for wasm32 with the `csr` feature and serve it next to a running desktop_sync_server."
    );
}
