//! Browser shell for the synchronized desktop.
//!
//! [`DesktopProvider`] owns the reactive copy of the `desktop_runtime` reducer state and the push
//! channel; [`DesktopShell`] renders the view model it derives.

mod components;
mod effect_executor;
mod interop;
mod runtime_context;
mod sync_channel;
mod transport;

use leptos::*;
use leptos_meta::*;

pub use components::DesktopShell;
pub use runtime_context::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext};
pub use transport::FetchCommandTransport;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Desktop" />
        <Meta name="description" content="A shared retro desktop synchronized across browsers." />

        <main class="site-root">
            <DesktopProvider server_url=interop::server_url()>
                <DesktopShell />
            </DesktopProvider>
        </main>
    }
}

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    leptos::mount_to_body(|| leptos::view! { <SiteApp /> })
}
