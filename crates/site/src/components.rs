//! Desktop shell UI composition.

mod window;

use desktop_runtime::{render_desktop, DesktopAction, DesktopView, PointerPosition};
use desktop_sync_contract::{window_types, Theme};
use leptos::*;

use self::window::DesktopWindow;
use crate::runtime_context::use_desktop_runtime;

struct LauncherIcon {
    label: &'static str,
    kind: &'static str,
    glyph: &'static str,
}

static LAUNCHER_ICONS: [LauncherIcon; 4] = [
    LauncherIcon {
        label: "TextEdit",
        kind: window_types::TEXT_EDITOR,
        glyph: "📝",
    },
    LauncherIcon {
        label: "Browser",
        kind: window_types::BROWSER,
        glyph: "🌐",
    },
    LauncherIcon {
        label: "Finder",
        kind: window_types::FILE_MANAGER,
        glyph: "📁",
    },
    LauncherIcon {
        label: "Terminal",
        kind: "terminal",
        glyph: "💻",
    },
];

fn theme_label(theme: Theme) -> &'static str {
    match theme {
        Theme::System7 => "System 7",
        Theme::WindowsXp => "Windows XP",
    }
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

fn is_primary_press(ev: &web_sys::PointerEvent) -> bool {
    if ev.pointer_type() == "mouse" {
        ev.button() == 0
    } else {
        ev.is_primary()
    }
}

#[component]
/// Full desktop surface: menu bar, launcher icons, windows, and the minimized tray.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let view_model =
        create_memo(move |_| render_desktop(&runtime.state.get(), &runtime.interaction.get()));

    view! {
        <div
            class=move || format!("desktop theme-{}", view_model.with(|v| v.theme.as_str()))
            data-theme=move || view_model.with(|v| v.theme.as_str())
        >
            <MenuBar view_model=view_model />
            <ConnectionBannerView view_model=view_model />
            <DesktopIcons />
            <For
                each=move || view_model.with(|v| v.windows.clone())
                key=|win| win.id.clone()
                let:win
            >
                <DesktopWindow window_id=win.id view_model=view_model />
            </For>
            <MinimizedTray view_model=view_model />
        </div>
    }
}

#[component]
fn MenuBar(view_model: Memo<DesktopView>) -> impl IntoView {
    let runtime = use_desktop_runtime();

    view! {
        <nav class="menu-bar">
            <div class="menu-item"><strong>"Desktop"</strong></div>
            <div class="menu-item">"File"</div>
            <div class="menu-item">"Edit"</div>
            <div class="menu-item">"View"</div>
            <div class="menu-item">"Window"</div>
            <div class="menu-item">"Help"</div>
            <button
                class="menu-item theme-toggle"
                on:click=move |ev| {
                    stop_mouse_event(&ev);
                    runtime.dispatch_action(DesktopAction::ToggleTheme);
                }
            >
                {move || format!("Theme: {}", theme_label(view_model.with(|v| v.theme)))}
            </button>
        </nav>
    }
}

#[component]
fn ConnectionBannerView(view_model: Memo<DesktopView>) -> impl IntoView {
    let banner = create_memo(move |_| view_model.with(|v| v.banner));

    view! {
        <Show when=move || banner.get().is_some() fallback=|| ()>
            <div class="connection-banner" role="status">
                {move || banner.get().map(|banner| banner.message()).unwrap_or_default()}
            </div>
        </Show>
    }
}

#[component]
fn DesktopIcons() -> impl IntoView {
    let runtime = use_desktop_runtime();

    view! {
        <div class="desktop-icons">
            {LAUNCHER_ICONS
                .iter()
                .map(|icon| {
                    let open = move |_| {
                        runtime.dispatch_action(DesktopAction::CreateWindow {
                            kind: icon.kind.to_string(),
                            title: icon.label.to_string(),
                        });
                    };
                    view! {
                        <button class="desktop-icon" on:click=open>
                            <span class="desktop-icon-glyph" aria-hidden="true">{icon.glyph}</span>
                            <span>{icon.label}</span>
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn MinimizedTray(view_model: Memo<DesktopView>) -> impl IntoView {
    let runtime = use_desktop_runtime();

    view! {
        <footer class="minimized-tray">
            <For
                each=move || view_model.with(|v| v.minimized.clone())
                key=|win| win.id.clone()
                let:win
            >
                {
                    let window_id = win.id.clone();
                    view! {
                        <button
                            class="minimized-window"
                            on:click=move |ev| {
                                stop_mouse_event(&ev);
                                runtime.dispatch_action(DesktopAction::RestoreWindow {
                                    window_id: window_id.clone(),
                                });
                            }
                        >
                            {win.title}
                        </button>
                    }
                }
            </For>
        </footer>
    }
}
