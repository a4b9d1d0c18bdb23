use desktop_runtime::{ContentInput, ContentView, WindowView};
use desktop_sync_contract::WindowId;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Editor,
    Placeholder,
}

#[component]
pub(super) fn DesktopWindow(window_id: WindowId, view_model: Memo<DesktopView>) -> impl IntoView {
    let runtime = use_desktop_runtime();

    let window = {
        let window_id = window_id.clone();
        create_memo(move |_| {
            view_model.with(|v| v.windows.iter().find(|w| w.id == window_id).cloned())
        })
    };
    let geometry = move |f: fn(&WindowView) -> String| {
        window.with(|w| w.as_ref().map(f).unwrap_or_default())
    };

    let focus = {
        let window_id = window_id.clone();
        move |_: web_sys::PointerEvent| {
            let unfocused = window.with_untracked(|w| w.as_ref().is_some_and(|w| !w.focused));
            if unfocused {
                runtime.dispatch_action(DesktopAction::FocusWindow {
                    window_id: window_id.clone(),
                });
            }
        }
    };
    let begin_move = {
        let window_id = window_id.clone();
        move |ev: web_sys::PointerEvent| {
            if !is_primary_press(&ev) {
                return;
            }
            ev.prevent_default();
            ev.stop_propagation();
            runtime.dispatch_action(DesktopAction::BeginMove {
                window_id: window_id.clone(),
                pointer: pointer_from_pointer_event(&ev),
            });
        }
    };
    let begin_resize = {
        let window_id = window_id.clone();
        move |ev: web_sys::PointerEvent| {
            if !is_primary_press(&ev) {
                return;
            }
            ev.prevent_default();
            ev.stop_propagation();
            runtime.dispatch_action(DesktopAction::BeginResize {
                window_id: window_id.clone(),
                pointer: pointer_from_pointer_event(&ev),
            });
        }
    };
    let minimize = {
        let window_id = window_id.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            runtime.dispatch_action(DesktopAction::ToggleMinimize {
                window_id: window_id.clone(),
            });
        }
    };
    let close = {
        let window_id = window_id.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            runtime.dispatch_action(DesktopAction::CloseWindow {
                window_id: window_id.clone(),
            });
        }
    };
    let swallow_press = move |ev: web_sys::PointerEvent| {
        ev.prevent_default();
        ev.stop_propagation();
    };

    view! {
        <section
            class=move || {
                let (focused, interacting) = window
                    .with(|w| w.as_ref().map(|w| (w.focused, w.interacting)).unwrap_or_default());
                format!(
                    "window{}{}",
                    if focused { " focused" } else { "" },
                    if interacting { " interacting" } else { "" },
                )
            }
            style=move || {
                geometry(|w| {
                    format!(
                        "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
                        w.x, w.y, w.width, w.height, w.z_index
                    )
                })
            }
            on:pointerdown=focus
            role="dialog"
            aria-label=move || geometry(|w| w.title.clone())
        >
            <header class="window-header" on:pointerdown=begin_move>
                <div class="window-title">{move || geometry(|w| w.title.clone())}</div>
                <div class="window-controls">
                    <button
                        class="window-control minimize"
                        title="Minimize"
                        aria-label="Minimize window"
                        on:pointerdown=swallow_press
                        on:click=minimize
                    />
                    <button
                        class="window-control close"
                        title="Close"
                        aria-label="Close window"
                        on:pointerdown=swallow_press
                        on:click=close
                    />
                </div>
            </header>
            <div class="window-content">
                <WindowBody window_id=window_id window=window />
            </div>
            <div class="window-resize-handle" aria-hidden="true" on:pointerdown=begin_resize />
        </section>
    }
}

#[component]
fn WindowBody(window_id: WindowId, window: Memo<Option<WindowView>>) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let content = create_memo(move |_| window.with(|w| w.as_ref().map(|w| w.content.clone())));
    let kind = create_memo(move |_| {
        content.with(|c| match c {
            Some(ContentView::TextEditor { .. }) => BodyKind::Editor,
            _ => BodyKind::Placeholder,
        })
    });

    let editor_text = move || {
        content.with(|c| match c {
            Some(ContentView::TextEditor { text, .. }) => text.clone(),
            _ => String::new(),
        })
    };
    let editor_hint = move || {
        content.with(|c| match c {
            Some(ContentView::TextEditor { placeholder, .. }) => *placeholder,
            _ => "",
        })
    };
    let placeholder_part = move |heading: bool| {
        content.with(|c| match c {
            Some(ContentView::Placeholder { heading: h, .. }) if heading => h.clone(),
            Some(ContentView::Placeholder { message, .. }) if !heading => message.clone(),
            _ => String::new(),
        })
    };

    move || match kind.get() {
        BodyKind::Editor => {
            let window_id = window_id.clone();
            view! {
                <textarea
                    class="text-editor"
                    prop:value=editor_text
                    placeholder=editor_hint
                    on:input=move |ev| {
                        runtime.dispatch_action(DesktopAction::EditContent {
                            window_id: window_id.clone(),
                            input: ContentInput::TextChanged(event_target_value(&ev)),
                        });
                    }
                />
            }
            .into_view()
        }
        BodyKind::Placeholder => view! {
            <div class="content-placeholder">
                <h3>{move || placeholder_part(true)}</h3>
                <p>{move || placeholder_part(false)}</p>
            </div>
        }
        .into_view(),
    }
}
