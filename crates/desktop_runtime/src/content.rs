//! Content-provider dispatch keyed by the window `type` tag.

use desktop_sync_contract::{window_types, WindowPatch, WindowRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Known content providers plus a fallback for unrecognized tags.
pub enum ContentKind {
    /// Editable text bound to the window content.
    TextEditor,
    /// Browser placeholder.
    Browser,
    /// File manager placeholder.
    FileManager,
    /// Any other tag.
    Other(String),
}

impl ContentKind {
    /// Maps a wire tag onto a provider kind.
    pub fn from_type(kind: &str) -> Self {
        match kind {
            window_types::TEXT_EDITOR => Self::TextEditor,
            window_types::BROWSER => Self::Browser,
            window_types::FILE_MANAGER => Self::FileManager,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the wire tag.
    pub fn as_type(&self) -> &str {
        match self {
            Self::TextEditor => window_types::TEXT_EDITOR,
            Self::Browser => window_types::BROWSER,
            Self::FileManager => window_types::FILE_MANAGER,
            Self::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Renderer-neutral description of a window body.
pub enum ContentView {
    /// Editable text area.
    TextEditor {
        /// Current text.
        text: String,
        /// Hint shown while the text is empty.
        placeholder: &'static str,
    },
    /// Static heading and message.
    Placeholder {
        /// Heading.
        heading: String,
        /// Message body.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// User input forwarded from a rendered window body.
pub enum ContentInput {
    /// The text area value changed.
    TextChanged(String),
}

/// Renders a window body and maps body input onto window updates.
pub trait ContentProvider {
    /// Builds the body view for `window`.
    fn render(&self, window: &WindowRecord) -> ContentView;

    /// Maps input from the rendered body onto a patch; `None` means the input is ignored.
    fn handle_input(&self, _window: &WindowRecord, _input: ContentInput) -> Option<WindowPatch> {
        None
    }
}

struct TextEditorProvider;

impl ContentProvider for TextEditorProvider {
    fn render(&self, window: &WindowRecord) -> ContentView {
        ContentView::TextEditor {
            text: window.content.clone().unwrap_or_default(),
            placeholder: "Start typing...",
        }
    }

    fn handle_input(&self, window: &WindowRecord, input: ContentInput) -> Option<WindowPatch> {
        match input {
            ContentInput::TextChanged(text) if window.content.as_deref() != Some(text.as_str()) => {
                Some(WindowPatch::content(text))
            }
            ContentInput::TextChanged(_) => None,
        }
    }
}

struct StaticProvider {
    heading: &'static str,
    message: &'static str,
}

impl ContentProvider for StaticProvider {
    fn render(&self, _window: &WindowRecord) -> ContentView {
        ContentView::Placeholder {
            heading: self.heading.to_string(),
            message: self.message.to_string(),
        }
    }
}

struct FallbackProvider;

impl ContentProvider for FallbackProvider {
    fn render(&self, window: &WindowRecord) -> ContentView {
        ContentView::Placeholder {
            heading: window.title.clone(),
            message: format!("This is a {} window.", window.kind),
        }
    }
}

static TEXT_EDITOR: TextEditorProvider = TextEditorProvider;
static BROWSER: StaticProvider = StaticProvider {
    heading: "Browser",
    message: "Browser functionality coming soon...",
};
static FILE_MANAGER: StaticProvider = StaticProvider {
    heading: "File Manager",
    message: "File management functionality coming soon...",
};
static FALLBACK: FallbackProvider = FallbackProvider;

/// Returns the provider registered for `kind`.
pub fn provider_for(kind: &ContentKind) -> &'static dyn ContentProvider {
    match kind {
        ContentKind::TextEditor => &TEXT_EDITOR,
        ContentKind::Browser => &BROWSER,
        ContentKind::FileManager => &FILE_MANAGER,
        ContentKind::Other(_) => &FALLBACK,
    }
}

/// Renders the body of `window` with its provider.
pub fn render_content(window: &WindowRecord) -> ContentView {
    provider_for(&ContentKind::from_type(&window.kind)).render(window)
}

/// Maps body input for `window` onto a patch.
pub fn content_patch(window: &WindowRecord, input: ContentInput) -> Option<WindowPatch> {
    provider_for(&ContentKind::from_type(&window.kind)).handle_input(window, input)
}

#[cfg(test)]
mod tests {
    use desktop_sync_contract::WindowId;
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(kind: &str, content: Option<&str>) -> WindowRecord {
        WindowRecord {
            id: WindowId::new("window-1"),
            title: "Untitled".to_string(),
            kind: kind.to_string(),
            x: 0,
            y: 0,
            width: 600,
            height: 400,
            minimized: false,
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn unknown_types_fall_back_to_title_and_type() {
        assert_eq!(
            ContentKind::from_type("terminal"),
            ContentKind::Other("terminal".to_string())
        );
        assert_eq!(
            render_content(&record("terminal", None)),
            ContentView::Placeholder {
                heading: "Untitled".to_string(),
                message: "This is a terminal window.".to_string(),
            }
        );
    }

    #[test]
    fn text_editor_binds_content_both_ways() {
        let window = record(window_types::TEXT_EDITOR, Some("hello"));
        assert!(matches!(
            render_content(&window),
            ContentView::TextEditor { ref text, .. } if text == "hello"
        ));
        assert_eq!(
            content_patch(&window, ContentInput::TextChanged("hello!".to_string())),
            Some(WindowPatch::content("hello!"))
        );
        assert_eq!(
            content_patch(&window, ContentInput::TextChanged("hello".to_string())),
            None
        );
    }

    #[test]
    fn placeholders_ignore_input() {
        let window = record(window_types::BROWSER, None);
        assert_eq!(
            content_patch(&window, ContentInput::TextChanged("x".to_string())),
            None
        );
        assert_eq!(ContentKind::from_type("file-manager").as_type(), "file-manager");
    }
}
