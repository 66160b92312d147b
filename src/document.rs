use std::fmt;

/// Host-assigned document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentUri(String);

impl DocumentUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an open document relates to the filter engine.
///
/// Both variants carry the source document the view derives from; for a
/// normal document that is the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentMode {
    Normal(DocumentUri),
    Focus(DocumentUri),
}

impl DocumentMode {
    pub fn is_focus(&self) -> bool {
        matches!(self, DocumentMode::Focus(_))
    }

    pub fn source(&self) -> &DocumentUri {
        match self {
            DocumentMode::Normal(source) | DocumentMode::Focus(source) => source,
        }
    }
}

/// An open document as seen by the core: its uri and its mode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    uri: DocumentUri,
    mode: DocumentMode,
}

impl DocumentHandle {
    pub fn normal(uri: DocumentUri) -> Self {
        Self {
            mode: DocumentMode::Normal(uri.clone()),
            uri,
        }
    }

    /// Handle for the focus view of `source`, addressed under `scheme`.
    pub fn focus_of(source: &DocumentUri, scheme: &str) -> Self {
        Self {
            uri: DocumentUri::new(format!("{scheme}{source}")),
            mode: DocumentMode::Focus(source.clone()),
        }
    }

    /// Classify a raw host uri once, at the host boundary.
    pub fn from_host_uri(raw: &str, scheme: &str) -> Self {
        match raw.strip_prefix(scheme) {
            Some(source) if !scheme.is_empty() => Self {
                uri: DocumentUri::new(raw),
                mode: DocumentMode::Focus(DocumentUri::new(source)),
            },
            _ => Self::normal(DocumentUri::new(raw)),
        }
    }

    pub fn uri(&self) -> &DocumentUri {
        &self.uri
    }

    pub fn mode(&self) -> &DocumentMode {
        &self.mode
    }

    pub fn is_focus(&self) -> bool {
        self.mode.is_focus()
    }

    pub fn source(&self) -> &DocumentUri {
        self.mode.source()
    }
}

/// Split document text into lines the way the editor numbers them.
///
/// Empty text has zero lines. A trailing newline yields a final empty line.
/// Lines keep their raw text, so a CRLF document's lines end in `\r`.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').collect()
}
