//! Accumulates evaluated text as list elements.

/// Built-up value of an expression.
///
/// Text is appended to the last element until a separator has been
/// requested; the next append then starts a new element. An empty builder
/// (no elements) is distinct from one holding a single empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResultBuilder {
    elements: Vec<String>,
    needs_separator: bool,
}

impl ResultBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_elements(elements: Vec<String>) -> Self {
        ResultBuilder {
            elements,
            needs_separator: false,
        }
    }

    pub(crate) fn has_text(&self) -> bool {
        !self.elements.is_empty()
    }

    pub(crate) fn elements(&self) -> &[String] {
        &self.elements
    }

    pub(crate) fn append(&mut self, text: &str) {
        match self.elements.last_mut() {
            Some(last) if !self.needs_separator => last.push_str(text),
            _ => {
                self.elements.push(text.to_string());
                self.needs_separator = false;
            }
        }
    }

    /// Start a new element on the next append. No-op before any text.
    pub(crate) fn set_needs_separator(&mut self) {
        if self.has_text() {
            self.needs_separator = true;
        }
    }

    /// Splice another result in: its first element joins the current one
    /// unless a separator is pending.
    pub(crate) fn append_result(&mut self, other: ResultBuilder) {
        let mut rest = other.elements.into_iter();
        let Some(first) = rest.next() else {
            return;
        };
        self.append(&first);
        self.elements.extend(rest);
    }

    pub(crate) fn into_elements(self) -> Vec<String> {
        self.elements
    }

    /// Concatenate all elements, ignoring separators.
    pub(crate) fn into_string(self) -> String {
        self.elements.concat()
    }
}
