//! Text helpers shared by conversion, operators and literal defaults.

/// Parse a boolean setting value.
///
/// Accepts `YES/NO`, `TRUE/FALSE`, `ON/OFF` (any case) and `1/0`.
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    const TRUE: &[&str] = &["yes", "true", "on", "1"];
    const FALSE: &[&str] = &["no", "false", "off", "0"];
    if TRUE.iter().any(|t| text.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|f| text.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// Canonical spelling of a boolean value.
pub fn bool_spelling(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}

/// Syntactic path normalization.
///
/// Collapses repeated separators, drops `.` components and the trailing
/// separator. `..` is left alone and the filesystem is never consulted.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let absolute = path.starts_with('/');
    let joined = path
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Like [`normalize_path`], but also folds `..` components.
pub fn standardize_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                // `/..` is `/`
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Split text into words the way list-valued settings are split.
///
/// Whitespace separates words; single and double quotes group; a backslash
/// escapes the next character anywhere.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                in_word = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' | '\'' if quote == Some(c) => quote = None,
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                in_word = true;
            }
            c if c.is_whitespace() && quote.is_none() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// Quote a word so that [`split_words`] yields it back unchanged.
pub fn quote_word(word: &str) -> String {
    if word.is_empty() {
        return "\"\"".to_string();
    }
    let plain = word
        .chars()
        .all(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '\\' | '$'));
    if plain {
        return word.to_string();
    }
    let mut quoted = String::with_capacity(word.len() + 2);
    quoted.push('"');
    for c in word.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Render a list as a single string of quoted words.
pub fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| quote_word(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
