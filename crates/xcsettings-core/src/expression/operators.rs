//! Retrieval (`$(X:op)`) and replacement (`$(X:op=value)`) operators.
//!
//! Operators apply to each element of the referenced value. Path operators
//! are purely textual.

use crate::value::{bool_spelling, quote_word, standardize_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalOperator {
    Quote,
    Upper,
    Lower,
    Identifier,
    Rfc1034Identifier,
    C99ExtIdentifier,
    StripSlash,
    Dir,
    File,
    Base,
    Suffix,
    StandardizePath,
    Not,
}

impl RetrievalOperator {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "quote" => RetrievalOperator::Quote,
            "upper" => RetrievalOperator::Upper,
            "lower" => RetrievalOperator::Lower,
            "identifier" => RetrievalOperator::Identifier,
            "rfc1034identifier" => RetrievalOperator::Rfc1034Identifier,
            "c99extidentifier" => RetrievalOperator::C99ExtIdentifier,
            "__stripslash" => RetrievalOperator::StripSlash,
            "dir" => RetrievalOperator::Dir,
            "file" => RetrievalOperator::File,
            "base" => RetrievalOperator::Base,
            "suffix" => RetrievalOperator::Suffix,
            "standardizepath" => RetrievalOperator::StandardizePath,
            "not" => RetrievalOperator::Not,
            _ => return None,
        })
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            RetrievalOperator::Quote => quote_word(value),
            RetrievalOperator::Upper => value.to_uppercase(),
            RetrievalOperator::Lower => value.to_lowercase(),
            RetrievalOperator::Identifier => {
                identifier(value, |c| c.is_ascii_alphanumeric() || c == '_')
            }
            RetrievalOperator::C99ExtIdentifier => {
                identifier(value, |c| c.is_alphanumeric() || c == '_')
            }
            RetrievalOperator::Rfc1034Identifier => value
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                        c
                    } else {
                        '-'
                    }
                })
                .collect(),
            RetrievalOperator::StripSlash => value.trim_end_matches('/').to_string(),
            RetrievalOperator::Dir => {
                let dir = dirname(value);
                if dir.is_empty() {
                    "./".to_string()
                } else if dir.ends_with('/') {
                    dir.to_string()
                } else {
                    format!("{}/", dir)
                }
            }
            RetrievalOperator::File => basename(value).to_string(),
            RetrievalOperator::Base => split_suffix(basename(value)).0.to_string(),
            RetrievalOperator::Suffix => split_suffix(basename(value)).1.to_string(),
            RetrievalOperator::StandardizePath => standardize_path(value),
            // Only the exact spelling `YES` is true here.
            RetrievalOperator::Not => bool_spelling(value != "YES").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementOperator {
    Dir,
    File,
    Base,
    Suffix,
    Default,
    RelativeTo,
    IsAncestor,
}

impl ReplacementOperator {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "dir" => ReplacementOperator::Dir,
            "file" => ReplacementOperator::File,
            "base" => ReplacementOperator::Base,
            "suffix" => ReplacementOperator::Suffix,
            "default" => ReplacementOperator::Default,
            "relativeto" => ReplacementOperator::RelativeTo,
            "isancestor" => ReplacementOperator::IsAncestor,
            _ => return None,
        })
    }

    /// Whether the operator still produces a value when the referenced
    /// value is empty.
    pub fn applies_to_empty(self) -> bool {
        matches!(self, ReplacementOperator::Default)
    }

    pub fn apply(self, value: &str, operand: &str) -> String {
        match self {
            ReplacementOperator::Dir => join(operand, basename(value)),
            ReplacementOperator::File => join(dirname(value), operand),
            ReplacementOperator::Base => {
                let suffix = split_suffix(basename(value)).1;
                join(dirname(value), &format!("{}{}", operand, suffix))
            }
            ReplacementOperator::Suffix => {
                let stem_len = value.len() - split_suffix(basename(value)).1.len();
                let stem = &value[..stem_len];
                // `.o`, `o` and `x.o` all mean the `o` suffix.
                let suffix = operand.rsplit('.').next().unwrap_or(operand);
                format!("{}.{}", stem, suffix)
            }
            ReplacementOperator::Default => {
                if value.is_empty() {
                    operand.to_string()
                } else {
                    value.to_string()
                }
            }
            ReplacementOperator::RelativeTo => {
                relative_to(value, operand).unwrap_or_else(|| value.to_string())
            }
            ReplacementOperator::IsAncestor => bool_spelling(is_ancestor(operand, value)).to_string(),
        }
    }
}

fn identifier(value: &str, keep: impl Fn(char) -> bool) -> String {
    let mut out: String = value
        .chars()
        .map(|c| if keep(c) { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "",
    }
}

fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Split a file name into stem and `.ext`. Leading dots do not start a
/// suffix.
fn split_suffix(file: &str) -> (&str, &str) {
    match file.rfind('.') {
        Some(i) if i > 0 => (&file[..i], &file[i..]),
        _ => (file, ""),
    }
}

fn join(dir: &str, name: &str) -> String {
    if name.starts_with('/') || dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

/// `target` expressed relative to the directory `base`; both must be
/// absolute.
fn relative_to(base: &str, target: &str) -> Option<String> {
    if !base.starts_with('/') || !target.starts_with('/') {
        return None;
    }
    let base = standardize_path(base);
    let target = standardize_path(target);
    let from = components(&base);
    let to = components(&target);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}

/// Whether `ancestor` is a proper ancestor of `path`; both must be absolute.
fn is_ancestor(ancestor: &str, path: &str) -> bool {
    if !ancestor.starts_with('/') || !path.starts_with('/') {
        return false;
    }
    let ancestor = standardize_path(ancestor);
    let path = standardize_path(path);
    let a = components(&ancestor);
    let p = components(&path);
    a.len() < p.len() && p.starts_with(&a)
}
