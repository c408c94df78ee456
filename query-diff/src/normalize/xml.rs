use crate::config::MODE_XML;
use crate::error::{QueryDiffError, Result};
use crate::observer::RunEvent;
use crate::traits::{NormalizeContext, Normalizer};
use crate::types::{ProcessedFile, SavedFile};
use encoding_rs::Encoding;
use roxmltree::{Document, Node, ParsingOptions};
use std::fs;
use std::path::Path;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Why an XML file could not be formatted
#[derive(Debug, thiserror::Error)]
pub enum XmlFormatError {
    #[error("failed to read: {0}")]
    Read(#[from] std::io::Error),

    #[error("not well-formed XML: {0}")]
    Malformed(String),
}

/// Pretty-prints XML responses into `{prefix}{index}f{postfix}`
#[derive(Debug, Clone)]
pub struct XmlNormalizer {
    indent: String,
}

impl Default for XmlNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlNormalizer {
    pub fn new() -> Self {
        Self::with_indent("  ")
    }

    pub fn with_indent<S: Into<String>>(indent: S) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// Decode the file at `path` with `encoding` and re-serialize it with
    /// stable indentation as UTF-8
    pub fn format(&self, path: &Path, encoding: &'static Encoding) -> std::result::Result<String, XmlFormatError> {
        let bytes = fs::read(path)?;
        let (text, _) = encoding.decode_with_bom_removal(&bytes);
        self.format_str(&text)
    }

    pub fn format_str(&self, text: &str) -> std::result::Result<String, XmlFormatError> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document = Document::parse_with_options(text, options)
            .map_err(|e| XmlFormatError::Malformed(e.to_string()))?;

        let mut writer = XmlWriter {
            out: String::with_capacity(text.len() + text.len() / 4),
            indent: &self.indent,
        };
        writer.write_document(&document);
        Ok(writer.out)
    }
}

impl Normalizer for XmlNormalizer {
    fn mode(&self) -> &str {
        MODE_XML
    }

    fn normalize(&self, saved: &SavedFile, ctx: &NormalizeContext<'_>) -> Result<ProcessedFile> {
        let detected = ctx.detector.detect(&saved.path)?;
        match &detected.fallback_reason {
            Some(reason) => ctx.observer.notify(&RunEvent::EncodingFallback {
                path: saved.path.clone(),
                encoding: detected.label(),
                reason: reason.clone(),
            }),
            None => ctx.observer.notify(&RunEvent::EncodingDetected {
                path: saved.path.clone(),
                encoding: detected.label(),
            }),
        }

        let formatted = self
            .format(&saved.path, detected.encoding)
            .map_err(|e| match e {
                XmlFormatError::Read(io) => QueryDiffError::Io(io),
                XmlFormatError::Malformed(message) => {
                    QueryDiffError::malformed_input(saved.index, &saved.path, message)
                }
            })?;

        let file_name = ctx.naming.processed_file_name(saved.index);
        let path = ctx.persister.save_text(&file_name, &formatted)?;
        Ok(ProcessedFile::normalized(saved.index, path))
    }
}

struct XmlWriter<'a> {
    out: String,
    indent: &'a str,
}

impl XmlWriter<'_> {
    fn write_document(&mut self, document: &Document<'_>) {
        self.out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        for child in document.root().children() {
            if child.is_text() {
                continue;
            }
            self.write_block(child, 0);
        }
    }

    /// Write `node` on its own line(s) at `depth`
    fn write_block(&mut self, node: Node<'_, '_>, depth: usize) {
        self.write_indent(depth);
        if !node.is_element() {
            self.write_inline(node);
            self.out.push('\n');
            return;
        }

        self.write_start_tag(node);
        let children: Vec<Node<'_, '_>> = node.children().filter(|child| !is_blank_text(child)).collect();

        if children.is_empty() {
            self.out.push_str("/>\n");
            return;
        }
        self.out.push('>');

        if children.iter().any(|child| child.is_text()) {
            // text is kept byte for byte; reflowing it would change the content
            for child in node.children() {
                self.write_inline(child);
            }
        } else {
            self.out.push('\n');
            for child in children {
                self.write_block(child, depth + 1);
            }
            self.write_indent(depth);
        }

        self.write_end_tag(node);
        self.out.push('\n');
    }

    fn write_inline(&mut self, node: Node<'_, '_>) {
        if node.is_element() {
            self.write_start_tag(node);
            if node.has_children() {
                self.out.push('>');
                for child in node.children() {
                    self.write_inline(child);
                }
                self.write_end_tag(node);
            } else {
                self.out.push_str("/>");
            }
        } else if node.is_text() {
            escape_text(node.text().unwrap_or_default(), &mut self.out);
        } else if node.is_comment() {
            self.out.push_str("<!--");
            self.out.push_str(node.text().unwrap_or_default());
            self.out.push_str("-->");
        } else if let Some(pi) = node.pi() {
            self.out.push_str("<?");
            self.out.push_str(pi.target);
            if let Some(value) = pi.value {
                self.out.push(' ');
                self.out.push_str(value);
            }
            self.out.push_str("?>");
        }
    }

    fn write_start_tag(&mut self, node: Node<'_, '_>) {
        self.out.push('<');
        self.out.push_str(&qualified_name(node));

        for (prefix, uri) in new_namespaces(node) {
            match prefix {
                Some(prefix) => {
                    self.out.push_str(" xmlns:");
                    self.out.push_str(prefix);
                }
                None => self.out.push_str(" xmlns"),
            }
            self.out.push_str("=\"");
            escape_attribute(uri, &mut self.out);
            self.out.push('"');
        }

        for attribute in node.attributes() {
            self.out.push(' ');
            if let Some(prefix) = attribute
                .namespace()
                .and_then(|uri| attribute_prefix(node, uri))
            {
                self.out.push_str(prefix);
                self.out.push(':');
            }
            self.out.push_str(attribute.name());
            self.out.push_str("=\"");
            escape_attribute(attribute.value(), &mut self.out);
            self.out.push('"');
        }
    }

    fn write_end_tag(&mut self, node: Node<'_, '_>) {
        self.out.push_str("</");
        self.out.push_str(&qualified_name(node));
        self.out.push('>');
    }

    fn write_indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
    }
}

fn is_blank_text(node: &Node<'_, '_>) -> bool {
    node.is_text() && node.text().map_or(true, |text| text.trim().is_empty())
}

fn qualified_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|prefix| !prefix.is_empty())
    {
        Some(prefix) => format!("{}:{}", prefix, tag.name()),
        None => tag.name().to_string(),
    }
}

/// A non-empty prefix bound to `uri` in scope at `node`.
///
/// Unprefixed attributes have no namespace, so the default binding never
/// qualifies even when it shares the URI.
fn attribute_prefix<'a>(node: Node<'a, '_>, uri: &str) -> Option<&'a str> {
    if uri == XML_NAMESPACE {
        return Some("xml");
    }
    node.namespaces()
        .filter(|ns| ns.uri() == uri)
        .find_map(|ns| ns.name())
}

/// Namespace bindings first introduced on `node`, as (prefix, uri).
///
/// A default namespace that goes out of scope is reported as `(None, "")`.
fn new_namespaces<'a>(node: Node<'a, '_>) -> Vec<(Option<&'a str>, &'a str)> {
    let in_scope: Vec<(Option<&str>, &str)> = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .map(|ns| (ns.name(), ns.uri()))
        .collect();

    let parent_scope: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .filter(|ns| ns.uri() != XML_NAMESPACE)
                .map(|ns| (ns.name(), ns.uri()))
                .collect()
        })
        .unwrap_or_default();

    let mut declared: Vec<(Option<&str>, &str)> = in_scope
        .iter()
        .filter(|binding| !parent_scope.contains(binding))
        .copied()
        .collect();

    let default_dropped = parent_scope.iter().any(|(name, _)| name.is_none())
        && !in_scope.iter().any(|(name, _)| name.is_none());
    if default_dropped {
        declared.push((None, ""));
    }

    declared
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(ch),
        }
    }
}
