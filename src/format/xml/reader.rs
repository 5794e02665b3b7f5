use std::io::Read;
use std::str;

use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::reader::Reader as XmlReader;
use regex::Regex;

use crate::core::document::{Document, Node};
use crate::error::ConversionError;

/// Parses XML into a [`Document`], preserving attribute order, element
/// order and CDATA markers.
///
/// Well-formed input goes through the strict event parser. When that
/// fails, the reader falls back to a tolerant regex-based extraction that
/// produces best-effort nodes (unclosed elements are skipped, entities
/// decoded, CDATA unwrapped) before the input is treated as fatal.
///
/// # Examples
///
/// ```
/// use datamorph_rs::format::xml::read_str;
///
/// let doc = read_str(r#"<root><row Name="John"><Age>30</Age></row></root>"#).unwrap();
/// let row = &doc.root.children[0];
///
/// assert_eq!(row.attribute("Name"), Some("John"));
/// assert_eq!(row.child("Age").unwrap().text.as_deref(), Some("30"));
/// ```
pub fn read_str(xml: &str) -> Result<Document, ConversionError> {
    match parse_strict(xml) {
        Ok(document) => Ok(document),
        Err(strict_error) => {
            warn!("strict XML parse failed ({strict_error}), trying tolerant extraction");
            parse_tolerant(xml).ok_or(strict_error)
        }
    }
}

/// Reads a document from any byte source, buffering it fully first.
pub fn read_from<R: Read>(mut reader: R) -> Result<Document, ConversionError> {
    let mut xml = String::new();
    reader
        .read_to_string(&mut xml)
        .map_err(|e| ConversionError::Reader(format!("failed to read XML input: {e}")))?;
    read_str(&xml)
}

fn parse_strict(xml: &str) -> Result<Document, ConversionError> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);

    // parents of the node currently being built
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ConversionError::Reader(format!("XML parsing error: {e}")))?;

        match event {
            Event::Start(ref e) => {
                stack.push(node_from_start(e)?);
            }
            Event::Empty(ref e) => {
                attach(&mut stack, &mut root, node_from_start(e)?)?;
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    ConversionError::Reader("unbalanced closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map_err(|e| ConversionError::Reader(format!("bad XML text: {e}")))?;
                if let Some(node) = stack.last_mut() {
                    if node.children.is_empty() {
                        node.text = Some(text.into_owned());
                    }
                }
            }
            Event::CData(ref c) => {
                let content = str::from_utf8(c.as_ref())
                    .map_err(|e| ConversionError::Reader(format!("bad CDATA bytes: {e}")))?;
                if let Some(node) = stack.last_mut() {
                    if node.children.is_empty() {
                        node.text = Some(content.to_string());
                        node.raw = true;
                    }
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ConversionError::Reader(
            "unexpected end of XML input".to_string(),
        ));
    }

    root.map(Document::new)
        .ok_or_else(|| ConversionError::Reader("no root element found".to_string()))
}

fn node_from_start(e: &quick_xml::events::BytesStart) -> Result<Node, ConversionError> {
    let tag = str::from_utf8(e.name().as_ref())
        .map_err(|err| ConversionError::Reader(format!("bad XML tag bytes: {err}")))?
        .to_string();

    let mut node = Node::new(tag);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            ConversionError::Reader(format!("bad XML attribute: {err}"))
        })?;
        let name = str::from_utf8(attr.key.as_ref())
            .map_err(|err| ConversionError::Reader(format!("bad attribute name: {err}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ConversionError::Reader(format!("bad attribute value: {err}")))?
            .into_owned();
        node.attributes.push((name, value));
    }

    Ok(node)
}

fn attach(
    stack: &mut [Node],
    root: &mut Option<Node>,
    node: Node,
) -> Result<(), ConversionError> {
    match stack.last_mut() {
        Some(parent) => {
            // mixed content is not modeled; children win over text
            parent.text = None;
            parent.children.push(node);
        }
        None => {
            if root.is_some() {
                return Err(ConversionError::Reader(
                    "multiple root elements".to_string(),
                ));
            }
            *root = Some(node);
        }
    }
    Ok(())
}

/// Best-effort extraction for malformed input. Opening tags are located
/// with a regex, matching closers with a plain text search; elements whose
/// closer never appears are dropped rather than failing the read.
fn parse_tolerant(xml: &str) -> Option<Document> {
    let open = Regex::new(r#"<([A-Za-z_][A-Za-z0-9_.:-]*)((?:\s+[A-Za-z_][A-Za-z0-9_.:-]*\s*=\s*"[^"]*")*)\s*(/?)>"#)
        .expect("valid element regex");
    let attr = Regex::new(r#"([A-Za-z_][A-Za-z0-9_.:-]*)\s*=\s*"([^"]*)""#)
        .expect("valid attribute regex");

    let mut top = extract_elements(xml, &open, &attr);
    match top.len() {
        0 => None,
        1 => {
            debug!("tolerant XML extraction produced a document");
            Some(Document::new(top.remove(0)))
        }
        _ => {
            // multiple top-level fragments; wrap them
            let mut root = Node::new("root");
            root.children = top;
            Some(Document::new(root))
        }
    }
}

fn extract_elements(content: &str, open: &Regex, attr: &Regex) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    while let Some(m) = open.captures(&content[cursor..]) {
        let full = m.get(0).expect("capture 0 always present");
        let tag = &m[1];
        let mut node = Node::new(tag);
        for attribute in attr.captures_iter(&m[2]) {
            node.attributes
                .push((attribute[1].to_string(), decode_entities(&attribute[2])));
        }

        let after_open = cursor + full.end();
        if &m[3] == "/" {
            // self-closing
            nodes.push(node);
            cursor = after_open;
            continue;
        }

        let closer = format!("</{tag}>");
        let Some(close_at) = content[after_open..].find(&closer) else {
            // unclosed element, skip past the opening tag
            cursor = after_open;
            continue;
        };

        let inner = &content[after_open..after_open + close_at];
        let children = extract_elements(inner, open, attr);
        if children.is_empty() {
            set_leaf_text(&mut node, inner);
        } else {
            node.children = children;
        }

        nodes.push(node);
        cursor = after_open + close_at + closer.len();
    }

    nodes
}

fn set_leaf_text(node: &mut Node, inner: &str) {
    let trimmed = inner.trim();
    if let Some(cdata) = trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
    {
        node.text = Some(cdata.to_string());
        node.raw = true;
    } else if !trimmed.is_empty() {
        node.text = Some(decode_entities(trimmed));
    }
}

fn decode_entities(content: &str) -> String {
    content
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
