//! Attribute helpers for reading with `roxmltree` and a small indenting writer

use crate::error::{FormatError, Result};
use isomap_core::{Property, PropertyBag, PropertyType, PropertyValue};
use roxmltree::Node;
use std::str::FromStr;

fn invalid(context: &'static str, name: &str, value: &str) -> FormatError {
    FormatError::InvalidField {
        context,
        field: name.to_string(),
        value: value.to_string(),
    }
}

pub(crate) fn attribute<T: FromStr>(
    node: &Node,
    name: &'static str,
    context: &'static str,
) -> Result<T> {
    let text = node.attribute(name).ok_or(FormatError::MissingField {
        context,
        field: name,
    })?;
    text.parse().map_err(|_| invalid(context, name, text))
}

pub(crate) fn attribute_opt<T: FromStr>(
    node: &Node,
    name: &str,
    context: &'static str,
) -> Result<Option<T>> {
    node.attribute(name)
        .map(|text| text.parse().map_err(|_| invalid(context, name, text)))
        .transpose()
}

pub(crate) fn attribute_or<T: FromStr>(
    node: &Node,
    name: &str,
    context: &'static str,
    alternative: T,
) -> Result<T> {
    Ok(attribute_opt(node, name, context)?.unwrap_or(alternative))
}

/// Boolean attribute written as `0`/`1` (also accepts `true`/`false`)
pub(crate) fn flag_or(
    node: &Node,
    name: &str,
    context: &'static str,
    alternative: bool,
) -> Result<bool> {
    match node.attribute(name) {
        None => Ok(alternative),
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(other) => Err(invalid(context, name, other)),
    }
}

pub(crate) fn text_attr<'a>(node: &Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or_default()
}

/// Element children with a given tag name, in document order
pub(crate) fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

pub(crate) fn child<'a, 'input: 'a>(node: &Node<'a, 'input>, tag: &'a str) -> Option<Node<'a, 'input>> {
    children(node, tag).next()
}

/// Read a `<properties>` child; empty or absent yields `None`
pub(crate) fn parse_properties(node: &Node) -> Option<PropertyBag> {
    let props = child(node, "properties")?;
    let mut bag = PropertyBag::new();
    for p in children(&props, "property") {
        let Some(name) = p.attribute("name") else {
            tracing::debug!("Skipping property without a name");
            continue;
        };
        let ty = PropertyType::from_tag(p.attribute("type").unwrap_or("string"));
        // Multi-line strings are stored as element text
        let text = p.attribute("value").or_else(|| p.text()).unwrap_or_default();
        bag.insert(
            name.to_string(),
            Property::new(name, ty, PropertyValue::from_text(ty, text)),
        );
    }
    (!bag.is_empty()).then_some(bag)
}

/// Escape text for use inside a double-quoted attribute
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a number the way Tiled does: integral values without a fraction
pub(crate) fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Line-oriented XML emitter with two-space indentation
#[derive(Debug, Default)]
pub(crate) struct XmlWriter {
    out: String,
    depth: usize,
}

pub(crate) type Attrs<'a> = [(&'a str, String)];

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
            depth: 0,
        }
    }

    fn start_line(&mut self, tag: &str, attrs: &Attrs<'_>) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape_xml(value));
            self.out.push('"');
        }
    }

    pub(crate) fn open(&mut self, tag: &str, attrs: &Attrs<'_>) {
        self.start_line(tag, attrs);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    pub(crate) fn empty(&mut self, tag: &str, attrs: &Attrs<'_>) {
        self.start_line(tag, attrs);
        self.out.push_str("/>\n");
    }

    /// Element whose content is `text`, kept on the tag's line so whitespace survives
    pub(crate) fn text_element(&mut self, tag: &str, attrs: &Attrs<'_>, text: &str) {
        self.start_line(tag, attrs);
        self.out.push('>');
        self.out.push_str(&escape_xml(text));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Raw text on its own indented line
    pub(crate) fn text(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `<properties>` block; nothing for an empty bag
    pub(crate) fn properties(&mut self, bag: Option<&PropertyBag>) {
        let Some(bag) = bag.filter(|b| !b.is_empty()) else {
            return;
        };
        self.open("properties", &[]);
        for p in bag.values() {
            let value = p.value.to_string();
            let mut attrs = vec![
                ("name", p.name.clone()),
                ("type", p.ty.as_str().to_string()),
            ];
            // Attribute values lose line breaks and tabs on re-parse
            if value.contains(['\n', '\r', '\t']) {
                self.text_element("property", &attrs, &value);
            } else {
                attrs.push(("value", value));
                self.empty("property", &attrs);
            }
        }
        self.close("properties");
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"a & b < c > "d""#),
            "a &amp; b &lt; c &gt; &quot;d&quot;"
        );
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(32.0), "32");
        assert_eq!(number(-8.0), "-8");
        assert_eq!(number(0.5), "0.5");
    }

    #[test]
    fn test_writer_indents() {
        let mut w = XmlWriter::new();
        w.open("map", &[("width", "2".to_string())]);
        w.empty("image", &[("source", "a&b.png".to_string())]);
        w.text("1,2");
        w.close("map");
        assert_eq!(
            w.finish(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<map width=\"2\">\n  <image source=\"a&amp;b.png\"/>\n  1,2\n</map>\n"
        );
    }

    #[test]
    fn test_attribute_helpers() {
        let doc = roxmltree::Document::parse(r#"<layer width="4" visible="0" name="x"/>"#).unwrap();
        let node = doc.root_element();
        assert_eq!(attribute::<u32>(&node, "width", "layer").unwrap(), 4);
        assert!(!flag_or(&node, "visible", "layer", true).unwrap());
        assert!(flag_or(&node, "locked", "layer", true).unwrap());
        assert_eq!(attribute_or(&node, "opacity", "layer", 1.0).unwrap(), 1.0);
        assert!(attribute::<u32>(&node, "name", "layer").is_err());
        assert!(matches!(
            attribute::<u32>(&node, "height", "layer"),
            Err(FormatError::MissingField { field: "height", .. })
        ));
    }

    #[test]
    fn test_properties_text_fallback() {
        let doc = roxmltree::Document::parse(
            r#"<tile><properties><property name="a" type="int" value="3"/><property name="b">line one</property></properties></tile>"#,
        )
        .unwrap();
        let bag = parse_properties(&doc.root_element()).unwrap();
        assert_eq!(bag["a"].value, PropertyValue::Int(3));
        assert_eq!(bag["b"].value, PropertyValue::String("line one".into()));
    }

    #[test]
    fn test_multiline_property_survives() {
        let mut bag = PropertyBag::new();
        let note = "first line\n  second & \"third\"\tend";
        bag.insert("note".into(), Property::string("note", note));
        bag.insert("speed".into(), Property::new("speed", PropertyType::Int, PropertyValue::Int(4)));

        let mut w = XmlWriter::new();
        w.open("tile", &[]);
        w.properties(Some(&bag));
        w.close("tile");
        let xml = w.finish();
        assert!(xml.contains(r#"<property name="speed" type="int" value="4"/>"#));

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let parsed = parse_properties(&doc.root_element()).unwrap();
        assert_eq!(parsed, bag);
    }
}
