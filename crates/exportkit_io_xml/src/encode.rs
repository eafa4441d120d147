//! `quick-xml` encoder for [`SpecElement`] trees.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::spec::{SpecElement, XmlExportError};

const N_INDENT: usize = 2;

enum EnumStep<'a> {
    Open(&'a SpecElement),
    Close(&'a str),
}

/// Encode `root` as an indented UTF-8 document with an XML declaration.
pub fn encode_document(root: &SpecElement) -> Result<String, XmlExportError> {
    let mut v_buf = Vec::new();
    write_document(root, &mut v_buf)?;
    String::from_utf8(v_buf).map_err(|err| XmlExportError::Encode(err.to_string()))
}

/// Stream `root` into `sink`.
///
/// Elements without text and children are written as empty elements.
pub fn write_document<W: Write>(root: &SpecElement, sink: W) -> Result<(), XmlExportError> {
    let mut xml = Writer::new_with_indent(sink, b' ', N_INDENT);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(derive_xml_error)?;

    let mut l_steps = vec![EnumStep::Open(root)];
    while let Some(step) = l_steps.pop() {
        match step {
            EnumStep::Open(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for (key, value) in &element.attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }

                if element.text.is_none() && element.children.is_empty() {
                    xml.write_event(Event::Empty(start))
                        .map_err(derive_xml_error)?;
                    continue;
                }

                xml.write_event(Event::Start(start))
                    .map_err(derive_xml_error)?;
                if let Some(text) = &element.text {
                    xml.write_event(Event::Text(BytesText::new(text)))
                        .map_err(derive_xml_error)?;
                }
                l_steps.push(EnumStep::Close(element.name.as_str()));
                l_steps.extend(element.children.iter().rev().map(EnumStep::Open));
            }
            EnumStep::Close(name) => {
                xml.write_event(Event::End(BytesEnd::new(name)))
                    .map_err(derive_xml_error)?;
            }
        }
    }
    Ok(())
}

fn derive_xml_error(err: impl std::fmt::Display) -> XmlExportError {
    XmlExportError::Encode(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_has_declaration_and_attributes() {
        let root = SpecElement::new("Manufacturers").with_attribute("Version", "4.70");
        let c_xml = encode_document(&root).unwrap();
        assert!(c_xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(c_xml.contains("<Manufacturers Version=\"4.70\"/>"));
    }

    #[test]
    fn test_text_is_escaped_and_nulls_are_empty() {
        let mut root = SpecElement::new("Manufacturer");
        root.push_field("Name", "Black & Decker");
        root.push_field("Description", &Option::<String>::None);
        let c_xml = encode_document(&root).unwrap();

        assert!(c_xml.contains("<Name>Black &amp; Decker</Name>"));
        assert!(c_xml.contains("<Description/>"));
        assert!(c_xml.trim_end().ends_with("</Manufacturer>"));
    }

    #[test]
    fn test_children_keep_document_order() {
        let root = SpecElement::new("Order")
            .with_field("A", &1_i64)
            .with_field("B", &2_i64)
            .with_field("C", &3_i64);
        let c_xml = encode_document(&root).unwrap();
        let n_a = c_xml.find("<A>").unwrap();
        let n_b = c_xml.find("<B>").unwrap();
        let n_c = c_xml.find("<C>").unwrap();
        assert!(n_a < n_b && n_b < n_c);
    }
}
