//! Element model, tree traits and errors.

////////////////////////////////////////////////////////////////////////////////
// #region ElementModel

/// One markup element; owned tree handed to the caller by value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecElement {
    /// Tag name.
    pub name: String,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
    /// Text content; `None` with no children encodes as an empty element.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<SpecElement>,
}

impl SpecElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append a scalar child `<name>text</name>`.
    pub fn push_field<V: ToXmlText + ?Sized>(&mut self, name: &str, value: &V) {
        self.children.push(SpecElement {
            name: name.to_string(),
            text: value.to_xml_text(),
            ..Default::default()
        });
    }

    /// Builder form of [`Self::push_field`].
    pub fn with_field<V: ToXmlText + ?Sized>(mut self, name: &str, value: &V) -> Self {
        self.push_field(name, value);
        self
    }

    pub fn push_child(&mut self, child: SpecElement) {
        self.children.push(child);
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&SpecElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Children named `name`, in order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SpecElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text of the first child named `name`.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|child| child.text.as_deref())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Text form of a scalar field; `None` encodes as an empty element.
pub trait ToXmlText {
    fn to_xml_text(&self) -> Option<String>;
}

impl ToXmlText for bool {
    fn to_xml_text(&self) -> Option<String> {
        Some(if *self { "True" } else { "False" }.to_string())
    }
}

macro_rules! impl_to_xml_text_display {
    ($($ty:ty),*) => {
        $(
            impl ToXmlText for $ty {
                fn to_xml_text(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_to_xml_text_display!(i32, i64, u32, u64, usize, f64, str, String);

impl<T: ToXmlText + ?Sized> ToXmlText for &T {
    fn to_xml_text(&self) -> Option<String> {
        (**self).to_xml_text()
    }
}

impl<T: ToXmlText> ToXmlText for Option<T> {
    fn to_xml_text(&self) -> Option<String> {
        self.as_ref().and_then(ToXmlText::to_xml_text)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TreeTraits

/// Node of a self-referencing forest.
pub trait TreeNode {
    /// Unique id within one serialization call.
    fn node_id(&self) -> i64;
    /// Parent id; `None` marks a root.
    fn parent_id(&self) -> Option<i64>;
    /// Append scalar fields, in a fixed order, to the node element.
    fn write_fields(&self, element: &mut SpecElement);
}

impl<T: TreeNode + ?Sized> TreeNode for &T {
    fn node_id(&self) -> i64 {
        (**self).node_id()
    }

    fn parent_id(&self) -> Option<i64> {
        (**self).parent_id()
    }

    fn write_fields(&self, element: &mut SpecElement) {
        (**self).write_fields(element);
    }
}

/// Item attached to a tree node (e.g. a product linked to a category).
pub trait LeafItem {
    /// Whether the referenced entity is marked deleted.
    fn is_referent_deleted(&self) -> bool;
    /// Append scalar fields to the leaf element.
    fn write_fields(&self, element: &mut SpecElement);
}

impl<T: LeafItem + ?Sized> LeafItem for &T {
    fn is_referent_deleted(&self) -> bool {
        (**self).is_referent_deleted()
    }

    fn write_fields(&self, element: &mut SpecElement) {
        (**self).write_fields(element);
    }
}

/// Element names used by the tree serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTreeLayout {
    /// Document root tag.
    pub root_name: String,
    /// Attributes on the document root (e.g. a version marker).
    pub root_attributes: Vec<(String, String)>,
    /// Tag of each node element.
    pub node_name: String,
    /// Tag of the per-node leaf group.
    pub leaf_group_name: String,
    /// Tag of each leaf element.
    pub leaf_name: String,
    /// Tag of the per-node children group.
    pub children_group_name: String,
}

impl SpecTreeLayout {
    pub fn new(
        root_name: impl Into<String>,
        node_name: impl Into<String>,
        leaf_group_name: impl Into<String>,
        leaf_name: impl Into<String>,
        children_group_name: impl Into<String>,
    ) -> Self {
        Self {
            root_name: root_name.into(),
            root_attributes: Vec::new(),
            node_name: node_name.into(),
            leaf_group_name: leaf_group_name.into(),
            leaf_name: leaf_name.into(),
            children_group_name: children_group_name.into(),
        }
    }

    pub fn with_root_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.root_attributes.push((key.into(), value.into()));
        self
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures reported by the markup export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum XmlExportError {
    /// Two nodes share one id.
    #[error("Node id {id} appears more than once")]
    DuplicateNodeId {
        /// Offending id.
        id: i64,
    },
    /// Nodes not reachable from any root (cycles or missing parents).
    #[error("Nodes unreachable from any root (cycle or missing parent): {ids:?}")]
    UnreachableNodes {
        /// Offending ids in ascending order.
        ids: Vec<i64>,
    },
    /// Markup encoding failed.
    #[error("xml encode error: {0}")]
    Encode(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_text_forms() {
        let element = SpecElement::new("Category")
            .with_field("Id", &3_i64)
            .with_field("Published", &true)
            .with_field("Description", &Option::<String>::None)
            .with_field("Name", "Books");

        assert_eq!(element.field_text("Id"), Some("3"));
        assert_eq!(element.field_text("Published"), Some("True"));
        assert_eq!(element.field_text("Description"), None);
        assert!(element.child("Description").is_some());
        assert_eq!(element.field_text("Name"), Some("Books"));
    }

    #[test]
    fn test_attribute_lookup() {
        let element = SpecElement::new("Categories").with_attribute("Version", "4.70");
        assert_eq!(element.attribute("Version"), Some("4.70"));
        assert_eq!(element.attribute("Missing"), None);
    }
}
