use std::collections::BTreeMap;

use exportkit_io_xml::{
    HierarchicalTreeSerializer, LeafItem, SpecElement, SpecTreeLayout, TreeNode, encode_document,
};

struct Category {
    id: i64,
    parent: Option<i64>,
    name: &'static str,
}

impl TreeNode for Category {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent
    }

    fn write_fields(&self, element: &mut SpecElement) {
        element.push_field("Id", &self.id);
        element.push_field("Name", self.name);
    }
}

struct Link {
    product_id: i64,
    if_product_deleted: bool,
}

impl LeafItem for Link {
    fn is_referent_deleted(&self) -> bool {
        self.if_product_deleted
    }

    fn write_fields(&self, element: &mut SpecElement) {
        element.push_field("ProductId", &self.product_id);
    }
}

fn layout() -> SpecTreeLayout {
    SpecTreeLayout::new(
        "Categories",
        "Category",
        "Products",
        "ProductCategory",
        "SubCategories",
    )
    .with_root_attribute("Version", "4.70")
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: 1,
            parent: None,
            name: "A",
        },
        Category {
            id: 2,
            parent: Some(1),
            name: "B",
        },
        Category {
            id: 3,
            parent: Some(1),
            name: "C",
        },
    ]
}

fn links() -> BTreeMap<i64, Vec<Link>> {
    BTreeMap::from([
        (
            1,
            vec![Link {
                product_id: 10,
                if_product_deleted: false,
            }],
        ),
        (
            2,
            vec![Link {
                product_id: 20,
                if_product_deleted: true,
            }],
        ),
        (
            3,
            vec![Link {
                product_id: 30,
                if_product_deleted: false,
            }],
        ),
    ])
}

fn count_nodes(element: &SpecElement) -> usize {
    element
        .children_named("Category")
        .map(|node| 1 + node.child("SubCategories").map_or(0, count_nodes))
        .sum()
}

#[test]
fn test_three_category_forest() {
    let layout = layout();
    let l_categories = categories();
    let dict_links = links();
    let root = HierarchicalTreeSerializer::new(&layout, &l_categories)
        .unwrap()
        .serialize(|category: &Category| {
            dict_links
                .get(&category.id)
                .map(|l_links| l_links.as_slice())
                .unwrap_or(&[])
        });

    assert_eq!(root.attribute("Version"), Some("4.70"));
    assert_eq!(count_nodes(&root), 3);

    let node_a = root.child("Category").unwrap();
    assert_eq!(node_a.field_text("Name"), Some("A"));
    assert_eq!(node_a.child("Products").unwrap().children.len(), 1);

    let l_subs: Vec<&SpecElement> = node_a
        .child("SubCategories")
        .unwrap()
        .children_named("Category")
        .collect();
    assert_eq!(l_subs.len(), 2);
    assert_eq!(l_subs[0].field_text("Name"), Some("B"));
    assert!(l_subs[0].child("Products").unwrap().children.is_empty());
    assert_eq!(l_subs[1].field_text("Name"), Some("C"));
    assert_eq!(
        l_subs[1].child("Products").unwrap().children[0].field_text("ProductId"),
        Some("30")
    );

    let c_xml = encode_document(&root).unwrap();
    assert!(!c_xml.contains("<ProductId>20</ProductId>"));
    assert!(c_xml.contains("<ProductId>30</ProductId>"));
    assert_eq!(c_xml.matches("<Category>").count(), 3);
}
