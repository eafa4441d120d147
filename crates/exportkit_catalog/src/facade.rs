//! Entry points that turn catalog entities into export payloads.
//!
//! Each call resolves its field set once, streams the records through the
//! matching writer and returns the finished bytes or text. Nothing is kept
//! between calls, so one exporter may serve any number of exports.

use std::collections::{BTreeMap, BTreeSet};

use exportkit_io_xlsx::{
    SpecDocument, SpecModeFlags, SpecValueDomain, SpecXlsxWriteOptions, XlsxEncoder,
    resolve_fields, write_master_detail_records, write_records,
};
use exportkit_io_xml::{HierarchicalTreeSerializer, SpecElement, SpecTreeLayout, encode_document};

use crate::conf::{
    C_SHEET_NAME_CATEGORY, C_SHEET_NAME_CUSTOMER, C_SHEET_NAME_MANUFACTURER, C_SHEET_NAME_ORDER,
    C_SHEET_NAME_PRODUCT, C_TOGGLE_MANUFACTURERS, N_PRODUCT_PICTURES_MAX,
};
use crate::entity::{
    CatalogSource, Category, Customer, EnumLookupKind, Manufacturer, NewsLetterSubscription,
    Order, Product, StateProvince,
};
use crate::fields::{
    SpecCatalogRow, SpecProductLookupDomains, derive_category_fields, derive_customer_fields,
    derive_manufacturer_fields, derive_order_fields, derive_product_attribute_fields,
    derive_product_fields, flatten_attribute_rows, join_names,
};
use crate::markup::{
    build_customer_element, build_manufacturer_element, build_order_element, build_product_element,
};
use crate::spec::{CatalogExportError, SpecExportSettings};

/// Catalog export facade over a [`CatalogSource`].
#[derive(Debug)]
pub struct CatalogExporter<'a, S: ?Sized> {
    source: &'a S,
    settings: SpecExportSettings,
    encoder: XlsxEncoder,
}

impl<'a, S: CatalogSource + ?Sized> CatalogExporter<'a, S> {
    pub fn new(source: &'a S, settings: SpecExportSettings) -> Self {
        Self {
            source,
            settings,
            encoder: XlsxEncoder::default(),
        }
    }

    /// Replace the workbook encoder (formats, autofit).
    pub fn with_encoder(mut self, encoder: XlsxEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn settings(&self) -> &SpecExportSettings {
        &self.settings
    }

    fn write_options(&self) -> SpecXlsxWriteOptions {
        SpecXlsxWriteOptions {
            if_use_dropdown_lists: self.settings.if_use_dropdown_lists,
            ..Default::default()
        }
    }

    fn resolve_thumb_path(&self, picture_id: i64) -> Option<String> {
        if picture_id == 0 {
            return None;
        }
        self.source.thumb_path(picture_id)
    }

    fn resolve_picture_row<'r, E>(&self, record: &'r E, picture_id: i64) -> SpecCatalogRow<'r, E> {
        let mut row = SpecCatalogRow::new(record);
        row.l_picture_paths = vec![self.resolve_thumb_path(picture_id)];
        row
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Tabular

    /// Category sheet, one row per category in the given order.
    pub fn build_categories_document(
        &self,
        categories: &[Category],
    ) -> Result<SpecDocument, CatalogExportError> {
        let fields = resolve_fields(derive_category_fields(), &SpecModeFlags::default())?;
        let rows = categories
            .iter()
            .map(|category| self.resolve_picture_row(category, category.picture_id));
        let doc = write_records(C_SHEET_NAME_CATEGORY, &fields, rows, &self.write_options())?;
        Ok(doc)
    }

    pub fn export_categories_to_xlsx(
        &self,
        categories: &[Category],
    ) -> Result<Vec<u8>, CatalogExportError> {
        let doc = self.build_categories_document(categories)?;
        Ok(self.encoder.encode(&doc)?)
    }

    pub fn build_manufacturers_document(
        &self,
        manufacturers: &[Manufacturer],
    ) -> Result<SpecDocument, CatalogExportError> {
        let fields = resolve_fields(derive_manufacturer_fields(), &SpecModeFlags::default())?;
        let rows = manufacturers
            .iter()
            .map(|manufacturer| self.resolve_picture_row(manufacturer, manufacturer.picture_id));
        let doc = write_records(C_SHEET_NAME_MANUFACTURER, &fields, rows, &self.write_options())?;
        Ok(doc)
    }

    pub fn export_manufacturers_to_xlsx(
        &self,
        manufacturers: &[Manufacturer],
    ) -> Result<Vec<u8>, CatalogExportError> {
        let doc = self.build_manufacturers_document(manufacturers)?;
        Ok(self.encoder.encode(&doc)?)
    }

    fn load_product_lookups(&self) -> SpecProductLookupDomains {
        if !self.settings.if_use_dropdown_lists {
            return SpecProductLookupDomains::default();
        }
        let load = |kind| SpecValueDomain::new(self.source.lookup_domain(kind));
        SpecProductLookupDomains {
            vendors: load(EnumLookupKind::Vendor),
            product_templates: load(EnumLookupKind::ProductTemplate),
            tax_categories: load(EnumLookupKind::TaxCategory),
            delivery_dates: load(EnumLookupKind::DeliveryDate),
            measure_weights: load(EnumLookupKind::MeasureWeight),
            warehouses: load(EnumLookupKind::Warehouse),
        }
    }

    fn resolve_product_row<'r>(
        &self,
        product: &'r Product,
        if_categories: bool,
        if_manufacturers: bool,
    ) -> SpecCatalogRow<'r, Product> {
        let mut row = SpecCatalogRow::new(product);
        row.l_picture_paths = self
            .source
            .picture_ids_of_product(product.id, N_PRODUCT_PICTURES_MAX)
            .into_iter()
            .map(|picture_id| self.resolve_thumb_path(picture_id))
            .collect();
        if if_categories {
            row.category_names = join_names(&self.source.category_names_of_product(product.id));
        }
        if if_manufacturers {
            row.manufacturer_names =
                join_names(&self.source.manufacturer_names_of_product(product.id));
        }
        row
    }

    /// Product sheet.
    ///
    /// Toggled columns follow the product editor settings. When attributes
    /// are exported, each product row is followed by its collapsed attribute
    /// block.
    pub fn build_products_document(
        &self,
        products: &[Product],
    ) -> Result<SpecDocument, CatalogExportError> {
        let flags = self.settings.mode_flags();
        let fields = resolve_fields(derive_product_fields(&self.load_product_lookups()), &flags)?;
        let if_categories = fields.position("Categories").is_some();
        let if_manufacturers = fields.position("Manufacturers").is_some();

        let options = self.write_options();
        let doc = if self.settings.is_product_attributes_exported() {
            let details = resolve_fields(derive_product_attribute_fields(), &flags)?;
            let blocks = products
                .iter()
                .map(|product| {
                    (
                        self.resolve_product_row(product, if_categories, if_manufacturers),
                        flatten_attribute_rows(product),
                    )
                });
            write_master_detail_records(C_SHEET_NAME_PRODUCT, &fields, &details, blocks, &options)?
        } else {
            write_records(
                C_SHEET_NAME_PRODUCT,
                &fields,
                products.iter().map(|product| {
                    self.resolve_product_row(product, if_categories, if_manufacturers)
                }),
                &options,
            )?
        };
        Ok(doc)
    }

    pub fn export_products_to_xlsx(
        &self,
        products: &[Product],
    ) -> Result<Vec<u8>, CatalogExportError> {
        let doc = self.build_products_document(products)?;
        Ok(self.encoder.encode(&doc)?)
    }

    pub fn build_orders_document(
        &self,
        orders: &[Order],
    ) -> Result<SpecDocument, CatalogExportError> {
        let fields = resolve_fields(derive_order_fields(), &SpecModeFlags::default())?;
        let doc = write_records(C_SHEET_NAME_ORDER, &fields, orders, &self.write_options())?;
        Ok(doc)
    }

    pub fn export_orders_to_xlsx(&self, orders: &[Order]) -> Result<Vec<u8>, CatalogExportError> {
        let doc = self.build_orders_document(orders)?;
        Ok(self.encoder.encode(&doc)?)
    }

    pub fn build_customers_document(
        &self,
        customers: &[Customer],
    ) -> Result<SpecDocument, CatalogExportError> {
        let fields = resolve_fields(derive_customer_fields(), &SpecModeFlags::default())?;
        let doc = write_records(C_SHEET_NAME_CUSTOMER, &fields, customers, &self.write_options())?;
        Ok(doc)
    }

    pub fn export_customers_to_xlsx(
        &self,
        customers: &[Customer],
    ) -> Result<Vec<u8>, CatalogExportError> {
        let doc = self.build_customers_document(customers)?;
        Ok(self.encoder.encode(&doc)?)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Markup

    /// Category forest as a `Categories` document.
    ///
    /// Deleted categories and their descendants are left out; children keep
    /// display order, then id.
    pub fn build_categories_element(
        &self,
        categories: &[Category],
    ) -> Result<SpecElement, CatalogExportError> {
        let mut l_live = exclude_deleted_subtrees(categories);
        l_live.sort_by_key(|category| (category.display_order, category.id));

        let layout = SpecTreeLayout::new(
            "Categories",
            "Category",
            "Products",
            "ProductCategory",
            "SubCategories",
        )
        .with_root_attribute("Version", self.settings.version_or_default());
        let root = HierarchicalTreeSerializer::new(&layout, &l_live)?
            .serialize(|category: &&Category| self.source.product_category_links(category.id));

        tracing::info!(
            n_categories = l_live.len(),
            n_excluded = categories.len() - l_live.len(),
            "Exported categories to markup"
        );
        Ok(root)
    }

    pub fn export_categories_to_xml(
        &self,
        categories: &[Category],
    ) -> Result<String, CatalogExportError> {
        let root = self.build_categories_element(categories)?;
        Ok(encode_document(&root)?)
    }

    pub fn build_manufacturers_element(&self, manufacturers: &[Manufacturer]) -> SpecElement {
        let mut root = SpecElement::new("Manufacturers")
            .with_attribute("Version", self.settings.version_or_default());
        for manufacturer in manufacturers {
            let links = self.source.product_manufacturer_links(manufacturer.id);
            root.push_child(build_manufacturer_element(manufacturer, &links));
        }
        tracing::info!(
            n_manufacturers = manufacturers.len(),
            "Exported manufacturers to markup"
        );
        root
    }

    pub fn export_manufacturers_to_xml(
        &self,
        manufacturers: &[Manufacturer],
    ) -> Result<String, CatalogExportError> {
        let root = self.build_manufacturers_element(manufacturers);
        Ok(encode_document(&root)?)
    }

    /// `Products` document; editor toggles gate scalar fields and groups.
    pub fn build_products_element(&self, products: &[Product]) -> SpecElement {
        let flags = self.settings.mode_flags();
        let if_manufacturers = flags.is_toggle_on(C_TOGGLE_MANUFACTURERS);
        let mut root = SpecElement::new("Products")
            .with_attribute("Version", self.settings.version_or_default());
        for product in products {
            let categories = self.source.product_category_mappings(product.id);
            let manufacturers = if if_manufacturers {
                self.source.product_manufacturer_mappings(product.id)
            } else {
                Vec::new()
            };
            root.push_child(build_product_element(
                product,
                &flags,
                &categories,
                &manufacturers,
            ));
        }
        tracing::info!(n_products = products.len(), "Exported products to markup");
        root
    }

    pub fn export_products_to_xml(
        &self,
        products: &[Product],
    ) -> Result<String, CatalogExportError> {
        let root = self.build_products_element(products);
        Ok(encode_document(&root)?)
    }

    pub fn build_orders_element(&self, orders: &[Order]) -> SpecElement {
        let mut root = SpecElement::new("Orders")
            .with_attribute("Version", self.settings.version_or_default());
        for order in orders {
            root.push_child(build_order_element(order));
        }
        tracing::info!(n_orders = orders.len(), "Exported orders to markup");
        root
    }

    pub fn export_orders_to_xml(&self, orders: &[Order]) -> Result<String, CatalogExportError> {
        let root = self.build_orders_element(orders);
        Ok(encode_document(&root)?)
    }

    /// `Customers` document with per-store newsletter flags.
    pub fn build_customers_element(&self, customers: &[Customer]) -> SpecElement {
        let l_store_ids = self.source.store_ids();
        let mut root = SpecElement::new("Customers")
            .with_attribute("Version", self.settings.version_or_default());
        for customer in customers {
            let l_newsletter: Vec<(i64, bool)> = l_store_ids
                .iter()
                .map(|&n_store_id| (n_store_id, self.is_subscribed(customer, n_store_id)))
                .collect();
            root.push_child(build_customer_element(customer, &l_newsletter));
        }
        tracing::info!(
            n_customers = customers.len(),
            n_stores = l_store_ids.len(),
            "Exported customers to markup"
        );
        root
    }

    pub fn export_customers_to_xml(
        &self,
        customers: &[Customer],
    ) -> Result<String, CatalogExportError> {
        let root = self.build_customers_element(customers);
        Ok(encode_document(&root)?)
    }

    /// Active subscription of the customer's email in `store_id`.
    fn is_subscribed(&self, customer: &Customer, store_id: i64) -> bool {
        customer
            .email
            .as_deref()
            .and_then(|c_email| self.source.newsletter_subscription(c_email, store_id))
            .is_some_and(|subscription| subscription.active)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Text

    /// One `email,active,storeId` line per subscription.
    pub fn export_newsletter_subscribers_to_txt(
        &self,
        subscriptions: &[NewsLetterSubscription],
    ) -> String {
        let mut c_out = String::new();
        for subscription in subscriptions {
            c_out.push_str(&format!(
                "{},{},{}\n",
                subscription.email,
                format_bool(subscription.active),
                subscription.store_id
            ));
        }
        tracing::info!(n_lines = subscriptions.len(), "Exported newsletter subscribers");
        c_out
    }

    /// One `countryIso,name,abbr,published,displayOrder` line per state.
    pub fn export_states_to_txt(&self, states: &[StateProvince]) -> String {
        let mut c_out = String::new();
        for state in states {
            c_out.push_str(&format!(
                "{},{},{},{},{}\n",
                state.country_two_letter_iso_code,
                state.name,
                state.abbreviation.as_deref().unwrap_or_default(),
                format_bool(state.published),
                state.display_order
            ));
        }
        tracing::info!(n_lines = states.len(), "Exported states");
        c_out
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
}

fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Categories that are neither deleted nor below a deleted category.
fn exclude_deleted_subtrees(categories: &[Category]) -> Vec<&Category> {
    let mut dict_children: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for category in categories {
        dict_children
            .entry(category.parent_category_id)
            .or_default()
            .push(category.id);
    }

    let mut set_excluded = BTreeSet::new();
    let mut l_pending: Vec<i64> = categories
        .iter()
        .filter(|category| category.deleted)
        .map(|category| category.id)
        .collect();
    while let Some(n_id) = l_pending.pop() {
        if !set_excluded.insert(n_id) {
            continue;
        }
        if let Some(l_children) = dict_children.get(&n_id) {
            l_pending.extend_from_slice(l_children);
        }
    }

    categories
        .iter()
        .filter(|category| !set_excluded.contains(&category.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(n_id: i64, n_parent: i64, if_deleted: bool) -> Category {
        Category {
            id: n_id,
            parent_category_id: n_parent,
            deleted: if_deleted,
            ..Default::default()
        }
    }

    #[test]
    fn test_deleted_subtree_is_excluded() {
        let categories = vec![
            category(1, 0, false),
            category(2, 1, true),
            category(3, 2, false),
            category(4, 3, false),
            category(5, 1, false),
        ];
        let l_ids: Vec<i64> = exclude_deleted_subtrees(&categories)
            .iter()
            .map(|category| category.id)
            .collect();
        assert_eq!(l_ids, vec![1, 5]);
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(format_bool(true), "True");
        assert_eq!(format_bool(false), "False");
    }
}
