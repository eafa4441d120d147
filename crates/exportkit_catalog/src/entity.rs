//! Catalog entities consumed by the exporter, and the lookup collaborator.
//!
//! Entities are plain data already loaded by the host; the exporter only
//! reads them. Ids of `0` mean "not set", the way the storage layer keeps them.

use chrono::NaiveDateTime;

use crate::conf::TUP_VALIDATED_CONTROL_TYPE_IDS;

////////////////////////////////////////////////////////////////////////////////
// #region Catalog

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_template_id: i64,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub meta_title: Option<String>,
    pub se_name: String,
    /// `0` marks a top-level category.
    pub parent_category_id: i64,
    pub picture_id: i64,
    pub page_size: i32,
    pub allow_customers_to_select_page_size: bool,
    pub page_size_options: Option<String>,
    pub price_ranges: Option<String>,
    pub show_on_home_page: bool,
    pub include_in_top_menu: bool,
    pub published: bool,
    pub deleted: bool,
    pub display_order: i32,
    pub created_on_utc: NaiveDateTime,
    pub updated_on_utc: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub manufacturer_template_id: i64,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub meta_title: Option<String>,
    pub se_name: String,
    pub picture_id: i64,
    pub page_size: i32,
    pub allow_customers_to_select_page_size: bool,
    pub page_size_options: Option<String>,
    pub price_ranges: Option<String>,
    pub published: bool,
    pub deleted: bool,
    pub display_order: i32,
    pub created_on_utc: NaiveDateTime,
    pub updated_on_utc: NaiveDateTime,
}

/// Product linked to a category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductCategoryLink {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub is_featured_product: bool,
    pub display_order: i32,
    /// The linked product is deleted or gone.
    pub if_product_deleted: bool,
}

/// Product linked to a manufacturer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductManufacturerLink {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub is_featured_product: bool,
    pub display_order: i32,
    pub if_product_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Product {
    pub id: i64,
    pub product_type_id: i64,
    pub parent_grouped_product_id: i64,
    pub visible_individually: bool,
    pub name: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub admin_comment: Option<String>,
    pub vendor_id: i64,
    pub product_template_id: i64,
    pub show_on_home_page: bool,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub meta_title: Option<String>,
    pub se_name: String,
    pub allow_customer_reviews: bool,
    pub published: bool,
    pub sku: Option<String>,
    pub manufacturer_part_number: Option<String>,
    pub gtin: Option<String>,
    pub is_gift_card: bool,
    pub gift_card_type_id: i64,
    pub overridden_gift_card_amount: Option<f64>,
    pub require_other_products: bool,
    /// Comma-separated product ids.
    pub required_product_ids: Option<String>,
    pub automatically_add_required_products: bool,
    pub is_download: bool,
    pub download_id: i64,
    pub unlimited_downloads: bool,
    pub max_number_of_downloads: i32,
    pub download_expiration_days: Option<i32>,
    pub download_activation_type_id: i64,
    pub has_sample_download: bool,
    pub sample_download_id: i64,
    pub has_user_agreement: bool,
    pub user_agreement_text: Option<String>,
    pub is_recurring: bool,
    pub recurring_cycle_length: i32,
    pub recurring_cycle_period_id: i64,
    pub recurring_total_cycles: i32,
    pub is_rental: bool,
    pub rental_price_length: i32,
    pub rental_price_period_id: i64,
    pub is_ship_enabled: bool,
    pub is_free_shipping: bool,
    pub ship_separately: bool,
    pub additional_shipping_charge: f64,
    pub delivery_date_id: i64,
    pub is_tax_exempt: bool,
    pub tax_category_id: i64,
    pub is_telecommunications_or_broadcasting_or_electronic_services: bool,
    pub manage_inventory_method_id: i64,
    pub use_multiple_warehouses: bool,
    pub warehouse_id: i64,
    pub stock_quantity: i32,
    pub display_stock_availability: bool,
    pub display_stock_quantity: bool,
    pub min_stock_quantity: i32,
    pub low_stock_activity_id: i64,
    pub notify_admin_for_quantity_below: i32,
    pub backorder_mode_id: i64,
    pub allow_back_in_stock_subscriptions: bool,
    pub order_minimum_quantity: i32,
    pub order_maximum_quantity: i32,
    /// Comma-separated quantities offered instead of a free entry box.
    pub allowed_quantities: Option<String>,
    pub allow_adding_only_existing_attribute_combinations: bool,
    pub not_returnable: bool,
    pub disable_buy_button: bool,
    pub disable_wishlist_button: bool,
    pub available_for_pre_order: bool,
    pub pre_order_availability_start_date_time_utc: Option<NaiveDateTime>,
    pub call_for_price: bool,
    pub price: f64,
    pub old_price: f64,
    pub product_cost: f64,
    pub special_price: Option<f64>,
    pub special_price_start_date_time_utc: Option<NaiveDateTime>,
    pub special_price_end_date_time_utc: Option<NaiveDateTime>,
    pub customer_enters_price: bool,
    pub minimum_customer_entered_price: f64,
    pub maximum_customer_entered_price: f64,
    pub basepricing_enabled: bool,
    pub baseprice_amount: f64,
    pub baseprice_unit_id: i64,
    pub baseprice_base_amount: f64,
    pub baseprice_base_unit_id: i64,
    pub mark_as_new: bool,
    pub mark_as_new_start_date_time_utc: Option<NaiveDateTime>,
    pub mark_as_new_end_date_time_utc: Option<NaiveDateTime>,
    pub weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub deleted: bool,
    pub created_on_utc: NaiveDateTime,
    pub updated_on_utc: NaiveDateTime,
    pub tags: Vec<ProductTag>,
    pub discounts: Vec<ProductDiscount>,
    pub tier_prices: Vec<TierPrice>,
    pub pictures: Vec<ProductPicture>,
    pub specification_attributes: Vec<ProductSpecificationAttribute>,
    pub attribute_mappings: Vec<ProductAttributeMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductTag {
    pub id: i64,
    pub name: String,
}

/// Discount applied to a product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDiscount {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TierPrice {
    pub id: i64,
    /// `0` applies to every store.
    pub store_id: i64,
    /// `None` applies to every customer role.
    pub customer_role_id: Option<i64>,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPicture {
    pub id: i64,
    pub picture_id: i64,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductSpecificationAttribute {
    pub id: i64,
    pub specification_attribute_option_id: i64,
    pub custom_value: Option<String>,
    pub allow_filtering: bool,
    pub show_on_product_page: bool,
    pub display_order: i32,
}

/// Category membership of a product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductCategoryMapping {
    pub id: i64,
    pub category_id: i64,
    pub is_featured_product: bool,
    pub display_order: i32,
}

/// Manufacturer membership of a product.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductManufacturerMapping {
    pub id: i64,
    pub manufacturer_id: i64,
    pub is_featured_product: bool,
    pub display_order: i32,
}

/// Attribute attached to a product, with its selectable values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductAttributeMapping {
    pub id: i64,
    pub attribute_id: i64,
    pub attribute_name: String,
    pub text_prompt: Option<String>,
    pub is_required: bool,
    pub attribute_control_type_id: i64,
    pub display_order: i32,
    pub validation_min_length: Option<i32>,
    pub validation_max_length: Option<i32>,
    pub validation_file_allowed_extensions: Option<String>,
    /// Kilobytes.
    pub validation_file_maximum_size: Option<i32>,
    pub default_value: Option<String>,
    /// Serialized condition on other attributes of the same product.
    pub condition_attribute_xml: Option<String>,
    pub values: Vec<ProductAttributeValue>,
}

impl ProductAttributeMapping {
    /// Whether the control type takes validation rules (length, file limits).
    pub fn allows_validation_rules(&self) -> bool {
        TUP_VALIDATED_CONTROL_TYPE_IDS.contains(&self.attribute_control_type_id)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductAttributeValue {
    pub id: i64,
    pub name: String,
    pub attribute_value_type_id: i64,
    pub associated_product_id: i64,
    pub color_squares_rgb: Option<String>,
    pub image_squares_picture_id: i64,
    pub price_adjustment: f64,
    pub weight_adjustment: f64,
    pub cost: f64,
    pub customer_enters_qty: bool,
    pub quantity: i32,
    pub is_pre_selected: bool,
    pub display_order: i32,
    pub picture_id: i64,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Sales

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub state_province: Option<String>,
    pub city: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zip_postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub fax_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderItem {
    pub id: i64,
    pub order_item_guid: String,
    pub product_id: i64,
    pub product_name: String,
    pub sku: Option<String>,
    pub unit_price_incl_tax: f64,
    pub unit_price_excl_tax: f64,
    pub quantity: i32,
    pub discount_amount_incl_tax: f64,
    pub discount_amount_excl_tax: f64,
    pub price_incl_tax: f64,
    pub price_excl_tax: f64,
    pub attribute_description: Option<String>,
    pub download_count: i32,
    pub is_download_activated: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shipment {
    pub id: i64,
    pub tracking_number: Option<String>,
    pub total_weight: Option<f64>,
    pub shipped_date_utc: Option<NaiveDateTime>,
    pub delivery_date_utc: Option<NaiveDateTime>,
    pub created_on_utc: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Order {
    pub id: i64,
    pub order_guid: String,
    pub store_id: i64,
    pub customer_id: i64,
    pub order_status_id: i64,
    pub payment_status_id: i64,
    pub shipping_status_id: i64,
    pub customer_language_id: i64,
    pub customer_tax_display_type_id: i64,
    pub customer_ip: Option<String>,
    pub order_subtotal_incl_tax: f64,
    pub order_subtotal_excl_tax: f64,
    pub order_sub_total_discount_incl_tax: f64,
    pub order_sub_total_discount_excl_tax: f64,
    pub order_shipping_incl_tax: f64,
    pub order_shipping_excl_tax: f64,
    pub payment_method_additional_fee_incl_tax: f64,
    pub payment_method_additional_fee_excl_tax: f64,
    pub tax_rates: Option<String>,
    pub order_tax: f64,
    pub order_total: f64,
    pub refunded_amount: f64,
    pub order_discount: f64,
    pub currency_rate: f64,
    pub customer_currency_code: String,
    pub affiliate_id: i64,
    pub allow_storing_credit_card_number: bool,
    pub payment_method_system_name: Option<String>,
    pub shipping_method: Option<String>,
    pub shipping_rate_computation_method_system_name: Option<String>,
    pub pick_up_in_store: bool,
    pub custom_values_xml: Option<String>,
    pub vat_number: Option<String>,
    pub paid_date_utc: Option<NaiveDateTime>,
    pub deleted: bool,
    pub created_on_utc: NaiveDateTime,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub items: Vec<OrderItem>,
    pub shipments: Vec<Shipment>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Customers

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Customer {
    pub id: i64,
    pub customer_guid: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub is_tax_exempt: bool,
    pub affiliate_id: i64,
    pub vendor_id: i64,
    pub active: bool,
    pub is_guest: bool,
    pub is_registered: bool,
    pub is_administrator: bool,
    pub is_forum_moderator: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub company: Option<String>,
    pub street_address: Option<String>,
    pub street_address2: Option<String>,
    pub zip_postal_code: Option<String>,
    pub city: Option<String>,
    pub country_id: i64,
    pub state_province_id: i64,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub vat_number: Option<String>,
    pub vat_number_status_id: i64,
    pub time_zone_id: Option<String>,
    pub avatar_picture_id: i64,
    pub forum_post_count: i32,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewsLetterSubscription {
    pub email: String,
    pub active: bool,
    pub store_id: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateProvince {
    pub country_two_letter_iso_code: String,
    pub name: String,
    pub abbreviation: Option<String>,
    pub published: bool,
    pub display_order: i32,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Source

/// Lookup tables offered as dropdowns on product sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumLookupKind {
    Vendor,
    ProductTemplate,
    TaxCategory,
    DeliveryDate,
    MeasureWeight,
    Warehouse,
}

/// Read access to catalog data that records only reference by id.
pub trait CatalogSource {
    /// Product links of one category, in display order.
    fn product_category_links(&self, category_id: i64) -> Vec<ProductCategoryLink>;

    /// Product links of one manufacturer, in display order.
    fn product_manufacturer_links(&self, manufacturer_id: i64) -> Vec<ProductManufacturerLink>;

    /// Category memberships of a product, in display order.
    fn product_category_mappings(&self, product_id: i64) -> Vec<ProductCategoryMapping>;

    /// Manufacturer memberships of a product, in display order.
    fn product_manufacturer_mappings(&self, product_id: i64) -> Vec<ProductManufacturerMapping>;

    /// Names of the categories a product belongs to.
    fn category_names_of_product(&self, product_id: i64) -> Vec<String>;

    /// Names of the manufacturers a product belongs to.
    fn manufacturer_names_of_product(&self, product_id: i64) -> Vec<String>;

    /// First `n_max` picture ids of a product, in display order.
    fn picture_ids_of_product(&self, product_id: i64, n_max: usize) -> Vec<i64>;

    /// Local thumbnail path of a picture; `None` when the picture is missing.
    fn thumb_path(&self, picture_id: i64) -> Option<String>;

    /// `(id, name)` pairs of a lookup table.
    fn lookup_domain(&self, kind: EnumLookupKind) -> Vec<(i64, String)>;

    /// Ids of every store.
    fn store_ids(&self) -> Vec<i64>;

    /// Newsletter subscription of `email` in one store.
    fn newsletter_subscription(&self, email: &str, store_id: i64) -> Option<NewsLetterSubscription>;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rules_follow_control_type() {
        let mut mapping = ProductAttributeMapping {
            attribute_control_type_id: 1,
            ..Default::default()
        };
        assert!(!mapping.allows_validation_rules());
        for n_type in [4, 10, 30] {
            mapping.attribute_control_type_id = n_type;
            assert!(mapping.allows_validation_rules());
        }
    }
}
