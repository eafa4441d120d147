//! Column descriptors of every catalog sheet.
//!
//! Records that need lookups through [`CatalogSource`](crate::entity::CatalogSource)
//! are wrapped in [`SpecCatalogRow`] first, so accessors stay plain functions
//! of one row.

use exportkit_io_xlsx::{SpecFieldDescriptor, SpecValueDomain};

use crate::conf::*;
use crate::entity::{
    Address, Category, Customer, Manufacturer, Order, Product, ProductAttributeMapping,
    ProductAttributeValue,
};

////////////////////////////////////////////////////////////////////////////////
// #region Rows

/// Record plus the values resolved for it through the catalog source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCatalogRow<'r, E> {
    pub record: &'r E,
    /// Thumbnail paths, one per picture column.
    pub l_picture_paths: Vec<Option<String>>,
    /// Joined category names.
    pub category_names: Option<String>,
    /// Joined manufacturer names.
    pub manufacturer_names: Option<String>,
}

impl<'r, E> SpecCatalogRow<'r, E> {
    pub fn new(record: &'r E) -> Self {
        Self {
            record,
            l_picture_paths: Vec::new(),
            category_names: None,
            manufacturer_names: None,
        }
    }

    fn picture_path(&self, n_idx: usize) -> Option<String> {
        self.l_picture_paths.get(n_idx).cloned().flatten()
    }
}

/// One attribute detail row: a mapping, and one of its values if it has any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecProductAttributeRow<'r> {
    pub mapping: &'r ProductAttributeMapping,
    pub value: Option<&'r ProductAttributeValue>,
}

/// Detail rows of one product: every value of every mapping first, then one
/// row per mapping that has no values.
pub fn flatten_attribute_rows(product: &Product) -> Vec<SpecProductAttributeRow<'_>> {
    let mut l_rows: Vec<SpecProductAttributeRow<'_>> = product
        .attribute_mappings
        .iter()
        .flat_map(|mapping| {
            mapping.values.iter().map(move |value| SpecProductAttributeRow {
                mapping,
                value: Some(value),
            })
        })
        .collect();
    l_rows.extend(
        product
            .attribute_mappings
            .iter()
            .filter(|mapping| mapping.values.is_empty())
            .map(|mapping| SpecProductAttributeRow {
                mapping,
                value: None,
            }),
    );
    l_rows
}

/// Join names with the list separator; `None` when there are none.
pub fn join_names(l_names: &[String]) -> Option<String> {
    if l_names.is_empty() {
        return None;
    }
    Some(l_names.join(C_NAME_LIST_SEPARATOR))
}

/// Unset lookup ids (`0`) export as blank cells.
fn derive_optional_id(n_id: i64) -> Option<i64> {
    (n_id != 0).then_some(n_id)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Categories

type CategoryRow<'r> = SpecCatalogRow<'r, Category>;

pub fn derive_category_fields<'r>() -> Vec<SpecFieldDescriptor<CategoryRow<'r>>> {
    vec![
        SpecFieldDescriptor::new("Id", |row: &CategoryRow<'r>| row.record.id),
        SpecFieldDescriptor::new("Name", |row: &CategoryRow<'r>| row.record.name.clone()),
        SpecFieldDescriptor::new("Description", |row: &CategoryRow<'r>| {
            row.record.description.clone()
        }),
        SpecFieldDescriptor::new("CategoryTemplateId", |row: &CategoryRow<'r>| {
            row.record.category_template_id
        }),
        SpecFieldDescriptor::new("MetaKeywords", |row: &CategoryRow<'r>| {
            row.record.meta_keywords.clone()
        }),
        SpecFieldDescriptor::new("MetaDescription", |row: &CategoryRow<'r>| {
            row.record.meta_description.clone()
        }),
        SpecFieldDescriptor::new("MetaTitle", |row: &CategoryRow<'r>| {
            row.record.meta_title.clone()
        }),
        SpecFieldDescriptor::new("SeName", |row: &CategoryRow<'r>| row.record.se_name.clone()),
        SpecFieldDescriptor::new("ParentCategoryId", |row: &CategoryRow<'r>| {
            row.record.parent_category_id
        }),
        SpecFieldDescriptor::new("Picture", |row: &CategoryRow<'r>| row.picture_path(0)),
        SpecFieldDescriptor::new("PageSize", |row: &CategoryRow<'r>| row.record.page_size),
        SpecFieldDescriptor::new("AllowCustomersToSelectPageSize", |row: &CategoryRow<'r>| {
            row.record.allow_customers_to_select_page_size
        }),
        SpecFieldDescriptor::new("PageSizeOptions", |row: &CategoryRow<'r>| {
            row.record.page_size_options.clone()
        }),
        SpecFieldDescriptor::new("PriceRanges", |row: &CategoryRow<'r>| {
            row.record.price_ranges.clone()
        }),
        SpecFieldDescriptor::new("ShowOnHomePage", |row: &CategoryRow<'r>| {
            row.record.show_on_home_page
        }),
        SpecFieldDescriptor::new("IncludeInTopMenu", |row: &CategoryRow<'r>| {
            row.record.include_in_top_menu
        }),
        SpecFieldDescriptor::new("Published", |row: &CategoryRow<'r>| row.record.published),
        SpecFieldDescriptor::new("DisplayOrder", |row: &CategoryRow<'r>| {
            row.record.display_order
        }),
    ]
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Manufacturers

type ManufacturerRow<'r> = SpecCatalogRow<'r, Manufacturer>;

pub fn derive_manufacturer_fields<'r>() -> Vec<SpecFieldDescriptor<ManufacturerRow<'r>>> {
    vec![
        SpecFieldDescriptor::new("Id", |row: &ManufacturerRow<'r>| row.record.id),
        SpecFieldDescriptor::new("Name", |row: &ManufacturerRow<'r>| row.record.name.clone()),
        SpecFieldDescriptor::new("Description", |row: &ManufacturerRow<'r>| {
            row.record.description.clone()
        }),
        SpecFieldDescriptor::new("ManufacturerTemplateId", |row: &ManufacturerRow<'r>| {
            row.record.manufacturer_template_id
        }),
        SpecFieldDescriptor::new("MetaKeywords", |row: &ManufacturerRow<'r>| {
            row.record.meta_keywords.clone()
        }),
        SpecFieldDescriptor::new("MetaDescription", |row: &ManufacturerRow<'r>| {
            row.record.meta_description.clone()
        }),
        SpecFieldDescriptor::new("MetaTitle", |row: &ManufacturerRow<'r>| {
            row.record.meta_title.clone()
        }),
        SpecFieldDescriptor::new("SeName", |row: &ManufacturerRow<'r>| {
            row.record.se_name.clone()
        }),
        SpecFieldDescriptor::new("Picture", |row: &ManufacturerRow<'r>| row.picture_path(0)),
        SpecFieldDescriptor::new("PageSize", |row: &ManufacturerRow<'r>| row.record.page_size),
        SpecFieldDescriptor::new("AllowCustomersToSelectPageSize", |row: &ManufacturerRow<'r>| {
            row.record.allow_customers_to_select_page_size
        }),
        SpecFieldDescriptor::new("PageSizeOptions", |row: &ManufacturerRow<'r>| {
            row.record.page_size_options.clone()
        }),
        SpecFieldDescriptor::new("PriceRanges", |row: &ManufacturerRow<'r>| {
            row.record.price_ranges.clone()
        }),
        SpecFieldDescriptor::new("Published", |row: &ManufacturerRow<'r>| {
            row.record.published
        }),
        SpecFieldDescriptor::new("DisplayOrder", |row: &ManufacturerRow<'r>| {
            row.record.display_order
        }),
    ]
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Products

type ProductRow<'r> = SpecCatalogRow<'r, Product>;

/// Lookup-table domains offered on product sheets.
#[derive(Debug, Clone, Default)]
pub struct SpecProductLookupDomains {
    pub vendors: SpecValueDomain,
    pub product_templates: SpecValueDomain,
    pub tax_categories: SpecValueDomain,
    pub delivery_dates: SpecValueDomain,
    pub measure_weights: SpecValueDomain,
    pub warehouses: SpecValueDomain,
}

/// Product master columns; toggled fields follow the product editor settings.
pub fn derive_product_fields<'r>(
    lookups: &SpecProductLookupDomains,
) -> Vec<SpecFieldDescriptor<ProductRow<'r>>> {
    let mut l_fields = vec![
        SpecFieldDescriptor::new("ProductType", |row: &ProductRow<'r>| {
            row.record.product_type_id
        })
        .with_toggle(C_TOGGLE_PRODUCT_TYPE)
        .with_domain(derive_product_type_domain()),
        SpecFieldDescriptor::new("ParentGroupedProductId", |row: &ProductRow<'r>| {
            row.record.parent_grouped_product_id
        })
        .with_toggle(C_TOGGLE_PRODUCT_TYPE),
        SpecFieldDescriptor::new("VisibleIndividually", |row: &ProductRow<'r>| {
            row.record.visible_individually
        })
        .with_toggle(C_TOGGLE_VISIBLE_INDIVIDUALLY),
        SpecFieldDescriptor::new("Name", |row: &ProductRow<'r>| row.record.name.clone()),
        SpecFieldDescriptor::new("ShortDescription", |row: &ProductRow<'r>| {
            row.record.short_description.clone()
        }),
        SpecFieldDescriptor::new("FullDescription", |row: &ProductRow<'r>| {
            row.record.full_description.clone()
        }),
        SpecFieldDescriptor::new("Vendor", |row: &ProductRow<'r>| {
            derive_optional_id(row.record.vendor_id)
        })
        .with_toggle(C_TOGGLE_VENDOR)
        .with_domain(lookups.vendors.clone())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("ProductTemplate", |row: &ProductRow<'r>| {
            row.record.product_template_id
        })
        .with_toggle(C_TOGGLE_PRODUCT_TEMPLATE)
        .with_domain(lookups.product_templates.clone()),
        SpecFieldDescriptor::new("ShowOnHomePage", |row: &ProductRow<'r>| {
            row.record.show_on_home_page
        })
        .with_toggle(C_TOGGLE_SHOW_ON_HOME_PAGE),
        SpecFieldDescriptor::new("MetaKeywords", |row: &ProductRow<'r>| {
            row.record.meta_keywords.clone()
        })
        .with_toggle(C_TOGGLE_SEO),
        SpecFieldDescriptor::new("MetaDescription", |row: &ProductRow<'r>| {
            row.record.meta_description.clone()
        })
        .with_toggle(C_TOGGLE_SEO),
        SpecFieldDescriptor::new("MetaTitle", |row: &ProductRow<'r>| {
            row.record.meta_title.clone()
        })
        .with_toggle(C_TOGGLE_SEO),
        SpecFieldDescriptor::new("SeName", |row: &ProductRow<'r>| row.record.se_name.clone())
            .with_toggle(C_TOGGLE_SEO),
        SpecFieldDescriptor::new("AllowCustomerReviews", |row: &ProductRow<'r>| {
            row.record.allow_customer_reviews
        })
        .with_toggle(C_TOGGLE_ALLOW_CUSTOMER_REVIEWS),
        SpecFieldDescriptor::new("Published", |row: &ProductRow<'r>| row.record.published)
            .with_toggle(C_TOGGLE_PUBLISHED),
        SpecFieldDescriptor::new("SKU", |row: &ProductRow<'r>| row.record.sku.clone()),
        SpecFieldDescriptor::new("ManufacturerPartNumber", |row: &ProductRow<'r>| {
            row.record.manufacturer_part_number.clone()
        })
        .with_toggle(C_TOGGLE_MANUFACTURER_PART_NUMBER),
        SpecFieldDescriptor::new("Gtin", |row: &ProductRow<'r>| row.record.gtin.clone())
            .with_toggle(C_TOGGLE_GTIN),
        SpecFieldDescriptor::new("IsGiftCard", |row: &ProductRow<'r>| row.record.is_gift_card)
            .with_toggle(C_TOGGLE_IS_GIFT_CARD),
        SpecFieldDescriptor::new("GiftCardType", |row: &ProductRow<'r>| {
            row.record.gift_card_type_id
        })
        .with_toggle(C_TOGGLE_IS_GIFT_CARD)
        .with_domain(derive_gift_card_type_domain()),
        SpecFieldDescriptor::new("OverriddenGiftCardAmount", |row: &ProductRow<'r>| {
            row.record.overridden_gift_card_amount
        })
        .with_toggle(C_TOGGLE_IS_GIFT_CARD),
        SpecFieldDescriptor::new("RequireOtherProducts", |row: &ProductRow<'r>| {
            row.record.require_other_products
        })
        .with_toggle(C_TOGGLE_REQUIRE_OTHER_PRODUCTS),
        SpecFieldDescriptor::new("RequiredProductIds", |row: &ProductRow<'r>| {
            row.record.required_product_ids.clone()
        })
        .with_toggle(C_TOGGLE_REQUIRE_OTHER_PRODUCTS),
        SpecFieldDescriptor::new("AutomaticallyAddRequiredProducts", |row: &ProductRow<'r>| {
            row.record.automatically_add_required_products
        })
        .with_toggle(C_TOGGLE_REQUIRE_OTHER_PRODUCTS),
        SpecFieldDescriptor::new("IsDownload", |row: &ProductRow<'r>| row.record.is_download)
            .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("DownloadId", |row: &ProductRow<'r>| {
            row.record.download_id
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("UnlimitedDownloads", |row: &ProductRow<'r>| {
            row.record.unlimited_downloads
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("MaxNumberOfDownloads", |row: &ProductRow<'r>| {
            row.record.max_number_of_downloads
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("DownloadActivationType", |row: &ProductRow<'r>| {
            row.record.download_activation_type_id
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT)
        .with_domain(derive_download_activation_type_domain()),
        SpecFieldDescriptor::new("HasSampleDownload", |row: &ProductRow<'r>| {
            row.record.has_sample_download
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("SampleDownloadId", |row: &ProductRow<'r>| {
            row.record.sample_download_id
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("HasUserAgreement", |row: &ProductRow<'r>| {
            row.record.has_user_agreement
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("UserAgreementText", |row: &ProductRow<'r>| {
            row.record.user_agreement_text.clone()
        })
        .with_toggle(C_TOGGLE_DOWNLOADABLE_PRODUCT),
        SpecFieldDescriptor::new("IsRecurring", |row: &ProductRow<'r>| row.record.is_recurring)
            .with_toggle(C_TOGGLE_RECURRING_PRODUCT),
        SpecFieldDescriptor::new("RecurringCycleLength", |row: &ProductRow<'r>| {
            row.record.recurring_cycle_length
        })
        .with_toggle(C_TOGGLE_RECURRING_PRODUCT),
        SpecFieldDescriptor::new("RecurringCyclePeriod", |row: &ProductRow<'r>| {
            row.record.recurring_cycle_period_id
        })
        .with_toggle(C_TOGGLE_RECURRING_PRODUCT)
        .with_domain(derive_period_domain())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("RecurringTotalCycles", |row: &ProductRow<'r>| {
            row.record.recurring_total_cycles
        })
        .with_toggle(C_TOGGLE_RECURRING_PRODUCT),
        SpecFieldDescriptor::new("IsRental", |row: &ProductRow<'r>| row.record.is_rental)
            .with_toggle(C_TOGGLE_IS_RENTAL),
        SpecFieldDescriptor::new("RentalPriceLength", |row: &ProductRow<'r>| {
            row.record.rental_price_length
        })
        .with_toggle(C_TOGGLE_IS_RENTAL),
        SpecFieldDescriptor::new("RentalPricePeriod", |row: &ProductRow<'r>| {
            row.record.rental_price_period_id
        })
        .with_toggle(C_TOGGLE_IS_RENTAL)
        .with_domain(derive_period_domain())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("IsShipEnabled", |row: &ProductRow<'r>| {
            row.record.is_ship_enabled
        })
        .with_toggle(C_TOGGLE_SHIPPING_ENABLED),
        SpecFieldDescriptor::new("IsFreeShipping", |row: &ProductRow<'r>| {
            row.record.is_free_shipping
        })
        .with_toggle(C_TOGGLE_FREE_SHIPPING),
        SpecFieldDescriptor::new("ShipSeparately", |row: &ProductRow<'r>| {
            row.record.ship_separately
        })
        .with_toggle(C_TOGGLE_SHIP_SEPARATELY),
        SpecFieldDescriptor::new("AdditionalShippingCharge", |row: &ProductRow<'r>| {
            row.record.additional_shipping_charge
        })
        .with_toggle(C_TOGGLE_ADDITIONAL_SHIPPING_CHARGE),
        SpecFieldDescriptor::new("DeliveryDate", |row: &ProductRow<'r>| {
            derive_optional_id(row.record.delivery_date_id)
        })
        .with_toggle(C_TOGGLE_DELIVERY_DATE)
        .with_domain(lookups.delivery_dates.clone())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("IsTaxExempt", |row: &ProductRow<'r>| row.record.is_tax_exempt),
        SpecFieldDescriptor::new("TaxCategory", |row: &ProductRow<'r>| {
            derive_optional_id(row.record.tax_category_id)
        })
        .with_domain(lookups.tax_categories.clone())
        .with_allow_blank(true),
        SpecFieldDescriptor::new(
            "IsTelecommunicationsOrBroadcastingOrElectronicServices",
            |row: &ProductRow<'r>| {
                row.record
                    .is_telecommunications_or_broadcasting_or_electronic_services
            },
        )
        .with_toggle(C_TOGGLE_ELECTRONIC_SERVICES),
        SpecFieldDescriptor::new("ManageInventoryMethod", |row: &ProductRow<'r>| {
            row.record.manage_inventory_method_id
        })
        .with_toggle(C_TOGGLE_INVENTORY_METHOD)
        .with_domain(derive_manage_inventory_method_domain()),
        SpecFieldDescriptor::new("UseMultipleWarehouses", |row: &ProductRow<'r>| {
            row.record.use_multiple_warehouses
        })
        .with_toggle(C_TOGGLE_USE_MULTIPLE_WAREHOUSES),
        SpecFieldDescriptor::new("WarehouseId", |row: &ProductRow<'r>| {
            derive_optional_id(row.record.warehouse_id)
        })
        .with_toggle(C_TOGGLE_WAREHOUSE)
        .with_domain(lookups.warehouses.clone())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("StockQuantity", |row: &ProductRow<'r>| {
            row.record.stock_quantity
        })
        .with_toggle(C_TOGGLE_STOCK_QUANTITY),
        SpecFieldDescriptor::new("DisplayStockAvailability", |row: &ProductRow<'r>| {
            row.record.display_stock_availability
        })
        .with_toggle(C_TOGGLE_DISPLAY_STOCK_AVAILABILITY),
        SpecFieldDescriptor::new("DisplayStockQuantity", |row: &ProductRow<'r>| {
            row.record.display_stock_quantity
        })
        .with_toggle(C_TOGGLE_DISPLAY_STOCK_QUANTITY),
        SpecFieldDescriptor::new("MinStockQuantity", |row: &ProductRow<'r>| {
            row.record.min_stock_quantity
        })
        .with_toggle(C_TOGGLE_MINIMUM_STOCK_QUANTITY),
        SpecFieldDescriptor::new("LowStockActivity", |row: &ProductRow<'r>| {
            row.record.low_stock_activity_id
        })
        .with_toggle(C_TOGGLE_LOW_STOCK_ACTIVITY)
        .with_domain(derive_low_stock_activity_domain()),
        SpecFieldDescriptor::new("NotifyAdminForQuantityBelow", |row: &ProductRow<'r>| {
            row.record.notify_admin_for_quantity_below
        })
        .with_toggle(C_TOGGLE_NOTIFY_ADMIN_FOR_QUANTITY_BELOW),
        SpecFieldDescriptor::new("BackorderMode", |row: &ProductRow<'r>| {
            row.record.backorder_mode_id
        })
        .with_toggle(C_TOGGLE_BACKORDERS)
        .with_domain(derive_backorder_mode_domain()),
        SpecFieldDescriptor::new("AllowBackInStockSubscriptions", |row: &ProductRow<'r>| {
            row.record.allow_back_in_stock_subscriptions
        })
        .with_toggle(C_TOGGLE_ALLOW_BACK_IN_STOCK_SUBSCRIPTIONS),
        SpecFieldDescriptor::new("OrderMinimumQuantity", |row: &ProductRow<'r>| {
            row.record.order_minimum_quantity
        })
        .with_toggle(C_TOGGLE_MINIMUM_CART_QUANTITY),
        SpecFieldDescriptor::new("OrderMaximumQuantity", |row: &ProductRow<'r>| {
            row.record.order_maximum_quantity
        })
        .with_toggle(C_TOGGLE_MAXIMUM_CART_QUANTITY),
        SpecFieldDescriptor::new("AllowedQuantities", |row: &ProductRow<'r>| {
            row.record.allowed_quantities.clone()
        })
        .with_toggle(C_TOGGLE_ALLOWED_QUANTITIES),
        SpecFieldDescriptor::new(
            "AllowAddingOnlyExistingAttributeCombinations",
            |row: &ProductRow<'r>| row.record.allow_adding_only_existing_attribute_combinations,
        )
        .with_toggle(C_TOGGLE_ONLY_EXISTING_ATTRIBUTE_COMBINATIONS),
        SpecFieldDescriptor::new("NotReturnable", |row: &ProductRow<'r>| {
            row.record.not_returnable
        })
        .with_toggle(C_TOGGLE_NOT_RETURNABLE),
        SpecFieldDescriptor::new("DisableBuyButton", |row: &ProductRow<'r>| {
            row.record.disable_buy_button
        })
        .with_toggle(C_TOGGLE_DISABLE_BUY_BUTTON),
        SpecFieldDescriptor::new("DisableWishlistButton", |row: &ProductRow<'r>| {
            row.record.disable_wishlist_button
        })
        .with_toggle(C_TOGGLE_DISABLE_WISHLIST_BUTTON),
        SpecFieldDescriptor::new("AvailableForPreOrder", |row: &ProductRow<'r>| {
            row.record.available_for_pre_order
        })
        .with_toggle(C_TOGGLE_AVAILABLE_FOR_PRE_ORDER),
        SpecFieldDescriptor::new("PreOrderAvailabilityStartDateTimeUtc", |row: &ProductRow<'r>| {
            row.record.pre_order_availability_start_date_time_utc
        })
        .with_toggle(C_TOGGLE_AVAILABLE_FOR_PRE_ORDER),
        SpecFieldDescriptor::new("CallForPrice", |row: &ProductRow<'r>| {
            row.record.call_for_price
        })
        .with_toggle(C_TOGGLE_CALL_FOR_PRICE),
        SpecFieldDescriptor::new("Price", |row: &ProductRow<'r>| row.record.price),
        SpecFieldDescriptor::new("OldPrice", |row: &ProductRow<'r>| row.record.old_price)
            .with_toggle(C_TOGGLE_OLD_PRICE),
        SpecFieldDescriptor::new("ProductCost", |row: &ProductRow<'r>| row.record.product_cost)
            .with_toggle(C_TOGGLE_PRODUCT_COST),
        SpecFieldDescriptor::new("SpecialPrice", |row: &ProductRow<'r>| {
            row.record.special_price
        })
        .with_toggle(C_TOGGLE_SPECIAL_PRICE),
        SpecFieldDescriptor::new("SpecialPriceStartDateTimeUtc", |row: &ProductRow<'r>| {
            row.record.special_price_start_date_time_utc
        })
        .with_toggle(C_TOGGLE_SPECIAL_PRICE_START_DATE),
        SpecFieldDescriptor::new("SpecialPriceEndDateTimeUtc", |row: &ProductRow<'r>| {
            row.record.special_price_end_date_time_utc
        })
        .with_toggle(C_TOGGLE_SPECIAL_PRICE_END_DATE),
        SpecFieldDescriptor::new("CustomerEntersPrice", |row: &ProductRow<'r>| {
            row.record.customer_enters_price
        })
        .with_toggle(C_TOGGLE_CUSTOMER_ENTERS_PRICE),
        SpecFieldDescriptor::new("MinimumCustomerEnteredPrice", |row: &ProductRow<'r>| {
            row.record.minimum_customer_entered_price
        })
        .with_toggle(C_TOGGLE_CUSTOMER_ENTERS_PRICE),
        SpecFieldDescriptor::new("MaximumCustomerEnteredPrice", |row: &ProductRow<'r>| {
            row.record.maximum_customer_entered_price
        })
        .with_toggle(C_TOGGLE_CUSTOMER_ENTERS_PRICE),
        SpecFieldDescriptor::new("BasepriceEnabled", |row: &ProductRow<'r>| {
            row.record.basepricing_enabled
        })
        .with_toggle(C_TOGGLE_PAN_GERMAN_PRICE_UNITS),
        SpecFieldDescriptor::new("BasepriceAmount", |row: &ProductRow<'r>| {
            row.record.baseprice_amount
        })
        .with_toggle(C_TOGGLE_PAN_GERMAN_PRICE_UNITS),
        SpecFieldDescriptor::new("BasepriceUnit", |row: &ProductRow<'r>| {
            derive_optional_id(row.record.baseprice_unit_id)
        })
        .with_toggle(C_TOGGLE_PAN_GERMAN_PRICE_UNITS)
        .with_domain(lookups.measure_weights.clone())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("BasepriceBaseAmount", |row: &ProductRow<'r>| {
            row.record.baseprice_base_amount
        })
        .with_toggle(C_TOGGLE_PAN_GERMAN_PRICE_UNITS),
        SpecFieldDescriptor::new("BasepriceBaseUnit", |row: &ProductRow<'r>| {
            derive_optional_id(row.record.baseprice_base_unit_id)
        })
        .with_toggle(C_TOGGLE_PAN_GERMAN_PRICE_UNITS)
        .with_domain(lookups.measure_weights.clone())
        .with_allow_blank(true),
        SpecFieldDescriptor::new("MarkAsNew", |row: &ProductRow<'r>| row.record.mark_as_new)
            .with_toggle(C_TOGGLE_MARK_AS_NEW),
        SpecFieldDescriptor::new("MarkAsNewStartDateTimeUtc", |row: &ProductRow<'r>| {
            row.record.mark_as_new_start_date_time_utc
        })
        .with_toggle(C_TOGGLE_MARK_AS_NEW_START_DATE),
        SpecFieldDescriptor::new("MarkAsNewEndDateTimeUtc", |row: &ProductRow<'r>| {
            row.record.mark_as_new_end_date_time_utc
        })
        .with_toggle(C_TOGGLE_MARK_AS_NEW_END_DATE),
        SpecFieldDescriptor::new("Weight", |row: &ProductRow<'r>| row.record.weight)
            .with_toggle(C_TOGGLE_WEIGHT),
        SpecFieldDescriptor::new("Length", |row: &ProductRow<'r>| row.record.length)
            .with_toggle(C_TOGGLE_DIMENSIONS),
        SpecFieldDescriptor::new("Width", |row: &ProductRow<'r>| row.record.width)
            .with_toggle(C_TOGGLE_DIMENSIONS),
        SpecFieldDescriptor::new("Height", |row: &ProductRow<'r>| row.record.height)
            .with_toggle(C_TOGGLE_DIMENSIONS),
        SpecFieldDescriptor::new("Categories", |row: &ProductRow<'r>| {
            row.category_names.clone()
        }),
        SpecFieldDescriptor::new("Manufacturers", |row: &ProductRow<'r>| {
            row.manufacturer_names.clone()
        })
        .with_toggle(C_TOGGLE_MANUFACTURERS),
        SpecFieldDescriptor::new("ProductTags", |row: &ProductRow<'r>| {
            let l_names: Vec<String> = row.record.tags.iter().map(|tag| tag.name.clone()).collect();
            join_names(&l_names)
        })
        .with_toggle(C_TOGGLE_PRODUCT_TAGS),
    ];
    l_fields.extend(derive_picture_fields());
    l_fields
}

fn derive_picture_fields<'r>() -> Vec<SpecFieldDescriptor<ProductRow<'r>>> {
    (0..N_PRODUCT_PICTURES_MAX)
        .map(|n_idx| {
            SpecFieldDescriptor::new(format!("Picture{}", n_idx + 1), move |row: &ProductRow<'r>| {
                row.picture_path(n_idx)
            })
        })
        .collect()
}

type AttributeRow<'r> = SpecProductAttributeRow<'r>;

/// Attribute detail columns; value columns are blank on mapping-only rows.
pub fn derive_product_attribute_fields<'r>() -> Vec<SpecFieldDescriptor<AttributeRow<'r>>> {
    vec![
        SpecFieldDescriptor::new("AttributeId", |row: &AttributeRow<'r>| {
            row.mapping.attribute_id
        }),
        SpecFieldDescriptor::new("AttributeName", |row: &AttributeRow<'r>| {
            row.mapping.attribute_name.clone()
        }),
        SpecFieldDescriptor::new("AttributeTextPrompt", |row: &AttributeRow<'r>| {
            row.mapping.text_prompt.clone()
        }),
        SpecFieldDescriptor::new("AttributeIsRequired", |row: &AttributeRow<'r>| {
            row.mapping.is_required
        }),
        SpecFieldDescriptor::new("AttributeControlType", |row: &AttributeRow<'r>| {
            row.mapping.attribute_control_type_id
        })
        .with_domain(derive_attribute_control_type_domain()),
        SpecFieldDescriptor::new("AttributeDisplayOrder", |row: &AttributeRow<'r>| {
            row.mapping.display_order
        }),
        SpecFieldDescriptor::new("ProductAttributeValueId", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.id)
        }),
        SpecFieldDescriptor::new("ValueName", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.name.clone())
        }),
        SpecFieldDescriptor::new("AttributeValueType", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.attribute_value_type_id)
        })
        .with_domain(derive_attribute_value_type_domain()),
        SpecFieldDescriptor::new("AssociatedProductId", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.associated_product_id)
        }),
        SpecFieldDescriptor::new("ColorSquaresRgb", |row: &AttributeRow<'r>| {
            row.value.and_then(|value| value.color_squares_rgb.clone())
        }),
        SpecFieldDescriptor::new("ImageSquaresPictureId", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.image_squares_picture_id)
        }),
        SpecFieldDescriptor::new("PriceAdjustment", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.price_adjustment)
        }),
        SpecFieldDescriptor::new("WeightAdjustment", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.weight_adjustment)
        }),
        SpecFieldDescriptor::new("Cost", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.cost)
        }),
        SpecFieldDescriptor::new("CustomerEntersQty", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.customer_enters_qty)
        }),
        SpecFieldDescriptor::new("Quantity", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.quantity)
        }),
        SpecFieldDescriptor::new("IsPreSelected", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.is_pre_selected)
        }),
        SpecFieldDescriptor::new("DisplayOrder", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.display_order)
        }),
        SpecFieldDescriptor::new("PictureId", |row: &AttributeRow<'r>| {
            row.value.map(|value| value.picture_id)
        }),
    ]
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Orders

type FnAddressOf = fn(&Order) -> Option<&Address>;
type FnAddressPart = fn(&Address) -> Option<&String>;

const TUP_ADDRESS_PARTS: [(&str, FnAddressPart); 12] = [
    ("FirstName", |a| a.first_name.as_ref()),
    ("LastName", |a| a.last_name.as_ref()),
    ("Email", |a| a.email.as_ref()),
    ("Company", |a| a.company.as_ref()),
    ("Country", |a| a.country.as_ref()),
    ("StateProvince", |a| a.state_province.as_ref()),
    ("City", |a| a.city.as_ref()),
    ("Address1", |a| a.address1.as_ref()),
    ("Address2", |a| a.address2.as_ref()),
    ("ZipPostalCode", |a| a.zip_postal_code.as_ref()),
    ("PhoneNumber", |a| a.phone_number.as_ref()),
    ("FaxNumber", |a| a.fax_number.as_ref()),
];

fn derive_address_fields(
    c_prefix: &str,
    address_of: FnAddressOf,
) -> Vec<SpecFieldDescriptor<Order>> {
    TUP_ADDRESS_PARTS
        .iter()
        .map(|(c_part, part_of)| {
            let part_of = *part_of;
            SpecFieldDescriptor::new(format!("{c_prefix}{c_part}"), move |order: &Order| {
                address_of(order).and_then(part_of).cloned()
            })
        })
        .collect()
}

pub fn derive_order_fields() -> Vec<SpecFieldDescriptor<Order>> {
    let mut l_fields = vec![
        SpecFieldDescriptor::new("OrderId", |o: &Order| o.id),
        SpecFieldDescriptor::new("StoreId", |o: &Order| o.store_id),
        SpecFieldDescriptor::new("OrderGuid", |o: &Order| o.order_guid.clone()),
        SpecFieldDescriptor::new("CustomerId", |o: &Order| o.customer_id),
        SpecFieldDescriptor::new("OrderStatusId", |o: &Order| o.order_status_id),
        SpecFieldDescriptor::new("PaymentStatusId", |o: &Order| o.payment_status_id),
        SpecFieldDescriptor::new("ShippingStatusId", |o: &Order| o.shipping_status_id),
        SpecFieldDescriptor::new("OrderSubtotalInclTax", |o: &Order| o.order_subtotal_incl_tax),
        SpecFieldDescriptor::new("OrderSubtotalExclTax", |o: &Order| o.order_subtotal_excl_tax),
        SpecFieldDescriptor::new("OrderSubTotalDiscountInclTax", |o: &Order| {
            o.order_sub_total_discount_incl_tax
        }),
        SpecFieldDescriptor::new("OrderSubTotalDiscountExclTax", |o: &Order| {
            o.order_sub_total_discount_excl_tax
        }),
        SpecFieldDescriptor::new("OrderShippingInclTax", |o: &Order| o.order_shipping_incl_tax),
        SpecFieldDescriptor::new("OrderShippingExclTax", |o: &Order| o.order_shipping_excl_tax),
        SpecFieldDescriptor::new("PaymentMethodAdditionalFeeInclTax", |o: &Order| {
            o.payment_method_additional_fee_incl_tax
        }),
        SpecFieldDescriptor::new("PaymentMethodAdditionalFeeExclTax", |o: &Order| {
            o.payment_method_additional_fee_excl_tax
        }),
        SpecFieldDescriptor::new("TaxRates", |o: &Order| o.tax_rates.clone()),
        SpecFieldDescriptor::new("OrderTax", |o: &Order| o.order_tax),
        SpecFieldDescriptor::new("OrderTotal", |o: &Order| o.order_total),
        SpecFieldDescriptor::new("RefundedAmount", |o: &Order| o.refunded_amount),
        SpecFieldDescriptor::new("OrderDiscount", |o: &Order| o.order_discount),
        SpecFieldDescriptor::new("CurrencyRate", |o: &Order| o.currency_rate),
        SpecFieldDescriptor::new("CustomerCurrencyCode", |o: &Order| {
            o.customer_currency_code.clone()
        }),
        SpecFieldDescriptor::new("AffiliateId", |o: &Order| o.affiliate_id),
        SpecFieldDescriptor::new("PaymentMethodSystemName", |o: &Order| {
            o.payment_method_system_name.clone()
        }),
        SpecFieldDescriptor::new("ShippingPickUpInStore", |o: &Order| o.pick_up_in_store),
        SpecFieldDescriptor::new("ShippingMethod", |o: &Order| o.shipping_method.clone()),
        SpecFieldDescriptor::new("ShippingRateComputationMethodSystemName", |o: &Order| {
            o.shipping_rate_computation_method_system_name.clone()
        }),
        SpecFieldDescriptor::new("CustomValuesXml", |o: &Order| o.custom_values_xml.clone()),
        SpecFieldDescriptor::new("VatNumber", |o: &Order| o.vat_number.clone()),
        SpecFieldDescriptor::new("CreatedOnUtc", |o: &Order| o.created_on_utc),
    ];
    l_fields.extend(derive_address_fields("Billing", |o| o.billing_address.as_ref()));
    l_fields.extend(derive_address_fields("Shipping", |o| o.shipping_address.as_ref()));
    l_fields
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Customers

/// Customer columns. Password hashes and salts are never exported.
pub fn derive_customer_fields() -> Vec<SpecFieldDescriptor<Customer>> {
    vec![
        SpecFieldDescriptor::new("CustomerId", |c: &Customer| c.id),
        SpecFieldDescriptor::new("CustomerGuid", |c: &Customer| c.customer_guid.clone()),
        SpecFieldDescriptor::new("Email", |c: &Customer| c.email.clone()),
        SpecFieldDescriptor::new("Username", |c: &Customer| c.username.clone()),
        SpecFieldDescriptor::new("IsTaxExempt", |c: &Customer| c.is_tax_exempt),
        SpecFieldDescriptor::new("AffiliateId", |c: &Customer| c.affiliate_id),
        SpecFieldDescriptor::new("VendorId", |c: &Customer| c.vendor_id),
        SpecFieldDescriptor::new("Active", |c: &Customer| c.active),
        SpecFieldDescriptor::new("IsGuest", |c: &Customer| c.is_guest),
        SpecFieldDescriptor::new("IsRegistered", |c: &Customer| c.is_registered),
        SpecFieldDescriptor::new("IsAdministrator", |c: &Customer| c.is_administrator),
        SpecFieldDescriptor::new("IsForumModerator", |c: &Customer| c.is_forum_moderator),
        SpecFieldDescriptor::new("FirstName", |c: &Customer| c.first_name.clone()),
        SpecFieldDescriptor::new("LastName", |c: &Customer| c.last_name.clone()),
        SpecFieldDescriptor::new("Gender", |c: &Customer| c.gender.clone()),
        SpecFieldDescriptor::new("Company", |c: &Customer| c.company.clone()),
        SpecFieldDescriptor::new("StreetAddress", |c: &Customer| c.street_address.clone()),
        SpecFieldDescriptor::new("StreetAddress2", |c: &Customer| c.street_address2.clone()),
        SpecFieldDescriptor::new("ZipPostalCode", |c: &Customer| c.zip_postal_code.clone()),
        SpecFieldDescriptor::new("City", |c: &Customer| c.city.clone()),
        SpecFieldDescriptor::new("CountryId", |c: &Customer| c.country_id),
        SpecFieldDescriptor::new("StateProvinceId", |c: &Customer| c.state_province_id),
        SpecFieldDescriptor::new("Phone", |c: &Customer| c.phone.clone()),
        SpecFieldDescriptor::new("Fax", |c: &Customer| c.fax.clone()),
        SpecFieldDescriptor::new("VatNumber", |c: &Customer| c.vat_number.clone()),
        SpecFieldDescriptor::new("VatNumberStatusId", |c: &Customer| c.vat_number_status_id),
        SpecFieldDescriptor::new("TimeZoneId", |c: &Customer| c.time_zone_id.clone()),
        SpecFieldDescriptor::new("AvatarPictureId", |c: &Customer| c.avatar_picture_id),
        SpecFieldDescriptor::new("ForumPostCount", |c: &Customer| c.forum_post_count),
        SpecFieldDescriptor::new("Signature", |c: &Customer| c.signature.clone()),
    ]
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use exportkit_io_xlsx::resolve_fields;

    use super::*;
    use crate::spec::SpecExportSettings;

    fn mapping(n_id: i64, l_values: &[&str]) -> ProductAttributeMapping {
        ProductAttributeMapping {
            attribute_id: n_id,
            attribute_name: format!("Attr{n_id}"),
            values: l_values
                .iter()
                .enumerate()
                .map(|(n_idx, c_name)| ProductAttributeValue {
                    id: n_id * 100 + n_idx as i64,
                    name: c_name.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valueless_mappings_come_last() {
        let product = Product {
            attribute_mappings: vec![
                mapping(1, &[]),
                mapping(2, &["Red", "Blue"]),
                mapping(3, &["Large"]),
            ],
            ..Default::default()
        };
        let l_rows = flatten_attribute_rows(&product);
        let l_pairs: Vec<(i64, Option<&str>)> = l_rows
            .iter()
            .map(|row| {
                (
                    row.mapping.attribute_id,
                    row.value.map(|value| value.name.as_str()),
                )
            })
            .collect();
        assert_eq!(
            l_pairs,
            vec![(2, Some("Red")), (2, Some("Blue")), (3, Some("Large")), (1, None)]
        );
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&[]), None);
        assert_eq!(
            join_names(&["Books".to_string(), "Music".to_string()]),
            Some("Books;Music".to_string())
        );
    }

    #[test]
    fn test_order_fields_carry_both_addresses() {
        let l_fields = derive_order_fields();
        let l_names: Vec<&str> = l_fields.iter().map(|field| field.name.as_str()).collect();
        assert!(l_names.contains(&"BillingFirstName"));
        assert!(l_names.contains(&"ShippingFaxNumber"));

        let order = Order {
            billing_address: Some(Address {
                city: Some("Oslo".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let field_city = l_fields
            .iter()
            .find(|field| field.name == "BillingCity")
            .unwrap();
        assert_eq!(field_city.evaluate(&order).unwrap().to_text(), "Oslo");
        let field_ship_city = l_fields
            .iter()
            .find(|field| field.name == "ShippingCity")
            .unwrap();
        assert!(field_ship_city.evaluate(&order).unwrap().is_blank());
    }

    #[test]
    fn test_customer_fields_have_no_secrets() {
        let l_fields = derive_customer_fields();
        assert!(
            l_fields
                .iter()
                .all(|field| !field.name.to_lowercase().contains("password"))
        );
    }

    #[test]
    fn test_picture_columns_follow_resolved_paths() {
        let product = Product::default();
        let mut row = SpecCatalogRow::new(&product);
        row.l_picture_paths = vec![Some("a.jpg".to_string()), None];
        let l_fields = derive_picture_fields();
        assert_eq!(l_fields.len(), N_PRODUCT_PICTURES_MAX);
        assert_eq!(l_fields[0].evaluate(&row).unwrap().to_text(), "a.jpg");
        assert!(l_fields[1].evaluate(&row).unwrap().is_blank());
        assert!(l_fields[2].evaluate(&row).unwrap().is_blank());
    }

    #[test]
    fn test_advanced_mode_keeps_every_product_column() {
        let settings = SpecExportSettings {
            if_product_advanced_mode: true,
            ..Default::default()
        };
        let lookups = SpecProductLookupDomains::default();
        let fields =
            resolve_fields(derive_product_fields(&lookups), &settings.mode_flags()).unwrap();
        assert_eq!(fields.len(), 96);
        let l_names = fields.names();
        assert_eq!(l_names[0], "ProductType");
        assert_eq!(l_names[95], "Picture3");
        for c_name in [
            "RequiredProductIds",
            "UserAgreementText",
            "IsTelecommunicationsOrBroadcastingOrElectronicServices",
            "NotifyAdminForQuantityBelow",
            "PreOrderAvailabilityStartDateTimeUtc",
            "MarkAsNewEndDateTimeUtc",
        ] {
            assert!(l_names.contains(&c_name), "{c_name} missing");
        }
    }

    #[test]
    fn test_editor_toggles_enable_warehouse_and_price_columns() {
        let settings = SpecExportSettings {
            product_editor: BTreeMap::from([
                (C_TOGGLE_WAREHOUSE.to_string(), true),
                (C_TOGGLE_SHIP_SEPARATELY.to_string(), true),
                (C_TOGGLE_CUSTOMER_ENTERS_PRICE.to_string(), true),
            ]),
            ..Default::default()
        };
        let lookups = SpecProductLookupDomains {
            warehouses: SpecValueDomain::new([(1, "North"), (2, "South")]),
            ..Default::default()
        };
        let product = Product::default();
        let product_south = Product {
            warehouse_id: 2,
            ..Default::default()
        };
        let fields =
            resolve_fields(derive_product_fields(&lookups), &settings.mode_flags()).unwrap();
        let l_names = fields.names();
        assert!(!l_names.contains(&"UseMultipleWarehouses"));
        assert!(!l_names.contains(&"AdditionalShippingCharge"));

        let n_pos = |c_name: &str| fields.position(c_name).unwrap();
        assert!(n_pos("ShipSeparately") < n_pos("TaxCategory"));
        assert!(n_pos("TaxCategory") < n_pos("WarehouseId"));
        assert!(n_pos("Price") < n_pos("CustomerEntersPrice"));
        assert_eq!(n_pos("MaximumCustomerEnteredPrice"), n_pos("CustomerEntersPrice") + 2);

        let field_warehouse = &fields.fields()[n_pos("WarehouseId")];
        assert_eq!(field_warehouse.domain.as_ref().map(|domain| domain.len()), Some(2));
        assert!(field_warehouse.if_allow_blank);

        assert!(
            field_warehouse
                .evaluate(&SpecCatalogRow::new(&product))
                .unwrap()
                .is_blank()
        );
        assert_eq!(
            field_warehouse
                .evaluate(&SpecCatalogRow::new(&product_south))
                .unwrap()
                .to_text(),
            "2"
        );
    }
}
