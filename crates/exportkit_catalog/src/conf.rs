//! Sheet and element names, product editor toggle keys and fixed domains.

use exportkit_io_xlsx::SpecValueDomain;

/// Root marker written when settings leave `version` empty.
pub const C_VERSION_DEFAULT: &str = "4.70";

/// Picture columns per product row.
pub const N_PRODUCT_PICTURES_MAX: usize = 3;

/// Separator joining category, manufacturer and tag names in one cell.
pub const C_NAME_LIST_SEPARATOR: &str = ";";

/// Date-time text used in markup and text exports.
pub const C_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const C_SHEET_NAME_CATEGORY: &str = "Category";
pub const C_SHEET_NAME_MANUFACTURER: &str = "Manufacturer";
pub const C_SHEET_NAME_PRODUCT: &str = "Product";
pub const C_SHEET_NAME_ORDER: &str = "Order";
pub const C_SHEET_NAME_CUSTOMER: &str = "Customer";

////////////////////////////////////////////////////////////////////////////////
// #region ProductEditorToggles

pub const C_TOGGLE_PRODUCT_TYPE: &str = "ProductType";
pub const C_TOGGLE_VISIBLE_INDIVIDUALLY: &str = "VisibleIndividually";
pub const C_TOGGLE_VENDOR: &str = "Vendor";
pub const C_TOGGLE_PRODUCT_TEMPLATE: &str = "ProductTemplate";
pub const C_TOGGLE_SHOW_ON_HOME_PAGE: &str = "ShowOnHomePage";
pub const C_TOGGLE_SEO: &str = "Seo";
pub const C_TOGGLE_ALLOW_CUSTOMER_REVIEWS: &str = "AllowCustomerReviews";
pub const C_TOGGLE_PUBLISHED: &str = "Published";
pub const C_TOGGLE_MANUFACTURER_PART_NUMBER: &str = "ManufacturerPartNumber";
pub const C_TOGGLE_GTIN: &str = "GTIN";
pub const C_TOGGLE_IS_GIFT_CARD: &str = "IsGiftCard";
pub const C_TOGGLE_DOWNLOADABLE_PRODUCT: &str = "DownloadableProduct";
pub const C_TOGGLE_RECURRING_PRODUCT: &str = "RecurringProduct";
pub const C_TOGGLE_IS_RENTAL: &str = "IsRental";
pub const C_TOGGLE_SHIPPING_ENABLED: &str = "ShippingEnabled";
pub const C_TOGGLE_FREE_SHIPPING: &str = "FreeShipping";
pub const C_TOGGLE_DELIVERY_DATE: &str = "DeliveryDate";
pub const C_TOGGLE_INVENTORY_METHOD: &str = "InventoryMethod";
pub const C_TOGGLE_STOCK_QUANTITY: &str = "StockQuantity";
pub const C_TOGGLE_LOW_STOCK_ACTIVITY: &str = "LowStockActivity";
pub const C_TOGGLE_BACKORDERS: &str = "Backorders";
pub const C_TOGGLE_MINIMUM_CART_QUANTITY: &str = "MinimumCartQuantity";
pub const C_TOGGLE_MAXIMUM_CART_QUANTITY: &str = "MaximumCartQuantity";
pub const C_TOGGLE_DISABLE_BUY_BUTTON: &str = "DisableBuyButton";
pub const C_TOGGLE_CALL_FOR_PRICE: &str = "CallForPrice";
pub const C_TOGGLE_OLD_PRICE: &str = "OldPrice";
pub const C_TOGGLE_PRODUCT_COST: &str = "ProductCost";
pub const C_TOGGLE_SPECIAL_PRICE: &str = "SpecialPrice";
pub const C_TOGGLE_SPECIAL_PRICE_START_DATE: &str = "SpecialPriceStartDate";
pub const C_TOGGLE_SPECIAL_PRICE_END_DATE: &str = "SpecialPriceEndDate";
pub const C_TOGGLE_PAN_GERMAN_PRICE_UNITS: &str = "PAngV";
pub const C_TOGGLE_MARK_AS_NEW: &str = "MarkAsNew";
pub const C_TOGGLE_WEIGHT: &str = "Weight";
pub const C_TOGGLE_DIMENSIONS: &str = "Dimensions";
pub const C_TOGGLE_MANUFACTURERS: &str = "Manufacturers";
pub const C_TOGGLE_PRODUCT_TAGS: &str = "ProductTags";
pub const C_TOGGLE_PRODUCT_ATTRIBUTES: &str = "ProductAttributes";
pub const C_TOGGLE_ID: &str = "Id";
pub const C_TOGGLE_ADMIN_COMMENT: &str = "AdminComment";
pub const C_TOGGLE_REQUIRE_OTHER_PRODUCTS: &str = "RequireOtherProductsAddedToTheCart";
pub const C_TOGGLE_SHIP_SEPARATELY: &str = "ShipSeparately";
pub const C_TOGGLE_ADDITIONAL_SHIPPING_CHARGE: &str = "AdditionalShippingCharge";
pub const C_TOGGLE_ELECTRONIC_SERVICES: &str = "TelecommunicationsBroadcastingElectronicServices";
pub const C_TOGGLE_USE_MULTIPLE_WAREHOUSES: &str = "UseMultipleWarehouses";
pub const C_TOGGLE_WAREHOUSE: &str = "Warehouse";
pub const C_TOGGLE_DISPLAY_STOCK_AVAILABILITY: &str = "DisplayStockAvailability";
pub const C_TOGGLE_DISPLAY_STOCK_QUANTITY: &str = "DisplayStockQuantity";
pub const C_TOGGLE_MINIMUM_STOCK_QUANTITY: &str = "MinimumStockQuantity";
pub const C_TOGGLE_NOTIFY_ADMIN_FOR_QUANTITY_BELOW: &str = "NotifyAdminForQuantityBelow";
pub const C_TOGGLE_ALLOW_BACK_IN_STOCK_SUBSCRIPTIONS: &str = "AllowBackInStockSubscriptions";
pub const C_TOGGLE_ALLOWED_QUANTITIES: &str = "AllowedQuantities";
pub const C_TOGGLE_ONLY_EXISTING_ATTRIBUTE_COMBINATIONS: &str =
    "AllowAddingOnlyExistingAttributeCombinations";
pub const C_TOGGLE_NOT_RETURNABLE: &str = "NotReturnable";
pub const C_TOGGLE_DISABLE_WISHLIST_BUTTON: &str = "DisableWishlistButton";
pub const C_TOGGLE_AVAILABLE_FOR_PRE_ORDER: &str = "AvailableForPreOrder";
pub const C_TOGGLE_CUSTOMER_ENTERS_PRICE: &str = "CustomerEntersPrice";
pub const C_TOGGLE_MARK_AS_NEW_START_DATE: &str = "MarkAsNewStartDate";
pub const C_TOGGLE_MARK_AS_NEW_END_DATE: &str = "MarkAsNewEndDate";
pub const C_TOGGLE_CREATED_ON: &str = "CreatedOn";
pub const C_TOGGLE_UPDATED_ON: &str = "UpdatedOn";
pub const C_TOGGLE_DISCOUNTS: &str = "Discounts";
pub const C_TOGGLE_TIER_PRICES: &str = "TierPrices";
pub const C_TOGGLE_SPECIFICATION_ATTRIBUTES: &str = "SpecificationAttributes";

/// Every toggle the product descriptors refer to; unset ones default to off.
pub const TUP_PRODUCT_EDITOR_TOGGLES: [&str; 63] = [
    C_TOGGLE_PRODUCT_TYPE,
    C_TOGGLE_VISIBLE_INDIVIDUALLY,
    C_TOGGLE_VENDOR,
    C_TOGGLE_PRODUCT_TEMPLATE,
    C_TOGGLE_SHOW_ON_HOME_PAGE,
    C_TOGGLE_SEO,
    C_TOGGLE_ALLOW_CUSTOMER_REVIEWS,
    C_TOGGLE_PUBLISHED,
    C_TOGGLE_MANUFACTURER_PART_NUMBER,
    C_TOGGLE_GTIN,
    C_TOGGLE_IS_GIFT_CARD,
    C_TOGGLE_DOWNLOADABLE_PRODUCT,
    C_TOGGLE_RECURRING_PRODUCT,
    C_TOGGLE_IS_RENTAL,
    C_TOGGLE_SHIPPING_ENABLED,
    C_TOGGLE_FREE_SHIPPING,
    C_TOGGLE_DELIVERY_DATE,
    C_TOGGLE_INVENTORY_METHOD,
    C_TOGGLE_STOCK_QUANTITY,
    C_TOGGLE_LOW_STOCK_ACTIVITY,
    C_TOGGLE_BACKORDERS,
    C_TOGGLE_MINIMUM_CART_QUANTITY,
    C_TOGGLE_MAXIMUM_CART_QUANTITY,
    C_TOGGLE_DISABLE_BUY_BUTTON,
    C_TOGGLE_CALL_FOR_PRICE,
    C_TOGGLE_OLD_PRICE,
    C_TOGGLE_PRODUCT_COST,
    C_TOGGLE_SPECIAL_PRICE,
    C_TOGGLE_SPECIAL_PRICE_START_DATE,
    C_TOGGLE_SPECIAL_PRICE_END_DATE,
    C_TOGGLE_PAN_GERMAN_PRICE_UNITS,
    C_TOGGLE_MARK_AS_NEW,
    C_TOGGLE_WEIGHT,
    C_TOGGLE_DIMENSIONS,
    C_TOGGLE_MANUFACTURERS,
    C_TOGGLE_PRODUCT_TAGS,
    C_TOGGLE_PRODUCT_ATTRIBUTES,
    C_TOGGLE_ID,
    C_TOGGLE_ADMIN_COMMENT,
    C_TOGGLE_REQUIRE_OTHER_PRODUCTS,
    C_TOGGLE_SHIP_SEPARATELY,
    C_TOGGLE_ADDITIONAL_SHIPPING_CHARGE,
    C_TOGGLE_ELECTRONIC_SERVICES,
    C_TOGGLE_USE_MULTIPLE_WAREHOUSES,
    C_TOGGLE_WAREHOUSE,
    C_TOGGLE_DISPLAY_STOCK_AVAILABILITY,
    C_TOGGLE_DISPLAY_STOCK_QUANTITY,
    C_TOGGLE_MINIMUM_STOCK_QUANTITY,
    C_TOGGLE_NOTIFY_ADMIN_FOR_QUANTITY_BELOW,
    C_TOGGLE_ALLOW_BACK_IN_STOCK_SUBSCRIPTIONS,
    C_TOGGLE_ALLOWED_QUANTITIES,
    C_TOGGLE_ONLY_EXISTING_ATTRIBUTE_COMBINATIONS,
    C_TOGGLE_NOT_RETURNABLE,
    C_TOGGLE_DISABLE_WISHLIST_BUTTON,
    C_TOGGLE_AVAILABLE_FOR_PRE_ORDER,
    C_TOGGLE_CUSTOMER_ENTERS_PRICE,
    C_TOGGLE_MARK_AS_NEW_START_DATE,
    C_TOGGLE_MARK_AS_NEW_END_DATE,
    C_TOGGLE_CREATED_ON,
    C_TOGGLE_UPDATED_ON,
    C_TOGGLE_DISCOUNTS,
    C_TOGGLE_TIER_PRICES,
    C_TOGGLE_SPECIFICATION_ATTRIBUTES,
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FixedDomains

/// Attribute control types (textbox, multiline textbox, file upload) that
/// carry validation rules.
pub const TUP_VALIDATED_CONTROL_TYPE_IDS: [i64; 3] = [4, 10, 30];

pub fn derive_product_type_domain() -> SpecValueDomain {
    SpecValueDomain::new([(5, "Simple product"), (10, "Grouped product")])
}

pub fn derive_gift_card_type_domain() -> SpecValueDomain {
    SpecValueDomain::new([(0, "Virtual"), (1, "Physical")])
}

pub fn derive_download_activation_type_domain() -> SpecValueDomain {
    SpecValueDomain::new([(0, "When order is paid"), (10, "Manually")])
}

/// Cycle periods of recurring products and rental prices.
pub fn derive_period_domain() -> SpecValueDomain {
    SpecValueDomain::new([(0, "Days"), (10, "Weeks"), (20, "Months"), (30, "Years")])
}

pub fn derive_manage_inventory_method_domain() -> SpecValueDomain {
    SpecValueDomain::new([
        (0, "Don't track inventory"),
        (1, "Track inventory"),
        (2, "Track inventory by product attributes"),
    ])
}

pub fn derive_low_stock_activity_domain() -> SpecValueDomain {
    SpecValueDomain::new([(0, "Nothing"), (1, "Disable buy button"), (2, "Unpublish")])
}

pub fn derive_backorder_mode_domain() -> SpecValueDomain {
    SpecValueDomain::new([
        (0, "No backorders"),
        (1, "Allow qty below 0"),
        (2, "Allow qty below 0 and notify customer"),
    ])
}

pub fn derive_attribute_control_type_domain() -> SpecValueDomain {
    SpecValueDomain::new([
        (1, "Drop-down list"),
        (2, "Radio button list"),
        (3, "Checkboxes"),
        (4, "Textbox"),
        (10, "Multiline textbox"),
        (20, "Date picker"),
        (30, "File upload"),
        (40, "Color squares"),
        (45, "Image squares"),
        (50, "Read-only checkboxes"),
    ])
}

pub fn derive_attribute_value_type_domain() -> SpecValueDomain {
    SpecValueDomain::new([(0, "Simple"), (10, "Associated to product")])
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_toggle_keys_are_unique() {
        let set_keys: BTreeSet<&str> = TUP_PRODUCT_EDITOR_TOGGLES.iter().copied().collect();
        assert_eq!(set_keys.len(), TUP_PRODUCT_EDITOR_TOGGLES.len());
        assert!(set_keys.contains(C_TOGGLE_PRODUCT_ATTRIBUTES));
        assert!(set_keys.contains(C_TOGGLE_WAREHOUSE));
        assert!(set_keys.contains(C_TOGGLE_SPECIFICATION_ATTRIBUTES));
    }

    #[test]
    fn test_period_domain_codes() {
        let domain = derive_period_domain();
        assert_eq!(domain.codes().collect::<Vec<_>>(), vec!["0", "10", "20", "30"]);
        assert_eq!(domain.items()[2].1, "Months");
    }
}
