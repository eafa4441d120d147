//! Markup element builders for catalog entities.

use chrono::NaiveDateTime;
use exportkit_io_xlsx::SpecModeFlags;
use exportkit_io_xml::{LeafItem, SpecElement, ToXmlText, TreeNode};

use crate::conf::*;
use crate::entity::{
    Category, Customer, Manufacturer, Order, OrderItem, Product, ProductAttributeMapping,
    ProductAttributeValue, ProductCategoryLink, ProductCategoryMapping, ProductManufacturerLink,
    ProductManufacturerMapping, Shipment,
};

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(C_DATETIME_FORMAT).to_string()
}

fn format_datetime_opt(value: Option<NaiveDateTime>) -> Option<String> {
    value.as_ref().map(format_datetime)
}

////////////////////////////////////////////////////////////////////////////////
// #region Categories

impl TreeNode for Category {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        (self.parent_category_id != 0).then_some(self.parent_category_id)
    }

    fn write_fields(&self, element: &mut SpecElement) {
        element.push_field("Id", &self.id);
        element.push_field("Name", &self.name);
        element.push_field("Description", &self.description);
        element.push_field("CategoryTemplateId", &self.category_template_id);
        element.push_field("MetaKeywords", &self.meta_keywords);
        element.push_field("MetaDescription", &self.meta_description);
        element.push_field("MetaTitle", &self.meta_title);
        element.push_field("SeName", &self.se_name);
        element.push_field("ParentCategoryId", &self.parent_category_id);
        element.push_field("PictureId", &self.picture_id);
        element.push_field("PageSize", &self.page_size);
        element.push_field(
            "AllowCustomersToSelectPageSize",
            &self.allow_customers_to_select_page_size,
        );
        element.push_field("PageSizeOptions", &self.page_size_options);
        element.push_field("PriceRanges", &self.price_ranges);
        element.push_field("ShowOnHomePage", &self.show_on_home_page);
        element.push_field("IncludeInTopMenu", &self.include_in_top_menu);
        element.push_field("Published", &self.published);
        element.push_field("Deleted", &self.deleted);
        element.push_field("DisplayOrder", &self.display_order);
        element.push_field("CreatedOnUtc", &format_datetime(&self.created_on_utc));
        element.push_field("UpdatedOnUtc", &format_datetime(&self.updated_on_utc));
    }
}

impl LeafItem for ProductCategoryLink {
    fn is_referent_deleted(&self) -> bool {
        self.if_product_deleted
    }

    fn write_fields(&self, element: &mut SpecElement) {
        element.push_field("ProductCategoryId", &self.id);
        element.push_field("ProductId", &self.product_id);
        element.push_field("ProductName", &self.product_name);
        element.push_field("IsFeaturedProduct", &self.is_featured_product);
        element.push_field("DisplayOrder", &self.display_order);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Manufacturers

impl LeafItem for ProductManufacturerLink {
    fn is_referent_deleted(&self) -> bool {
        self.if_product_deleted
    }

    fn write_fields(&self, element: &mut SpecElement) {
        element.push_field("ProductManufacturerId", &self.id);
        element.push_field("ProductId", &self.product_id);
        element.push_field("ProductName", &self.product_name);
        element.push_field("IsFeaturedProduct", &self.is_featured_product);
        element.push_field("DisplayOrder", &self.display_order);
    }
}

/// `Manufacturer` element; the `Products` group is always present.
pub fn build_manufacturer_element(
    manufacturer: &Manufacturer,
    links: &[ProductManufacturerLink],
) -> SpecElement {
    let mut element = SpecElement::new("Manufacturer");
    element.push_field("ManufacturerId", &manufacturer.id);
    element.push_field("Name", &manufacturer.name);
    element.push_field("Description", &manufacturer.description);
    element.push_field("ManufacturerTemplateId", &manufacturer.manufacturer_template_id);
    element.push_field("MetaKeywords", &manufacturer.meta_keywords);
    element.push_field("MetaDescription", &manufacturer.meta_description);
    element.push_field("MetaTitle", &manufacturer.meta_title);
    element.push_field("SEName", &manufacturer.se_name);
    element.push_field("PictureId", &manufacturer.picture_id);
    element.push_field("PageSize", &manufacturer.page_size);
    element.push_field(
        "AllowCustomersToSelectPageSize",
        &manufacturer.allow_customers_to_select_page_size,
    );
    element.push_field("PageSizeOptions", &manufacturer.page_size_options);
    element.push_field("PriceRanges", &manufacturer.price_ranges);
    element.push_field("Published", &manufacturer.published);
    element.push_field("Deleted", &manufacturer.deleted);
    element.push_field("DisplayOrder", &manufacturer.display_order);
    element.push_field("CreatedOnUtc", &format_datetime(&manufacturer.created_on_utc));
    element.push_field("UpdatedOnUtc", &format_datetime(&manufacturer.updated_on_utc));

    element.push_child(build_leaf_group("Products", "ProductManufacturer", links));
    element
}

/// Group element holding one child per live leaf.
pub fn build_leaf_group<L: LeafItem>(c_group: &str, c_leaf: &str, leaves: &[L]) -> SpecElement {
    let mut group = SpecElement::new(c_group);
    for leaf in leaves.iter().filter(|leaf| !leaf.is_referent_deleted()) {
        let mut element = SpecElement::new(c_leaf);
        leaf.write_fields(&mut element);
        group.push_child(element);
    }
    group
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Products

/// Appends scalar fields, skipping those whose editor toggle is off.
struct ProductFieldWriter<'a> {
    element: &'a mut SpecElement,
    flags: &'a SpecModeFlags,
}

impl ProductFieldWriter<'_> {
    fn field<V: ToXmlText + ?Sized>(&mut self, name: &str, value: &V) {
        self.element.push_field(name, value);
    }

    fn toggled<V: ToXmlText + ?Sized>(&mut self, c_toggle: &str, name: &str, value: &V) {
        if self.flags.is_toggle_on(c_toggle) {
            self.element.push_field(name, value);
        }
    }
}

/// Enum name of a gift card type; unknown ids keep their number.
fn format_gift_card_type(n_id: i64) -> String {
    match n_id {
        0 => "Virtual".to_string(),
        1 => "Physical".to_string(),
        _ => n_id.to_string(),
    }
}

fn format_download_activation_type(n_id: i64) -> String {
    match n_id {
        0 => "WhenOrderIsPaid".to_string(),
        10 => "Manually".to_string(),
        _ => n_id.to_string(),
    }
}

/// `Product` element.
///
/// Toggled scalars and the discount, tier price, attribute, manufacturer,
/// specification and tag groups follow the editor toggles; pictures and
/// categories are always written.
pub fn build_product_element(
    product: &Product,
    flags: &SpecModeFlags,
    categories: &[ProductCategoryMapping],
    manufacturers: &[ProductManufacturerMapping],
) -> SpecElement {
    let mut element = SpecElement::new("Product");
    write_product_fields(product, &mut ProductFieldWriter { element: &mut element, flags });

    if flags.is_toggle_on(C_TOGGLE_DISCOUNTS) {
        let mut group = SpecElement::new("ProductDiscounts");
        for discount in &product.discounts {
            group.push_child(
                SpecElement::new("Discount")
                    .with_field("DiscountId", &discount.id)
                    .with_field("Name", &discount.name),
            );
        }
        element.push_child(group);
    }

    if flags.is_toggle_on(C_TOGGLE_TIER_PRICES) {
        let mut group = SpecElement::new("TierPrices");
        for tier_price in &product.tier_prices {
            group.push_child(
                SpecElement::new("TierPrice")
                    .with_field("TierPriceId", &tier_price.id)
                    .with_field("StoreId", &tier_price.store_id)
                    .with_field("CustomerRoleId", &tier_price.customer_role_id.unwrap_or(0))
                    .with_field("Quantity", &tier_price.quantity)
                    .with_field("Price", &tier_price.price),
            );
        }
        element.push_child(group);
    }

    if flags.is_toggle_on(C_TOGGLE_PRODUCT_ATTRIBUTES) {
        let mut group = SpecElement::new("ProductAttributes");
        for mapping in &product.attribute_mappings {
            group.push_child(build_attribute_mapping_element(mapping));
        }
        element.push_child(group);
    }

    let mut group = SpecElement::new("ProductPictures");
    for picture in &product.pictures {
        group.push_child(
            SpecElement::new("ProductPicture")
                .with_field("ProductPictureId", &picture.id)
                .with_field("PictureId", &picture.picture_id)
                .with_field("DisplayOrder", &picture.display_order),
        );
    }
    element.push_child(group);

    let mut group = SpecElement::new("ProductCategories");
    for mapping in categories {
        group.push_child(
            SpecElement::new("ProductCategory")
                .with_field("ProductCategoryId", &mapping.id)
                .with_field("CategoryId", &mapping.category_id)
                .with_field("IsFeaturedProduct", &mapping.is_featured_product)
                .with_field("DisplayOrder", &mapping.display_order),
        );
    }
    element.push_child(group);

    if flags.is_toggle_on(C_TOGGLE_MANUFACTURERS) {
        let mut group = SpecElement::new("ProductManufacturers");
        for mapping in manufacturers {
            group.push_child(
                SpecElement::new("ProductManufacturer")
                    .with_field("ProductManufacturerId", &mapping.id)
                    .with_field("ManufacturerId", &mapping.manufacturer_id)
                    .with_field("IsFeaturedProduct", &mapping.is_featured_product)
                    .with_field("DisplayOrder", &mapping.display_order),
            );
        }
        element.push_child(group);
    }

    if flags.is_toggle_on(C_TOGGLE_SPECIFICATION_ATTRIBUTES) {
        let mut group = SpecElement::new("ProductSpecificationAttributes");
        for attribute in &product.specification_attributes {
            group.push_child(
                SpecElement::new("ProductSpecificationAttribute")
                    .with_field("ProductSpecificationAttributeId", &attribute.id)
                    .with_field(
                        "SpecificationAttributeOptionId",
                        &attribute.specification_attribute_option_id,
                    )
                    .with_field("CustomValue", &attribute.custom_value)
                    .with_field("AllowFiltering", &attribute.allow_filtering)
                    .with_field("ShowOnProductPage", &attribute.show_on_product_page)
                    .with_field("DisplayOrder", &attribute.display_order),
            );
        }
        element.push_child(group);
    }

    if flags.is_toggle_on(C_TOGGLE_PRODUCT_TAGS) {
        let mut group = SpecElement::new("ProductTags");
        for tag in &product.tags {
            group.push_child(
                SpecElement::new("ProductTag")
                    .with_field("Id", &tag.id)
                    .with_field("Name", &tag.name),
            );
        }
        element.push_child(group);
    }
    element
}

fn write_product_fields(p: &Product, w: &mut ProductFieldWriter<'_>) {
    w.toggled(C_TOGGLE_ID, "ProductId", &p.id);
    w.toggled(C_TOGGLE_PRODUCT_TYPE, "ProductTypeId", &p.product_type_id);
    w.toggled(C_TOGGLE_PRODUCT_TYPE, "ParentGroupedProductId", &p.parent_grouped_product_id);
    w.toggled(C_TOGGLE_VISIBLE_INDIVIDUALLY, "VisibleIndividually", &p.visible_individually);
    w.field("Name", &p.name);
    w.field("ShortDescription", &p.short_description);
    w.field("FullDescription", &p.full_description);
    w.toggled(C_TOGGLE_ADMIN_COMMENT, "AdminComment", &p.admin_comment);
    w.toggled(C_TOGGLE_VENDOR, "VendorId", &p.vendor_id);
    w.toggled(C_TOGGLE_PRODUCT_TEMPLATE, "ProductTemplateId", &p.product_template_id);
    w.toggled(C_TOGGLE_SHOW_ON_HOME_PAGE, "ShowOnHomePage", &p.show_on_home_page);
    w.toggled(C_TOGGLE_SEO, "MetaKeywords", &p.meta_keywords);
    w.toggled(C_TOGGLE_SEO, "MetaDescription", &p.meta_description);
    w.toggled(C_TOGGLE_SEO, "MetaTitle", &p.meta_title);
    w.toggled(C_TOGGLE_SEO, "SEName", &p.se_name);
    w.toggled(C_TOGGLE_ALLOW_CUSTOMER_REVIEWS, "AllowCustomerReviews", &p.allow_customer_reviews);
    w.field("SKU", &p.sku);
    w.toggled(
        C_TOGGLE_MANUFACTURER_PART_NUMBER,
        "ManufacturerPartNumber",
        &p.manufacturer_part_number,
    );
    w.toggled(C_TOGGLE_GTIN, "Gtin", &p.gtin);
    w.toggled(C_TOGGLE_IS_GIFT_CARD, "IsGiftCard", &p.is_gift_card);
    w.toggled(C_TOGGLE_IS_GIFT_CARD, "GiftCardType", &format_gift_card_type(p.gift_card_type_id));
    w.toggled(C_TOGGLE_IS_GIFT_CARD, "OverriddenGiftCardAmount", &p.overridden_gift_card_amount);
    w.toggled(C_TOGGLE_REQUIRE_OTHER_PRODUCTS, "RequireOtherProducts", &p.require_other_products);
    w.toggled(C_TOGGLE_REQUIRE_OTHER_PRODUCTS, "RequiredProductIds", &p.required_product_ids);
    w.toggled(
        C_TOGGLE_REQUIRE_OTHER_PRODUCTS,
        "AutomaticallyAddRequiredProducts",
        &p.automatically_add_required_products,
    );
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "IsDownload", &p.is_download);
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "DownloadId", &p.download_id);
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "UnlimitedDownloads", &p.unlimited_downloads);
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "MaxNumberOfDownloads", &p.max_number_of_downloads);
    w.toggled(
        C_TOGGLE_DOWNLOADABLE_PRODUCT,
        "DownloadExpirationDays",
        &p.download_expiration_days,
    );
    w.toggled(
        C_TOGGLE_DOWNLOADABLE_PRODUCT,
        "DownloadActivationType",
        &format_download_activation_type(p.download_activation_type_id),
    );
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "HasSampleDownload", &p.has_sample_download);
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "SampleDownloadId", &p.sample_download_id);
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "HasUserAgreement", &p.has_user_agreement);
    w.toggled(C_TOGGLE_DOWNLOADABLE_PRODUCT, "UserAgreementText", &p.user_agreement_text);
    w.toggled(C_TOGGLE_RECURRING_PRODUCT, "IsRecurring", &p.is_recurring);
    w.toggled(C_TOGGLE_RECURRING_PRODUCT, "RecurringCycleLength", &p.recurring_cycle_length);
    w.toggled(C_TOGGLE_RECURRING_PRODUCT, "RecurringCyclePeriodId", &p.recurring_cycle_period_id);
    w.toggled(C_TOGGLE_RECURRING_PRODUCT, "RecurringTotalCycles", &p.recurring_total_cycles);
    w.toggled(C_TOGGLE_IS_RENTAL, "IsRental", &p.is_rental);
    w.toggled(C_TOGGLE_IS_RENTAL, "RentalPriceLength", &p.rental_price_length);
    w.toggled(C_TOGGLE_IS_RENTAL, "RentalPricePeriodId", &p.rental_price_period_id);
    w.field("IsShipEnabled", &p.is_ship_enabled);
    w.toggled(C_TOGGLE_FREE_SHIPPING, "IsFreeShipping", &p.is_free_shipping);
    w.toggled(C_TOGGLE_SHIP_SEPARATELY, "ShipSeparately", &p.ship_separately);
    w.toggled(
        C_TOGGLE_ADDITIONAL_SHIPPING_CHARGE,
        "AdditionalShippingCharge",
        &p.additional_shipping_charge,
    );
    w.toggled(C_TOGGLE_DELIVERY_DATE, "DeliveryDateId", &p.delivery_date_id);
    w.field("IsTaxExempt", &p.is_tax_exempt);
    w.field("TaxCategoryId", &p.tax_category_id);
    w.toggled(
        C_TOGGLE_ELECTRONIC_SERVICES,
        "IsTelecommunicationsOrBroadcastingOrElectronicServices",
        &p.is_telecommunications_or_broadcasting_or_electronic_services,
    );
    w.field("ManageInventoryMethodId", &p.manage_inventory_method_id);
    w.toggled(
        C_TOGGLE_USE_MULTIPLE_WAREHOUSES,
        "UseMultipleWarehouses",
        &p.use_multiple_warehouses,
    );
    w.toggled(C_TOGGLE_WAREHOUSE, "WarehouseId", &p.warehouse_id);
    w.field("StockQuantity", &p.stock_quantity);
    w.toggled(
        C_TOGGLE_DISPLAY_STOCK_AVAILABILITY,
        "DisplayStockAvailability",
        &p.display_stock_availability,
    );
    w.toggled(C_TOGGLE_DISPLAY_STOCK_QUANTITY, "DisplayStockQuantity", &p.display_stock_quantity);
    w.toggled(C_TOGGLE_MINIMUM_STOCK_QUANTITY, "MinStockQuantity", &p.min_stock_quantity);
    w.toggled(C_TOGGLE_LOW_STOCK_ACTIVITY, "LowStockActivityId", &p.low_stock_activity_id);
    w.toggled(
        C_TOGGLE_NOTIFY_ADMIN_FOR_QUANTITY_BELOW,
        "NotifyAdminForQuantityBelow",
        &p.notify_admin_for_quantity_below,
    );
    w.toggled(C_TOGGLE_BACKORDERS, "BackorderModeId", &p.backorder_mode_id);
    w.toggled(
        C_TOGGLE_ALLOW_BACK_IN_STOCK_SUBSCRIPTIONS,
        "AllowBackInStockSubscriptions",
        &p.allow_back_in_stock_subscriptions,
    );
    w.toggled(C_TOGGLE_MINIMUM_CART_QUANTITY, "OrderMinimumQuantity", &p.order_minimum_quantity);
    w.toggled(C_TOGGLE_MAXIMUM_CART_QUANTITY, "OrderMaximumQuantity", &p.order_maximum_quantity);
    w.toggled(C_TOGGLE_ALLOWED_QUANTITIES, "AllowedQuantities", &p.allowed_quantities);
    w.toggled(
        C_TOGGLE_ONLY_EXISTING_ATTRIBUTE_COMBINATIONS,
        "AllowAddingOnlyExistingAttributeCombinations",
        &p.allow_adding_only_existing_attribute_combinations,
    );
    w.toggled(C_TOGGLE_NOT_RETURNABLE, "NotReturnable", &p.not_returnable);
    w.toggled(C_TOGGLE_DISABLE_BUY_BUTTON, "DisableBuyButton", &p.disable_buy_button);
    w.toggled(
        C_TOGGLE_DISABLE_WISHLIST_BUTTON,
        "DisableWishlistButton",
        &p.disable_wishlist_button,
    );
    w.toggled(C_TOGGLE_AVAILABLE_FOR_PRE_ORDER, "AvailableForPreOrder", &p.available_for_pre_order);
    w.toggled(
        C_TOGGLE_AVAILABLE_FOR_PRE_ORDER,
        "PreOrderAvailabilityStartDateTimeUtc",
        &format_datetime_opt(p.pre_order_availability_start_date_time_utc),
    );
    w.toggled(C_TOGGLE_CALL_FOR_PRICE, "CallForPrice", &p.call_for_price);
    w.field("Price", &p.price);
    w.toggled(C_TOGGLE_OLD_PRICE, "OldPrice", &p.old_price);
    w.toggled(C_TOGGLE_PRODUCT_COST, "ProductCost", &p.product_cost);
    w.toggled(C_TOGGLE_SPECIAL_PRICE, "SpecialPrice", &p.special_price);
    w.toggled(
        C_TOGGLE_SPECIAL_PRICE_START_DATE,
        "SpecialPriceStartDateTimeUtc",
        &format_datetime_opt(p.special_price_start_date_time_utc),
    );
    w.toggled(
        C_TOGGLE_SPECIAL_PRICE_END_DATE,
        "SpecialPriceEndDateTimeUtc",
        &format_datetime_opt(p.special_price_end_date_time_utc),
    );
    w.toggled(C_TOGGLE_CUSTOMER_ENTERS_PRICE, "CustomerEntersPrice", &p.customer_enters_price);
    w.toggled(
        C_TOGGLE_CUSTOMER_ENTERS_PRICE,
        "MinimumCustomerEnteredPrice",
        &p.minimum_customer_entered_price,
    );
    w.toggled(
        C_TOGGLE_CUSTOMER_ENTERS_PRICE,
        "MaximumCustomerEnteredPrice",
        &p.maximum_customer_entered_price,
    );
    w.toggled(C_TOGGLE_PAN_GERMAN_PRICE_UNITS, "BasepriceEnabled", &p.basepricing_enabled);
    w.toggled(C_TOGGLE_PAN_GERMAN_PRICE_UNITS, "BasepriceAmount", &p.baseprice_amount);
    w.toggled(C_TOGGLE_PAN_GERMAN_PRICE_UNITS, "BasepriceUnitId", &p.baseprice_unit_id);
    w.toggled(C_TOGGLE_PAN_GERMAN_PRICE_UNITS, "BasepriceBaseAmount", &p.baseprice_base_amount);
    w.toggled(C_TOGGLE_PAN_GERMAN_PRICE_UNITS, "BasepriceBaseUnitId", &p.baseprice_base_unit_id);
    w.toggled(C_TOGGLE_MARK_AS_NEW, "MarkAsNew", &p.mark_as_new);
    w.toggled(
        C_TOGGLE_MARK_AS_NEW_START_DATE,
        "MarkAsNewStartDateTimeUtc",
        &format_datetime_opt(p.mark_as_new_start_date_time_utc),
    );
    w.toggled(
        C_TOGGLE_MARK_AS_NEW_END_DATE,
        "MarkAsNewEndDateTimeUtc",
        &format_datetime_opt(p.mark_as_new_end_date_time_utc),
    );
    w.toggled(C_TOGGLE_WEIGHT, "Weight", &p.weight);
    w.toggled(C_TOGGLE_DIMENSIONS, "Length", &p.length);
    w.toggled(C_TOGGLE_DIMENSIONS, "Width", &p.width);
    w.toggled(C_TOGGLE_DIMENSIONS, "Height", &p.height);
    w.toggled(C_TOGGLE_PUBLISHED, "Published", &p.published);
    w.toggled(C_TOGGLE_CREATED_ON, "CreatedOnUtc", &format_datetime(&p.created_on_utc));
    w.toggled(C_TOGGLE_UPDATED_ON, "UpdatedOnUtc", &format_datetime(&p.updated_on_utc));
}

fn build_attribute_mapping_element(mapping: &ProductAttributeMapping) -> SpecElement {
    let mut element = SpecElement::new("ProductAttributeMapping")
        .with_field("ProductAttributeMappingId", &mapping.id)
        .with_field("ProductAttributeId", &mapping.attribute_id)
        .with_field("ProductAttributeName", &mapping.attribute_name)
        .with_field("TextPrompt", &mapping.text_prompt)
        .with_field("IsRequired", &mapping.is_required)
        .with_field("AttributeControlTypeId", &mapping.attribute_control_type_id)
        .with_field("DisplayOrder", &mapping.display_order);

    if mapping.allows_validation_rules() {
        if let Some(n_len) = mapping.validation_min_length {
            element.push_field("ValidationMinLength", &n_len);
        }
        if let Some(n_len) = mapping.validation_max_length {
            element.push_field("ValidationMaxLength", &n_len);
        }
        if let Some(c_ext) = mapping
            .validation_file_allowed_extensions
            .as_deref()
            .filter(|c_ext| !c_ext.is_empty())
        {
            element.push_field("ValidationFileAllowedExtensions", c_ext);
        }
        if let Some(n_size) = mapping.validation_file_maximum_size {
            element.push_field("ValidationFileMaximumSize", &n_size);
        }
        element.push_field("DefaultValue", &mapping.default_value);
    }
    element.push_field("ConditionAttributeXml", &mapping.condition_attribute_xml);

    let mut group = SpecElement::new("ProductAttributeValues");
    for value in &mapping.values {
        group.push_child(build_attribute_value_element(value));
    }
    element.push_child(group);
    element
}

fn build_attribute_value_element(value: &ProductAttributeValue) -> SpecElement {
    SpecElement::new("ProductAttributeValue")
        .with_field("ProductAttributeValueId", &value.id)
        .with_field("Name", &value.name)
        .with_field("AttributeValueTypeId", &value.attribute_value_type_id)
        .with_field("AssociatedProductId", &value.associated_product_id)
        .with_field("ColorSquaresRgb", &value.color_squares_rgb)
        .with_field("ImageSquaresPictureId", &value.image_squares_picture_id)
        .with_field("PriceAdjustment", &value.price_adjustment)
        .with_field("WeightAdjustment", &value.weight_adjustment)
        .with_field("Cost", &value.cost)
        .with_field("CustomerEntersQty", &value.customer_enters_qty)
        .with_field("Quantity", &value.quantity)
        .with_field("IsPreSelected", &value.is_pre_selected)
        .with_field("DisplayOrder", &value.display_order)
        .with_field("PictureId", &value.picture_id)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Orders

/// `Order` element; `OrderItems` and `Shipments` appear only when non-empty.
pub fn build_order_element(order: &Order) -> SpecElement {
    let mut element = SpecElement::new("Order");
    element.push_field("OrderId", &order.id);
    element.push_field("StoreId", &order.store_id);
    element.push_field("OrderGuid", &order.order_guid);
    element.push_field("CustomerId", &order.customer_id);
    element.push_field("OrderStatusId", &order.order_status_id);
    element.push_field("PaymentStatusId", &order.payment_status_id);
    element.push_field("ShippingStatusId", &order.shipping_status_id);
    element.push_field("CustomerLanguageId", &order.customer_language_id);
    element.push_field("CustomerTaxDisplayTypeId", &order.customer_tax_display_type_id);
    element.push_field("CustomerIp", &order.customer_ip);
    element.push_field("OrderSubtotalInclTax", &order.order_subtotal_incl_tax);
    element.push_field("OrderSubtotalExclTax", &order.order_subtotal_excl_tax);
    element.push_field(
        "OrderSubTotalDiscountInclTax",
        &order.order_sub_total_discount_incl_tax,
    );
    element.push_field(
        "OrderSubTotalDiscountExclTax",
        &order.order_sub_total_discount_excl_tax,
    );
    element.push_field("OrderShippingInclTax", &order.order_shipping_incl_tax);
    element.push_field("OrderShippingExclTax", &order.order_shipping_excl_tax);
    element.push_field(
        "PaymentMethodAdditionalFeeInclTax",
        &order.payment_method_additional_fee_incl_tax,
    );
    element.push_field(
        "PaymentMethodAdditionalFeeExclTax",
        &order.payment_method_additional_fee_excl_tax,
    );
    element.push_field("TaxRates", &order.tax_rates);
    element.push_field("OrderTax", &order.order_tax);
    element.push_field("OrderTotal", &order.order_total);
    element.push_field("RefundedAmount", &order.refunded_amount);
    element.push_field("OrderDiscount", &order.order_discount);
    element.push_field("CurrencyRate", &order.currency_rate);
    element.push_field("CustomerCurrencyCode", &order.customer_currency_code);
    element.push_field("AffiliateId", &order.affiliate_id);
    element.push_field(
        "AllowStoringCreditCardNumber",
        &order.allow_storing_credit_card_number,
    );
    element.push_field("PaymentMethodSystemName", &order.payment_method_system_name);
    element.push_field("ShippingPickUpInStore", &order.pick_up_in_store);
    element.push_field("ShippingMethod", &order.shipping_method);
    element.push_field(
        "ShippingRateComputationMethodSystemName",
        &order.shipping_rate_computation_method_system_name,
    );
    element.push_field("CustomValuesXml", &order.custom_values_xml);
    element.push_field("VatNumber", &order.vat_number);
    element.push_field("Deleted", &order.deleted);
    element.push_field("CreatedOnUtc", &format_datetime(&order.created_on_utc));
    element.push_field("PaidDateUtc", &format_datetime_opt(order.paid_date_utc));

    if !order.items.is_empty() {
        let mut group = SpecElement::new("OrderItems");
        for item in &order.items {
            group.push_child(build_order_item_element(item));
        }
        element.push_child(group);
    }

    if !order.shipments.is_empty() {
        let mut l_shipments: Vec<&Shipment> = order.shipments.iter().collect();
        l_shipments.sort_by_key(|shipment| (shipment.created_on_utc, shipment.id));
        let mut group = SpecElement::new("Shipments");
        for shipment in l_shipments {
            group.push_child(build_shipment_element(shipment));
        }
        element.push_child(group);
    }
    element
}

fn build_order_item_element(item: &OrderItem) -> SpecElement {
    SpecElement::new("OrderItem")
        .with_field("Id", &item.id)
        .with_field("OrderItemGuid", &item.order_item_guid)
        .with_field("Name", &item.product_name)
        .with_field("Sku", &item.sku)
        .with_field("PriceExclTax", &item.unit_price_excl_tax)
        .with_field("PriceInclTax", &item.unit_price_incl_tax)
        .with_field("Quantity", &item.quantity)
        .with_field("DiscountExclTax", &item.discount_amount_excl_tax)
        .with_field("DiscountInclTax", &item.discount_amount_incl_tax)
        .with_field("TotalExclTax", &item.price_excl_tax)
        .with_field("TotalInclTax", &item.price_incl_tax)
        .with_field("ProductId", &item.product_id)
        .with_field("AttributeDescription", &item.attribute_description)
        .with_field("DownloadCount", &item.download_count)
        .with_field("IsDownloadActivated", &item.is_download_activated)
}

fn build_shipment_element(shipment: &Shipment) -> SpecElement {
    SpecElement::new("Shipment")
        .with_field("ShipmentId", &shipment.id)
        .with_field("TrackingNumber", &shipment.tracking_number)
        .with_field("TotalWeight", &shipment.total_weight)
        .with_field("ShippedDateUtc", &format_datetime_opt(shipment.shipped_date_utc))
        .with_field("DeliveryDateUtc", &format_datetime_opt(shipment.delivery_date_utc))
        .with_field("CreatedOnUtc", &format_datetime(&shipment.created_on_utc))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Customers

/// `Customer` element with one `Newsletter-in-store-{id}` flag per store.
///
/// `l_newsletter` pairs each store id with whether the customer holds an
/// active subscription there. Password material is never written.
pub fn build_customer_element(customer: &Customer, l_newsletter: &[(i64, bool)]) -> SpecElement {
    let mut element = SpecElement::new("Customer")
        .with_field("CustomerId", &customer.id)
        .with_field("CustomerGuid", &customer.customer_guid)
        .with_field("Email", &customer.email)
        .with_field("Username", &customer.username)
        .with_field("IsTaxExempt", &customer.is_tax_exempt)
        .with_field("AffiliateId", &customer.affiliate_id)
        .with_field("VendorId", &customer.vendor_id)
        .with_field("Active", &customer.active)
        .with_field("IsGuest", &customer.is_guest)
        .with_field("IsRegistered", &customer.is_registered)
        .with_field("IsAdministrator", &customer.is_administrator)
        .with_field("IsForumModerator", &customer.is_forum_moderator)
        .with_field("FirstName", &customer.first_name)
        .with_field("LastName", &customer.last_name)
        .with_field("Gender", &customer.gender)
        .with_field("Company", &customer.company)
        .with_field("CountryId", &customer.country_id)
        .with_field("StreetAddress", &customer.street_address)
        .with_field("StreetAddress2", &customer.street_address2)
        .with_field("ZipPostalCode", &customer.zip_postal_code)
        .with_field("City", &customer.city)
        .with_field("StateProvinceId", &customer.state_province_id)
        .with_field("Phone", &customer.phone)
        .with_field("Fax", &customer.fax)
        .with_field("VatNumber", &customer.vat_number)
        .with_field("VatNumberStatusId", &customer.vat_number_status_id)
        .with_field("TimeZoneId", &customer.time_zone_id);

    for (n_store_id, if_subscribed) in l_newsletter {
        element.push_field(&format!("Newsletter-in-store-{n_store_id}"), if_subscribed);
    }

    element.push_field("AvatarPictureId", &customer.avatar_picture_id);
    element.push_field("ForumPostCount", &customer.forum_post_count);
    element.push_field("Signature", &customer.signature);
    element
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::entity::{ProductTag, TierPrice};

    fn at(n_day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, n_day)
            .and_then(|date| date.and_hms_opt(8, 30, 0))
            .unwrap()
    }

    #[test]
    fn test_root_category_has_no_parent() {
        let category = Category {
            id: 4,
            ..Default::default()
        };
        assert_eq!(category.parent_id(), None);
        let category = Category {
            id: 5,
            parent_category_id: 4,
            ..Default::default()
        };
        assert_eq!(category.parent_id(), Some(4));
    }

    #[test]
    fn test_order_groups_only_when_present() {
        let element = build_order_element(&Order::default());
        assert!(element.child("OrderItems").is_none());
        assert!(element.child("Shipments").is_none());
        assert_eq!(element.field_text("PaidDateUtc"), None);
    }

    #[test]
    fn test_shipments_sorted_by_creation() {
        let order = Order {
            shipments: vec![
                Shipment {
                    id: 1,
                    created_on_utc: at(9),
                    ..Default::default()
                },
                Shipment {
                    id: 2,
                    created_on_utc: at(2),
                    ..Default::default()
                },
            ],
            items: vec![OrderItem {
                id: 7,
                ..Default::default()
            }],
            ..Default::default()
        };
        let element = build_order_element(&order);
        let l_ids: Vec<&str> = element
            .child("Shipments")
            .unwrap()
            .children
            .iter()
            .filter_map(|shipment| shipment.field_text("ShipmentId"))
            .collect();
        assert_eq!(l_ids, vec!["2", "1"]);
        assert_eq!(element.child("OrderItems").unwrap().children.len(), 1);
        assert_eq!(
            element.child("Shipments").unwrap().children[0].field_text("CreatedOnUtc"),
            Some("2024-03-02 08:30:00")
        );
    }

    #[test]
    fn test_manufacturer_products_group_is_always_emitted() {
        let manufacturer = Manufacturer {
            id: 3,
            name: "Acme".to_string(),
            ..Default::default()
        };
        let links = vec![ProductManufacturerLink {
            product_id: 9,
            if_product_deleted: true,
            ..Default::default()
        }];
        let element = build_manufacturer_element(&manufacturer, &links);
        assert_eq!(element.field_text("SEName"), Some(""));
        let group = element.child("Products").unwrap();
        assert!(group.children.is_empty());
    }

    fn flags_with(l_on: &[&str]) -> SpecModeFlags {
        let mut flags = SpecModeFlags::new(false);
        for c_toggle in TUP_PRODUCT_EDITOR_TOGGLES {
            flags = flags.with_toggle(c_toggle, l_on.contains(&c_toggle));
        }
        flags
    }

    #[test]
    fn test_product_element_omits_toggled_off_fields_and_groups() {
        let product = Product {
            id: 7,
            name: "Atlas".to_string(),
            price: 9.5,
            tier_prices: vec![TierPrice {
                id: 1,
                ..Default::default()
            }],
            ..Default::default()
        };
        let element = build_product_element(&product, &flags_with(&[]), &[], &[]);
        let l_names: Vec<&str> = element.children.iter().map(|child| child.name.as_str()).collect();
        assert_eq!(
            l_names,
            vec![
                "Name",
                "ShortDescription",
                "FullDescription",
                "SKU",
                "IsShipEnabled",
                "IsTaxExempt",
                "TaxCategoryId",
                "ManageInventoryMethodId",
                "StockQuantity",
                "Price",
                "ProductPictures",
                "ProductCategories",
            ]
        );
        assert_eq!(element.field_text("Price"), Some("9.5"));

        let element = build_product_element(
            &product,
            &flags_with(&[C_TOGGLE_ID, C_TOGGLE_TIER_PRICES]),
            &[],
            &[],
        );
        assert_eq!(element.field_text("ProductId"), Some("7"));
        assert_eq!(element.child("TierPrices").unwrap().children.len(), 1);
        assert!(element.child("ProductManufacturers").is_none());
    }

    #[test]
    fn test_product_element_nests_attributes_and_price_tiers() {
        let product = Product {
            id: 7,
            gift_card_type_id: 1,
            tier_prices: vec![TierPrice {
                id: 3,
                quantity: 5,
                price: 8.0,
                ..Default::default()
            }],
            tags: vec![ProductTag {
                id: 2,
                name: "sale".to_string(),
            }],
            attribute_mappings: vec![
                ProductAttributeMapping {
                    id: 11,
                    attribute_id: 1,
                    attribute_name: "Colour".to_string(),
                    attribute_control_type_id: 1,
                    validation_min_length: Some(2),
                    values: vec![ProductAttributeValue {
                        id: 5,
                        name: "Red".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                ProductAttributeMapping {
                    id: 12,
                    attribute_id: 2,
                    attribute_name: "Engraving".to_string(),
                    attribute_control_type_id: 4,
                    validation_max_length: Some(20),
                    validation_file_allowed_extensions: Some(String::new()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let manufacturers = vec![ProductManufacturerMapping {
            id: 4,
            manufacturer_id: 9,
            ..Default::default()
        }];
        let element =
            build_product_element(&product, &SpecModeFlags::new(true), &[], &manufacturers);

        assert_eq!(element.field_text("ProductId"), Some("7"));
        assert_eq!(element.field_text("GiftCardType"), Some("Physical"));
        assert_eq!(
            element.field_text("DownloadActivationType"),
            Some("WhenOrderIsPaid")
        );

        let tier_price = &element.child("TierPrices").unwrap().children[0];
        assert_eq!(tier_price.field_text("CustomerRoleId"), Some("0"));
        assert_eq!(tier_price.field_text("Quantity"), Some("5"));

        let l_mappings: Vec<&SpecElement> = element
            .child("ProductAttributes")
            .unwrap()
            .children_named("ProductAttributeMapping")
            .collect();
        assert_eq!(l_mappings.len(), 2);
        // Drop-down lists take no validation rules.
        assert!(l_mappings[0].child("ValidationMinLength").is_none());
        assert!(l_mappings[0].child("DefaultValue").is_none());
        assert_eq!(
            l_mappings[0].child("ProductAttributeValues").unwrap().children[0].field_text("Name"),
            Some("Red")
        );
        assert_eq!(l_mappings[1].field_text("ValidationMaxLength"), Some("20"));
        assert!(l_mappings[1].child("ValidationFileAllowedExtensions").is_none());
        assert!(l_mappings[1].child("DefaultValue").is_some());
        assert!(l_mappings[1].child("ConditionAttributeXml").is_some());
        assert!(
            l_mappings[1]
                .child("ProductAttributeValues")
                .unwrap()
                .children
                .is_empty()
        );

        assert_eq!(
            element.child("ProductManufacturers").unwrap().children[0].field_text("ManufacturerId"),
            Some("9")
        );
        assert_eq!(
            element.child("ProductTags").unwrap().children[0].field_text("Name"),
            Some("sale")
        );
        assert!(
            element
                .child("ProductSpecificationAttributes")
                .unwrap()
                .children
                .is_empty()
        );
    }

    #[test]
    fn test_customer_element_flags_newsletter_per_store() {
        let customer = Customer {
            id: 3,
            email: Some("a@example.com".to_string()),
            ..Default::default()
        };
        let element = build_customer_element(&customer, &[(1, true), (2, false)]);
        assert_eq!(element.field_text("Newsletter-in-store-1"), Some("True"));
        assert_eq!(element.field_text("Newsletter-in-store-2"), Some("False"));

        let l_names: Vec<&str> = element.children.iter().map(|child| child.name.as_str()).collect();
        let n_tz = l_names.iter().position(|c_name| *c_name == "TimeZoneId").unwrap();
        assert_eq!(l_names[n_tz + 1], "Newsletter-in-store-1");
        assert_eq!(l_names.last(), Some(&"Signature"));
        assert!(
            l_names
                .iter()
                .all(|c_name| !c_name.to_lowercase().contains("password"))
        );
    }
}
