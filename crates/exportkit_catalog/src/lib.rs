//! `exportkit_catalog` v1:
//! Catalog export facade over the tabular and markup kernels.
//!
//! Modules:
//! - `conf`   : sheet names, product editor toggles, fixed value domains
//! - `spec`   : export settings and errors
//! - `entity` : catalog entities and the `CatalogSource` lookup trait
//! - `fields` : column descriptors per sheet
//! - `markup` : element builders and tree adapters
//! - `facade` : `CatalogExporter` entry points
pub mod conf;
pub mod entity;
pub mod facade;
pub mod fields;
pub mod markup;
pub mod spec;

pub use entity::{
    Address, CatalogSource, Category, Customer, EnumLookupKind, Manufacturer,
    NewsLetterSubscription, Order, OrderItem, Product, ProductAttributeMapping,
    ProductAttributeValue, ProductCategoryLink, ProductCategoryMapping, ProductDiscount,
    ProductManufacturerLink, ProductManufacturerMapping, ProductPicture,
    ProductSpecificationAttribute, ProductTag, Shipment, StateProvince, TierPrice,
};
pub use facade::CatalogExporter;
pub use spec::{CatalogExportError, SpecExportSettings};
