//! `exportkit_io_xlsx` v1:
//! Descriptor-driven tabular export kernel.
//!
//! Modules:
//! - `conf`   : worksheet limits, default sheet names, format presets
//! - `spec`   : descriptors, document model, options, errors
//! - `util`   : pure helper functions
//! - `policy` : conditional field resolution
//! - `domain` : auxiliary-sheet placement of dropdown domains
//! - `writer` : streaming tabular writer
//! - `detail` : master/detail block writer
//! - `encode` : `rust_xlsxwriter` container encoder
pub mod conf;
pub mod detail;
pub mod domain;
pub mod encode;
pub mod policy;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_DETAIL_DOMAINS, C_SHEET_NAME_MASTER_DOMAINS, EnumFmtKey,
    N_DETAIL_COL_OFFSET_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_xlsx_formats,
};
pub use detail::{MasterDetailBlockWriter, write_master_detail_records};
pub use domain::DomainSheetAllocator;
pub use encode::XlsxEncoder;
pub use policy::{SpecFieldSet, SpecModeFlags, resolve_fields};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, EnumFieldCondition, EnumFieldValue, EnumSheetVisibility,
    FnFieldAccessor, SpecAutofitCellsPolicy, SpecCell, SpecCellFormat, SpecCellRange,
    SpecDocument, SpecExportReport, SpecFieldDescriptor, SpecRow, SpecSheet, SpecValidationRule,
    SpecValueDomain, SpecXlsxEncodeOptions, SpecXlsxValuePolicy, SpecXlsxWriteOptions,
    XlsxExportError,
};
pub use util::{derive_contiguous_ranges, sanitize_sheet_name};
pub use writer::{TabularDocumentWriter, write_records};
