//! Field descriptors, document model, options and errors.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::conf::{
    C_SHEET_NAME_DETAIL_DOMAINS, C_SHEET_NAME_MASTER_DOMAINS, EnumFmtKey,
    N_DETAIL_COL_OFFSET_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification consumed by the xlsx encoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldValues

/// Value produced by a field accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumFieldValue {
    /// Absent value.
    Null,
    /// Boolean flag.
    Boolean(bool),
    /// Whole number.
    Integer(i64),
    /// Fractional number.
    Decimal(f64),
    /// Free text.
    String(String),
    /// Naive (UTC by convention) timestamp.
    DateTime(NaiveDateTime),
}

impl EnumFieldValue {
    /// Text form used for domain codes and markup output.
    ///
    /// Booleans render as `True`/`False`; `Null` renders as empty text.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Boolean(val) => if *val { "True" } else { "False" }.to_string(),
            Self::Integer(val) => val.to_string(),
            Self::Decimal(val) => val.to_string(),
            Self::String(val) => val.clone(),
            Self::DateTime(val) => val.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Whether the value is `Null` or empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(val) => val.is_empty(),
            _ => false,
        }
    }
}

impl From<bool> for EnumFieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for EnumFieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for EnumFieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for EnumFieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for EnumFieldValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<String> for EnumFieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for EnumFieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<&String> for EnumFieldValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<NaiveDateTime> for EnumFieldValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<V: Into<EnumFieldValue>> From<Option<V>> for EnumFieldValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Typed cell value stored in the document model.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Timestamp value.
    DateTime(NaiveDateTime),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldDescriptor

/// Ordered `(code, label)` pairs constraining a field's values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SpecValueDomain {
    items: Vec<(String, String)>,
}

impl SpecValueDomain {
    /// Build a domain from `(code, label)` pairs, keeping their order.
    pub fn new<I, C, L>(items: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: ToString,
        L: Into<String>,
    {
        Self {
            items: items
                .into_iter()
                .map(|(code, label)| (code.to_string(), label.into()))
                .collect(),
        }
    }

    /// All `(code, label)` pairs.
    pub fn items(&self) -> &[(String, String)] {
        &self.items
    }

    /// Codes in domain order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|(code, _)| code.as_str())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the domain has no pairs.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Inclusion rule evaluated once per export call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnumFieldCondition {
    /// Always exported.
    #[default]
    Always,
    /// Exported in advanced mode, otherwise only when the named toggle is on.
    Toggle(String),
    /// Exported only in advanced mode.
    AdvancedOnly,
}

/// Accessor returning a field value, or a fault message.
pub type FnFieldAccessor<T> = Arc<dyn Fn(&T) -> Result<EnumFieldValue, String> + Send + Sync>;

/// One exportable column of record type `T`.
pub struct SpecFieldDescriptor<T> {
    /// Header text and stable identifier.
    pub name: String,
    accessor: FnFieldAccessor<T>,
    /// Inclusion rule.
    pub condition: EnumFieldCondition,
    /// Dropdown domain; `None` accepts free-form input.
    pub domain: Option<SpecValueDomain>,
    /// Let the consuming application accept blank cells for domain fields.
    pub if_allow_blank: bool,
    /// Detail block offset; the field lands at `offset + position`.
    pub layout_offset: Option<usize>,
}

impl<T> SpecFieldDescriptor<T> {
    /// Descriptor with a total accessor.
    pub fn new<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<EnumFieldValue>,
    {
        Self::new_fallible(name, move |record: &T| Ok(accessor(record).into()))
    }

    /// Descriptor whose accessor may fault.
    pub fn new_fallible<F>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Result<EnumFieldValue, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            accessor: Arc::new(accessor),
            condition: EnumFieldCondition::Always,
            domain: None,
            if_allow_blank: false,
            layout_offset: None,
        }
    }

    /// Replace the inclusion rule.
    pub fn with_condition(mut self, condition: EnumFieldCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Shorthand for [`EnumFieldCondition::Toggle`].
    pub fn with_toggle(self, toggle: impl Into<String>) -> Self {
        self.with_condition(EnumFieldCondition::Toggle(toggle.into()))
    }

    /// Attach a dropdown domain.
    pub fn with_domain(mut self, domain: SpecValueDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set blank acceptance for the dropdown.
    pub fn with_allow_blank(mut self, if_allow_blank: bool) -> Self {
        self.if_allow_blank = if_allow_blank;
        self
    }

    /// Set the detail block column start.
    pub fn with_layout_offset(mut self, layout_offset: usize) -> Self {
        self.layout_offset = Some(layout_offset);
        self
    }

    /// Evaluate the accessor for one record.
    pub fn evaluate(&self, record: &T) -> Result<EnumFieldValue, String> {
        (self.accessor)(record)
    }

    /// Domain if present and non-empty.
    pub fn effective_domain(&self) -> Option<&SpecValueDomain> {
        self.domain.as_ref().filter(|domain| !domain.is_empty())
    }
}

impl<T> Clone for SpecFieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            accessor: Arc::clone(&self.accessor),
            condition: self.condition.clone(),
            domain: self.domain.clone(),
            if_allow_blank: self.if_allow_blank,
            layout_offset: self.layout_offset,
        }
    }
}

impl<T> fmt::Debug for SpecFieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecFieldDescriptor")
            .field("name", &self.name)
            .field("condition", &self.condition)
            .field("domain", &self.domain)
            .field("if_allow_blank", &self.if_allow_blank)
            .field("layout_offset", &self.layout_offset)
            .finish_non_exhaustive()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentModel

/// Sheet visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumSheetVisibility {
    /// Shown to the user.
    #[default]
    Visible,
    /// Hidden auxiliary sheet.
    Hidden,
}

/// One typed cell placed at a zero-based column.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCell {
    /// Zero-based column index.
    pub col: usize,
    /// Cell content.
    pub value: EnumCellValue,
    /// Format preset.
    pub fmt: EnumFmtKey,
}

/// One sheet row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRow {
    /// Cells in ascending column order.
    pub cells: Vec<SpecCell>,
    /// Outline depth; `0` for master rows, `1` for detail rows.
    pub outline_level: u8,
    /// Row belongs to a collapsed group.
    pub if_collapsed: bool,
}

impl SpecRow {
    /// Cell at `col`, if written.
    pub fn cell(&self, col: usize) -> Option<&SpecCell> {
        self.cells.iter().find(|cell| cell.col == col)
    }

    /// Cell texts in column order (numbers via `Display`, blanks empty).
    pub fn texts(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|cell| match &cell.value {
                EnumCellValue::None => String::new(),
                EnumCellValue::String(val) => val.clone(),
                EnumCellValue::Number(val) => val.to_string(),
                EnumCellValue::Boolean(val) => val.to_string(),
                EnumCellValue::DateTime(val) => val.to_string(),
            })
            .collect()
    }
}

/// One worksheet; row 1 of the sheet is `rows[0]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheet {
    /// Unique sheet name.
    pub name: String,
    /// Visibility flag.
    pub visibility: EnumSheetVisibility,
    /// Contiguous rows.
    pub rows: Vec<SpecRow>,
}

impl SpecSheet {
    /// Empty visible sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Empty hidden sheet.
    pub fn new_hidden(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: EnumSheetVisibility::Hidden,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet is hidden.
    pub fn is_hidden(&self) -> bool {
        self.visibility == EnumSheetVisibility::Hidden
    }
}

/// Inclusive rectangular range on a named sheet (zero-based).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellRange {
    /// Sheet holding the range.
    pub sheet_name: String,
    /// First row.
    pub row_first: usize,
    /// First column.
    pub col_first: usize,
    /// Last row (inclusive).
    pub row_last: usize,
    /// Last column (inclusive).
    pub col_last: usize,
}

impl SpecCellRange {
    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.row_last - self.row_first + 1
    }
}

/// Dropdown binding from a primary-sheet range to an auxiliary source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecValidationRule {
    /// Field that owns the binding.
    pub field_name: String,
    /// Cells constrained on the primary sheet.
    pub target: SpecCellRange,
    /// Allowed codes on the auxiliary sheet.
    pub source: SpecCellRange,
    /// Blank cells accepted by the consuming application.
    pub if_allow_blank: bool,
}

/// Complete tabular document handed to the caller by value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDocument {
    /// Sheets in workbook order; the primary sheet is first.
    pub sheets: Vec<SpecSheet>,
    /// Dropdown bindings.
    pub validations: Vec<SpecValidationRule>,
    /// Write statistics.
    pub report: SpecExportReport,
}

impl SpecDocument {
    /// Sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&SpecSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// First sheet.
    pub fn primary(&self) -> Option<&SpecSheet> {
        self.sheets.first()
    }

    /// Hidden sheets in workbook order.
    pub fn auxiliary_sheets(&self) -> impl Iterator<Item = &SpecSheet> {
        self.sheets.iter().filter(|sheet| sheet.is_hidden())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Replacement text for missing and non-finite values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for missing value when keep-missing is enabled.
    pub missing_value_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Value conversion policy.
    pub value_policy: SpecXlsxValuePolicy,
    /// Write missing values as text instead of blank cells.
    pub if_keep_missing_values: bool,
    /// Back domain fields with auxiliary sheets and validation rules.
    pub if_use_dropdown_lists: bool,
    /// Detail block column start for fields without a layout offset.
    pub n_detail_col_offset: usize,
    /// Auxiliary sheet for master-field domains.
    pub sheet_name_master_domains: String,
    /// Auxiliary sheet for detail-field domains.
    pub sheet_name_detail_domains: String,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            value_policy: SpecXlsxValuePolicy::default(),
            if_keep_missing_values: false,
            if_use_dropdown_lists: true,
            n_detail_col_offset: N_DETAIL_COL_OFFSET_DEFAULT,
            sheet_name_master_domains: C_SHEET_NAME_MASTER_DOMAINS.to_string(),
            sheet_name_detail_domains: C_SHEET_NAME_DETAIL_DOMAINS.to_string(),
        }
    }
}

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only (default).
    #[default]
    Header,
    /// Infer width from body cells only.
    Body,
    /// Infer width from both header and body cells.
    All,
}

/// Autofit policy applied by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected when body-based inference is active.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Encoder options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxEncodeOptions {
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Freeze the header row of visible sheets.
    pub if_freeze_header: bool,
}

impl Default for SpecXlsxEncodeOptions {
    fn default() -> Self {
        Self {
            policy_autofit: SpecAutofitCellsPolicy::default(),
            if_freeze_header: true,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-document write statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Primary sheet name.
    pub sheet_name: String,
    /// Master records written.
    pub cnt_records: u64,
    /// Detail rows written (headers included).
    pub cnt_detail_rows: u64,
    /// Detail blocks emitted.
    pub cnt_detail_blocks: u64,
    /// Domain columns placed on auxiliary sheets.
    pub cnt_domains_allocated: u64,
    /// Domain placements served from an existing column.
    pub cnt_domains_reused: u64,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecExportReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        tracing::warn!(sheet = %self.sheet_name, "{}", msg.as_ref());
        self.warnings.push(msg.as_ref().to_string());
    }
}

impl fmt::Display for SpecExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[XLSX] sheet={} records={} detail_rows={} detail_blocks={} domains_allocated={} domains_reused={} warnings={}",
            self.sheet_name,
            self.cnt_records,
            self.cnt_detail_rows,
            self.cnt_detail_blocks,
            self.cnt_domains_allocated,
            self.cnt_domains_reused,
            self.warnings.len()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures reported by the tabular export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum XlsxExportError {
    /// The same field name appears more than once in one descriptor list.
    #[error("Duplicate field names detected: {0}")]
    DuplicateField(String),
    /// A field name is registered twice with different domains.
    #[error("Field {field:?} is registered with conflicting domains")]
    ConflictingDomain {
        /// Offending field name.
        field: String,
    },
    /// A field refers to a toggle the mode flags do not define.
    #[error("Field {field:?} refers to unknown toggle {toggle:?}")]
    UnknownToggle {
        /// Offending field name.
        field: String,
        /// Missing toggle key.
        toggle: String,
    },
    /// Two detail fields resolve to the same column.
    #[error("Field {field:?} collides with another field at column {col}")]
    ColumnCollision {
        /// Offending field name.
        field: String,
        /// Zero-based column index.
        col: usize,
    },
    /// More fields than a worksheet has columns.
    #[error("Column index {col} for field {field:?} exceeds worksheet limit {max}")]
    ColumnOverflow {
        /// Offending field name.
        field: String,
        /// Zero-based column index.
        col: usize,
        /// Worksheet column count.
        max: usize,
    },
    /// A domain does not fit one auxiliary column.
    #[error("Domain of field {field:?} has {len} values; an auxiliary column holds at most {max}")]
    DomainOverflow {
        /// Offending field name.
        field: String,
        /// Number of domain values.
        len: usize,
        /// Auxiliary column capacity.
        max: usize,
    },
    /// More rows than a worksheet holds.
    #[error("Sheet {sheet:?} exceeds worksheet row limit {max}")]
    RowOverflow {
        /// Sheet name.
        sheet: String,
        /// Worksheet row count.
        max: usize,
    },
    /// An accessor failed for one record; the export is aborted.
    #[error("Accessor for field {field:?} failed on record {record_idx}: {message}")]
    AccessorFault {
        /// Field being evaluated.
        field: String,
        /// Zero-based record position in the input sequence.
        record_idx: usize,
        /// Accessor message.
        message: String,
    },
    /// A writer that already failed cannot produce a document.
    #[error("Writer for sheet {sheet:?} failed earlier; no document is produced")]
    WriterPoisoned {
        /// Sheet name.
        sheet: String,
    },
    /// Container encoding failed.
    #[error("xlsx encode error: {0}")]
    Encode(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
