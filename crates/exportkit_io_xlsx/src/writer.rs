//! Streaming tabular writer: header row, one row per record, dropdown bindings.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::conf::{EnumFmtKey, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::domain::DomainSheetAllocator;
use crate::policy::SpecFieldSet;
use crate::spec::{
    EnumCellValue, SpecCell, SpecCellRange, SpecDocument, SpecExportReport, SpecFieldDescriptor,
    SpecRow, SpecSheet, SpecValidationRule, SpecXlsxWriteOptions, XlsxExportError,
};
use crate::util::{
    convert_field_value, derive_contiguous_ranges, derive_unique_sheet_name, sanitize_sheet_name,
};

/// How far a dropdown binding extends down its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnumBindingExtent {
    /// From the first data row to the last worksheet row.
    WholeColumn,
    /// Only the rows actually written for the field.
    WrittenRows,
}

/// Column of a domain-bearing field and the auxiliary range backing it.
#[derive(Debug, Clone)]
pub(crate) struct SpecFieldBinding {
    pub(crate) field_name: String,
    pub(crate) col: usize,
    pub(crate) source: SpecCellRange,
    pub(crate) if_allow_blank: bool,
}

/// Single-pass writer for one record type.
///
/// Row 1 holds the header; record `k` (zero-based) lands on row `k + 2`
/// unless detail rows were pushed in between. After a failed record the
/// writer is poisoned and [`Self::finish`] refuses to return a document.
pub struct TabularDocumentWriter<'a, T> {
    fields: &'a SpecFieldSet<T>,
    options: &'a SpecXlsxWriteOptions,
    pub(crate) sheet: SpecSheet,
    allocator: Option<DomainSheetAllocator>,
    l_bindings: Vec<SpecFieldBinding>,
    rule_binding_extent: EnumBindingExtent,
    l_rows_master: Vec<usize>,
    pub(crate) report: SpecExportReport,
    if_poisoned: bool,
}

impl<'a, T> TabularDocumentWriter<'a, T> {
    /// Create the primary sheet, write the header and place every domain.
    pub fn new(
        sheet_name: &str,
        fields: &'a SpecFieldSet<T>,
        options: &'a SpecXlsxWriteOptions,
    ) -> Result<Self, XlsxExportError> {
        Self::new_with_extent(sheet_name, fields, options, EnumBindingExtent::WholeColumn)
    }

    pub(crate) fn new_with_extent(
        sheet_name: &str,
        fields: &'a SpecFieldSet<T>,
        options: &'a SpecXlsxWriteOptions,
        rule_binding_extent: EnumBindingExtent,
    ) -> Result<Self, XlsxExportError> {
        let c_sheet_name = sanitize_sheet_name(sheet_name, "_");
        let l_cols: Vec<usize> = (0..fields.len()).collect();
        validate_columns(fields.fields(), &l_cols)?;

        let mut report = SpecExportReport {
            sheet_name: c_sheet_name.clone(),
            ..Default::default()
        };
        if fields.is_empty() {
            report.warn("Every field was excluded; the header row is empty.");
        }

        let mut sheet = SpecSheet::new(c_sheet_name.clone());
        sheet.rows.push(build_header_row(fields.fields(), &l_cols, 0));

        let mut allocator = None;
        let mut l_bindings = Vec::new();
        if options.if_use_dropdown_lists {
            let set_taken = BTreeSet::from([c_sheet_name]);
            let mut allocator_master = DomainSheetAllocator::new(derive_unique_sheet_name(
                &sanitize_sheet_name(&options.sheet_name_master_domains, "_"),
                &set_taken,
            ));
            l_bindings = bind_domains(fields.fields(), &l_cols, &mut allocator_master)?;
            allocator = Some(allocator_master);
        }

        tracing::debug!(
            sheet = %sheet.name,
            n_fields = fields.len(),
            n_bindings = l_bindings.len(),
            "Header written"
        );

        Ok(Self {
            fields,
            options,
            sheet,
            allocator,
            l_bindings,
            rule_binding_extent,
            l_rows_master: Vec::new(),
            report,
            if_poisoned: false,
        })
    }

    /// Primary sheet name.
    pub fn sheet_name(&self) -> &str {
        &self.sheet.name
    }

    /// Names of every sheet created so far (primary and auxiliary).
    pub(crate) fn sheet_names(&self) -> BTreeSet<String> {
        let mut set_names = BTreeSet::from([self.sheet.name.clone()]);
        if let Some(allocator) = &self.allocator {
            set_names.insert(allocator.sheet_name().to_string());
        }
        set_names
    }

    /// Options the writer was created with.
    pub(crate) fn options(&self) -> &'a SpecXlsxWriteOptions {
        self.options
    }

    /// Evaluate every field for `record` and append one row.
    pub fn write_record(&mut self, record: &T) -> Result<(), XlsxExportError> {
        self.ensure_usable()?;
        let n_record_idx = self.report.cnt_records as usize;
        let l_cols: Vec<usize> = (0..self.fields.len()).collect();
        let row = match build_record_row(
            self.fields.fields(),
            &l_cols,
            record,
            n_record_idx,
            0,
            self.options,
        ) {
            Ok(row) => row,
            Err(err) => {
                self.if_poisoned = true;
                return Err(err);
            }
        };

        let n_row = self.push_row(row)?;
        self.l_rows_master.push(n_row);
        self.report.cnt_records += 1;
        Ok(())
    }

    /// Append a prepared row and return its zero-based index.
    pub(crate) fn push_row(&mut self, row: SpecRow) -> Result<usize, XlsxExportError> {
        if self.sheet.rows.len() >= N_NROWS_EXCEL_MAX {
            self.if_poisoned = true;
            return Err(XlsxExportError::RowOverflow {
                sheet: self.sheet.name.clone(),
                max: N_NROWS_EXCEL_MAX,
            });
        }
        self.sheet.rows.push(row);
        Ok(self.sheet.rows.len() - 1)
    }

    pub(crate) fn poison(&mut self) {
        self.if_poisoned = true;
    }

    pub(crate) fn ensure_usable(&self) -> Result<(), XlsxExportError> {
        if self.if_poisoned {
            return Err(XlsxExportError::WriterPoisoned {
                sheet: self.sheet.name.clone(),
            });
        }
        Ok(())
    }

    /// Hand the completed document over to the caller.
    pub fn finish(self) -> Result<SpecDocument, XlsxExportError> {
        let doc = self.into_document()?;
        log_finished(&doc);
        Ok(doc)
    }

    pub(crate) fn into_document(self) -> Result<SpecDocument, XlsxExportError> {
        self.ensure_usable()?;

        let c_sheet_name = self.sheet.name.clone();
        let l_validations = match self.rule_binding_extent {
            EnumBindingExtent::WholeColumn => self
                .l_bindings
                .iter()
                .map(|binding| SpecValidationRule {
                    field_name: binding.field_name.clone(),
                    target: SpecCellRange {
                        sheet_name: c_sheet_name.clone(),
                        row_first: 1,
                        col_first: binding.col,
                        row_last: N_NROWS_EXCEL_MAX - 1,
                        col_last: binding.col,
                    },
                    source: binding.source.clone(),
                    if_allow_blank: binding.if_allow_blank,
                })
                .collect(),
            EnumBindingExtent::WrittenRows => {
                derive_row_bound_rules(&c_sheet_name, &self.l_bindings, &self.l_rows_master)
            }
        };

        let mut report = self.report;
        let mut l_sheets = vec![self.sheet];
        if let Some(allocator) = self.allocator {
            report.cnt_domains_allocated += allocator.cnt_allocated();
            report.cnt_domains_reused += allocator.cnt_reused();
            if let Some(sheet_aux) = allocator.into_sheet() {
                push_referenced_sheet(&mut l_sheets, &l_validations, sheet_aux);
            }
        }

        Ok(SpecDocument {
            sheets: l_sheets,
            validations: l_validations,
            report,
        })
    }
}

/// Append `sheet_aux` only when some rule sources its values from it.
pub(crate) fn push_referenced_sheet(
    l_sheets: &mut Vec<SpecSheet>,
    l_validations: &[SpecValidationRule],
    sheet_aux: SpecSheet,
) {
    if l_validations
        .iter()
        .any(|rule| rule.source.sheet_name == sheet_aux.name)
    {
        l_sheets.push(sheet_aux);
    } else {
        tracing::debug!(sheet = %sheet_aux.name, "Dropped unreferenced auxiliary sheet");
    }
}

pub(crate) fn log_finished(doc: &SpecDocument) {
    tracing::info!(
        n_sheets = doc.sheets.len(),
        cnt_validations = doc.validations.len(),
        "{}",
        doc.report
    );
}

/// Write `records` in one forward pass and return the finished document.
///
/// The first failing accessor aborts the call; no partial document escapes.
pub fn write_records<T, I, R>(
    sheet_name: &str,
    fields: &SpecFieldSet<T>,
    records: I,
    options: &SpecXlsxWriteOptions,
) -> Result<SpecDocument, XlsxExportError>
where
    I: IntoIterator<Item = R>,
    R: Borrow<T>,
{
    let mut writer = TabularDocumentWriter::new(sheet_name, fields, options)?;
    for record in records {
        writer.write_record(record.borrow())?;
    }
    writer.finish()
}

pub(crate) fn validate_columns<T>(
    fields: &[SpecFieldDescriptor<T>],
    cols: &[usize],
) -> Result<(), XlsxExportError> {
    let mut set_cols = BTreeSet::new();
    for (field, col) in fields.iter().zip(cols) {
        if *col >= N_NCOLS_EXCEL_MAX {
            return Err(XlsxExportError::ColumnOverflow {
                field: field.name.clone(),
                col: *col,
                max: N_NCOLS_EXCEL_MAX,
            });
        }
        if !set_cols.insert(*col) {
            return Err(XlsxExportError::ColumnCollision {
                field: field.name.clone(),
                col: *col,
            });
        }
    }
    Ok(())
}

pub(crate) fn bind_domains<T>(
    fields: &[SpecFieldDescriptor<T>],
    cols: &[usize],
    allocator: &mut DomainSheetAllocator,
) -> Result<Vec<SpecFieldBinding>, XlsxExportError> {
    let mut l_bindings = Vec::new();
    for (field, col) in fields.iter().zip(cols) {
        let Some(domain) = field.effective_domain() else {
            continue;
        };
        if let Some(source) = allocator.allocate(&field.name, domain)? {
            l_bindings.push(SpecFieldBinding {
                field_name: field.name.clone(),
                col: *col,
                source,
                if_allow_blank: field.if_allow_blank,
            });
        }
    }
    Ok(l_bindings)
}

pub(crate) fn build_header_row<T>(
    fields: &[SpecFieldDescriptor<T>],
    cols: &[usize],
    outline_level: u8,
) -> SpecRow {
    SpecRow {
        cells: fields
            .iter()
            .zip(cols)
            .map(|(field, col)| SpecCell {
                col: *col,
                value: EnumCellValue::String(field.name.clone()),
                fmt: EnumFmtKey::Header,
            })
            .collect(),
        outline_level,
        if_collapsed: outline_level > 0,
    }
}

pub(crate) fn build_record_row<T>(
    fields: &[SpecFieldDescriptor<T>],
    cols: &[usize],
    record: &T,
    record_idx: usize,
    outline_level: u8,
    options: &SpecXlsxWriteOptions,
) -> Result<SpecRow, XlsxExportError> {
    let mut l_cells = Vec::with_capacity(fields.len());
    for (field, col) in fields.iter().zip(cols) {
        let value = field
            .evaluate(record)
            .map_err(|message| XlsxExportError::AccessorFault {
                field: field.name.clone(),
                record_idx,
                message,
            })?;
        // Dropdown sources hold code text; matching cells must hold text too.
        let (value, fmt) = if options.if_use_dropdown_lists
            && field.effective_domain().is_some()
            && !value.is_blank()
        {
            (EnumCellValue::String(value.to_text()), EnumFmtKey::Text)
        } else {
            convert_field_value(
                &value,
                options.if_keep_missing_values,
                &options.value_policy,
            )
        };
        l_cells.push(SpecCell {
            col: *col,
            value,
            fmt,
        });
    }
    Ok(SpecRow {
        cells: l_cells,
        outline_level,
        if_collapsed: outline_level > 0,
    })
}

/// One rule per binding and per contiguous run of `rows`.
pub(crate) fn derive_row_bound_rules(
    sheet_name: &str,
    bindings: &[SpecFieldBinding],
    rows: &[usize],
) -> Vec<SpecValidationRule> {
    let l_runs = derive_contiguous_ranges(rows);
    let mut l_rules = Vec::with_capacity(bindings.len() * l_runs.len());
    for binding in bindings {
        for (n_row_first, n_row_last) in &l_runs {
            l_rules.push(SpecValidationRule {
                field_name: binding.field_name.clone(),
                target: SpecCellRange {
                    sheet_name: sheet_name.to_string(),
                    row_first: *n_row_first,
                    col_first: binding.col,
                    row_last: *n_row_last,
                    col_last: binding.col,
                },
                source: binding.source.clone(),
                if_allow_blank: binding.if_allow_blank,
            });
        }
    }
    l_rules
}
