//! `rust_xlsxwriter` encoder for finished [`SpecDocument`]s.

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{
    DataValidation, Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet, XlsxError,
    worksheet_range_absolute,
};

use crate::conf::{EnumFmtKey, derive_default_xlsx_formats};
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecCellRange,
    SpecDocument, SpecSheet, SpecValidationRule, SpecXlsxEncodeOptions, XlsxExportError,
};
use crate::util::derive_contiguous_ranges;

const TUP_FMT_KEYS: [EnumFmtKey; 6] = [
    EnumFmtKey::Text,
    EnumFmtKey::Integer,
    EnumFmtKey::Decimal,
    EnumFmtKey::DateTime,
    EnumFmtKey::Boolean,
    EnumFmtKey::Header,
];

/// Serializes documents into xlsx containers.
///
/// Sheets are written in document order, hidden flags honoured, level-1 row
/// runs grouped and collapsed, and each validation rule emitted as a list
/// validation sourced from its auxiliary range.
#[derive(Debug, Clone)]
pub struct XlsxEncoder {
    dict_fmt: BTreeMap<String, SpecCellFormat>,
    options: SpecXlsxEncodeOptions,
}

impl Default for XlsxEncoder {
    fn default() -> Self {
        Self::new(derive_default_xlsx_formats(), SpecXlsxEncodeOptions::default())
    }
}

impl XlsxEncoder {
    /// Encoder with named format presets (see [`EnumFmtKey::as_str`]).
    pub fn new(dict_fmt: BTreeMap<String, SpecCellFormat>, options: SpecXlsxEncodeOptions) -> Self {
        Self { dict_fmt, options }
    }

    /// Encode `doc` into an in-memory xlsx file.
    pub fn encode(&self, doc: &SpecDocument) -> Result<Vec<u8>, XlsxExportError> {
        let mut workbook = self.build_workbook(doc)?;
        workbook.save_to_buffer().map_err(derive_xlsx_error)
    }

    /// Encode `doc` and write it to `path`.
    pub fn save(&self, doc: &SpecDocument, path: impl AsRef<Path>) -> Result<(), XlsxExportError> {
        let mut workbook = self.build_workbook(doc)?;
        workbook.save(path.as_ref()).map_err(derive_xlsx_error)?;
        tracing::info!(
            path = %path.as_ref().display(),
            n_sheets = doc.sheets.len(),
            "Saved xlsx workbook"
        );
        Ok(())
    }

    fn build_workbook(&self, doc: &SpecDocument) -> Result<Workbook, XlsxExportError> {
        let dict_format: BTreeMap<EnumFmtKey, Format> = TUP_FMT_KEYS
            .iter()
            .map(|key| {
                let format = self
                    .dict_fmt
                    .get(key.as_str())
                    .map(derive_rust_xlsx_format)
                    .unwrap_or_else(Format::new);
                (*key, format)
            })
            .collect();

        let mut workbook = Workbook::new();
        for sheet in &doc.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(derive_xlsx_error)?;
            if sheet.is_hidden() {
                worksheet.set_hidden(true);
            }

            write_sheet_cells(worksheet, sheet, &dict_format)?;
            write_row_groups(worksheet, sheet)?;

            if !sheet.is_hidden() {
                if self.options.if_freeze_header && !sheet.rows.is_empty() {
                    worksheet
                        .set_freeze_panes(1, 0)
                        .map_err(derive_xlsx_error)?;
                }
                for (n_col, n_width) in derive_column_widths(sheet, &self.options.policy_autofit) {
                    worksheet
                        .set_column_width(cast_col_num(n_col)?, n_width as f64)
                        .map_err(derive_xlsx_error)?;
                }
                for rule in doc
                    .validations
                    .iter()
                    .filter(|rule| rule.target.sheet_name == sheet.name)
                {
                    write_validation(worksheet, rule)?;
                }
            }
        }

        tracing::debug!(
            n_sheets = doc.sheets.len(),
            n_validations = doc.validations.len(),
            "Built xlsx workbook"
        );
        Ok(workbook)
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region SheetWriting

fn write_sheet_cells(
    worksheet: &mut Worksheet,
    sheet: &SpecSheet,
    dict_format: &BTreeMap<EnumFmtKey, Format>,
) -> Result<(), XlsxExportError> {
    let fmt_fallback = Format::new();
    for (n_row, row) in sheet.rows.iter().enumerate() {
        for cell in &row.cells {
            let format = dict_format.get(&cell.fmt).unwrap_or(&fmt_fallback);
            write_cell_with_format(worksheet, n_row, cell.col, &cell.value, format)?;
        }
    }
    Ok(())
}

/// Group and collapse each run of outline-level rows.
fn write_row_groups(worksheet: &mut Worksheet, sheet: &SpecSheet) -> Result<(), XlsxExportError> {
    let l_rows_outlined: Vec<usize> = sheet
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.outline_level > 0)
        .map(|(n_row, _)| n_row)
        .collect();

    for (n_row_first, n_row_last) in derive_contiguous_ranges(&l_rows_outlined) {
        let if_collapsed = sheet.rows[n_row_first].if_collapsed;
        let (n_first, n_last) = (cast_row_num(n_row_first)?, cast_row_num(n_row_last)?);
        if if_collapsed {
            worksheet
                .group_rows_collapsed(n_first, n_last)
                .map_err(derive_xlsx_error)?;
        } else {
            worksheet
                .group_rows(n_first, n_last)
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

fn write_validation(
    worksheet: &mut Worksheet,
    rule: &SpecValidationRule,
) -> Result<(), XlsxExportError> {
    let validation = DataValidation::new()
        .allow_list_formula(Formula::new(derive_list_formula(&rule.source)?))
        .ignore_blank(rule.if_allow_blank);
    worksheet
        .add_data_validation(
            cast_row_num(rule.target.row_first)?,
            cast_col_num(rule.target.col_first)?,
            cast_row_num(rule.target.row_last)?,
            cast_col_num(rule.target.col_last)?,
            &validation,
        )
        .map_err(derive_xlsx_error)?;
    Ok(())
}

/// List source formula, e.g. `='Master Domains'!$A$1:$A$3`.
fn derive_list_formula(source: &SpecCellRange) -> Result<String, XlsxExportError> {
    let c_range = worksheet_range_absolute(
        &source.sheet_name,
        cast_row_num(source.row_first)?,
        cast_col_num(source.col_first)?,
        cast_row_num(source.row_last)?,
        cast_col_num(source.col_last)?,
    );
    Ok(format!("={c_range}"))
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxExportError> {
    let (n_row, n_col) = (cast_row_num(row_idx)?, cast_col_num(col_idx)?);
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(n_row, n_col, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(n_row, n_col, val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(n_row, n_col, *val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet
                .write_boolean_with_format(n_row, n_col, *val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::DateTime(val) => {
            worksheet
                .write_datetime_with_format(n_row, n_col, val, format)
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Autofit

/// Infer column widths for `sheet` under `policy`.
///
/// Row 1 is the header; outline-level rows count as body rows.
pub fn derive_column_widths(
    sheet: &SpecSheet,
    policy: &SpecAutofitCellsPolicy,
) -> BTreeMap<usize, usize> {
    let (if_header, if_body) = match policy.rule_columns {
        EnumAutofitColumnsRule::None => return BTreeMap::new(),
        EnumAutofitColumnsRule::Header => (true, false),
        EnumAutofitColumnsRule::Body => (false, true),
        EnumAutofitColumnsRule::All => (true, true),
    };

    let n_body_max = policy.height_body_inferred_max.unwrap_or(usize::MAX);
    let mut dict_width: BTreeMap<usize, usize> = BTreeMap::new();
    for (n_row, row) in sheet.rows.iter().enumerate() {
        let if_use = if n_row == 0 {
            if_header
        } else {
            if_body && n_row <= n_body_max
        };
        if !if_use {
            continue;
        }
        for cell in &row.cells {
            let n_len = estimate_width_len(&cell.value);
            let n_width = dict_width.entry(cell.col).or_insert(0);
            *n_width = (*n_width).max(n_len);
        }
    }

    dict_width
        .into_iter()
        .map(|(n_col, n_len)| {
            let n_width = (n_len + policy.width_cell_padding)
                .clamp(policy.width_cell_min, policy.width_cell_max);
            (n_col, n_width)
        })
        .collect()
}

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                (*n as i64).to_string().len()
            } else {
                format!("{n:.4}").len()
            }
        }
        EnumCellValue::Boolean(val) => if *val { 4 } else { 5 },
        EnumCellValue::DateTime(_) => 19,
    }
}

fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

fn cast_row_num(value: usize) -> Result<u32, XlsxExportError> {
    u32::try_from(value)
        .map_err(|_| XlsxExportError::Encode(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxExportError> {
    u16::try_from(value)
        .map_err(|_| XlsxExportError::Encode(format!("column index overflow: {value}")))
}

fn derive_xlsx_error(err: XlsxError) -> XlsxExportError {
    XlsxExportError::Encode(err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::policy::{SpecModeFlags, resolve_fields};
    use crate::spec::{
        EnumSheetVisibility, SpecCell, SpecFieldDescriptor, SpecRow, SpecValueDomain,
        SpecXlsxWriteOptions,
    };
    use crate::writer::write_records;

    fn sheet_with_header(l_names: &[&str]) -> SpecSheet {
        let mut sheet = SpecSheet::new("Data");
        sheet.rows.push(SpecRow {
            cells: l_names
                .iter()
                .enumerate()
                .map(|(n_col, c_name)| SpecCell {
                    col: n_col,
                    value: EnumCellValue::String(c_name.to_string()),
                    fmt: EnumFmtKey::Header,
                })
                .collect(),
            ..Default::default()
        });
        sheet
    }

    #[test]
    fn test_header_widths_are_clamped() {
        let sheet = sheet_with_header(&["Id", "ShortDescriptionOfTheProductInTheStore"]);
        let dict_width = derive_column_widths(&sheet, &SpecAutofitCellsPolicy::default());
        assert_eq!(dict_width[&0], 8);
        assert_eq!(dict_width[&1], 40);
    }

    #[test]
    fn test_autofit_none_yields_no_widths() {
        let sheet = sheet_with_header(&["Id"]);
        let policy = SpecAutofitCellsPolicy {
            rule_columns: EnumAutofitColumnsRule::None,
            ..Default::default()
        };
        assert!(derive_column_widths(&sheet, &policy).is_empty());
    }

    #[test]
    fn test_estimate_width_len_for_numbers() {
        assert_eq!(estimate_width_len(&EnumCellValue::Number(12345.0)), 5);
        assert_eq!(estimate_width_len(&EnumCellValue::Number(1.5)), 6);
        assert_eq!(estimate_width_len(&EnumCellValue::Boolean(false)), 5);
    }

    fn text_cell(col: usize, value: &str) -> SpecCell {
        SpecCell {
            col,
            value: EnumCellValue::String(value.to_string()),
            fmt: EnumFmtKey::Text,
        }
    }

    fn master_detail_document() -> SpecDocument {
        let mut sheet_primary = sheet_with_header(&["Kind", "Created"]);
        sheet_primary.rows.push(SpecRow {
            cells: vec![
                text_cell(0, "S"),
                SpecCell {
                    col: 1,
                    value: EnumCellValue::DateTime(
                        NaiveDate::from_ymd_opt(2024, 3, 1)
                            .unwrap()
                            .and_hms_opt(8, 30, 0)
                            .unwrap(),
                    ),
                    fmt: EnumFmtKey::DateTime,
                },
            ],
            ..Default::default()
        });
        for c_value in ["Red", "Blue"] {
            sheet_primary.rows.push(SpecRow {
                cells: vec![text_cell(1, c_value)],
                outline_level: 1,
                if_collapsed: true,
            });
        }

        let mut sheet_aux = SpecSheet::new("Master Domains");
        sheet_aux.visibility = EnumSheetVisibility::Hidden;
        for c_code in ["S", "M"] {
            sheet_aux.rows.push(SpecRow {
                cells: vec![text_cell(0, c_code)],
                ..Default::default()
            });
        }

        SpecDocument {
            validations: vec![SpecValidationRule {
                field_name: "Kind".to_string(),
                target: SpecCellRange {
                    sheet_name: "Data".to_string(),
                    row_first: 1,
                    col_first: 0,
                    row_last: 1,
                    col_last: 0,
                },
                source: SpecCellRange {
                    sheet_name: "Master Domains".to_string(),
                    row_first: 0,
                    col_first: 0,
                    row_last: 1,
                    col_last: 0,
                },
                if_allow_blank: false,
            }],
            sheets: vec![sheet_primary, sheet_aux],
            ..Default::default()
        }
    }

    #[test]
    fn test_list_formula_quotes_sheet_names_when_needed() {
        let doc = master_detail_document();
        assert_eq!(
            derive_list_formula(&doc.validations[0].source).unwrap(),
            "='Master Domains'!$A$1:$A$2"
        );

        let source = SpecCellRange {
            sheet_name: "DataForProductsFilters".to_string(),
            row_first: 0,
            col_first: 27,
            row_last: 4,
            col_last: 27,
        };
        assert_eq!(
            derive_list_formula(&source).unwrap(),
            "=DataForProductsFilters!$AB$1:$AB$5"
        );
    }

    #[test]
    fn test_workbook_mirrors_document_sheets() {
        let doc = master_detail_document();
        let mut workbook = XlsxEncoder::default().build_workbook(&doc).unwrap();
        let l_names: Vec<String> = workbook.worksheets().iter().map(|ws| ws.name()).collect();
        assert_eq!(l_names, vec!["Data", "Master Domains"]);
        assert!(workbook.worksheet_from_name("Master Domains").is_ok());

        let v_bytes = XlsxEncoder::default().encode(&doc).unwrap();
        assert!(v_bytes.starts_with(b"PK"));
        let has_entry = |c_entry: &str| {
            v_bytes
                .windows(c_entry.len())
                .any(|window| window == c_entry.as_bytes())
        };
        assert!(has_entry("xl/worksheets/sheet1.xml"));
        assert!(has_entry("xl/worksheets/sheet2.xml"));
        assert!(!has_entry("xl/worksheets/sheet3.xml"));
    }

    #[test]
    fn test_encode_rejects_unquotable_sheet_names() {
        let mut doc = master_detail_document();
        doc.sheets[1].name = "'Domains'".to_string();
        let err = XlsxEncoder::default().encode(&doc).unwrap_err();
        assert!(matches!(err, XlsxExportError::Encode(_)));
    }

    #[test]
    fn test_writer_output_encodes_with_hidden_domain_sheet() {
        struct Row {
            code: &'static str,
        }
        let fields = resolve_fields(
            vec![
                SpecFieldDescriptor::new("Code", |r: &Row| r.code)
                    .with_domain(SpecValueDomain::new([("A", "Alpha"), ("B", "Beta")])),
            ],
            &SpecModeFlags::default(),
        )
        .unwrap();
        let doc = write_records(
            "Rows",
            &fields,
            [Row { code: "A" }, Row { code: "B" }],
            &SpecXlsxWriteOptions::default(),
        )
        .unwrap();

        let l_hidden: Vec<&str> = doc.auxiliary_sheets().map(|sheet| sheet.name.as_str()).collect();
        assert_eq!(l_hidden, vec!["DataForProductsFilters"]);
        let rule = &doc.validations[0];
        assert_eq!(rule.target.sheet_name, "Rows");
        assert_eq!((rule.target.row_first, rule.target.col_first), (1, 0));
        assert_eq!(rule.target.row_last, crate::conf::N_NROWS_EXCEL_MAX - 1);
        assert_eq!(
            derive_list_formula(&rule.source).unwrap(),
            "=DataForProductsFilters!$A$1:$A$2"
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.xlsx");
        XlsxEncoder::default().save(&doc, &path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
    }
}
