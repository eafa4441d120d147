//! Worksheet limits, default sheet names and format preset factories.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Columns between the sheet edge and a detail block when a detail field has
/// no explicit layout offset.
pub const N_DETAIL_COL_OFFSET_DEFAULT: usize = 2;

/// Auxiliary sheet backing master-field dropdowns.
pub const C_SHEET_NAME_MASTER_DOMAINS: &str = "DataForProductsFilters";
/// Auxiliary sheet backing detail-field dropdowns.
pub const C_SHEET_NAME_DETAIL_DOMAINS: &str = "DataForProductAttributesFilters";

/// Header background (light steel blue).
pub const C_HEADER_BG_COLOR: &str = "#B8CCE4";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumFmtKey {
    /// Generic text cell format.
    Text,
    /// Integer number format.
    Integer,
    /// Decimal number format.
    Decimal,
    /// Date-time number format.
    DateTime,
    /// Boolean cell format.
    Boolean,
    /// Header cell format.
    Header,
}

impl EnumFmtKey {
    /// Preset map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Header => "header",
        }
    }
}

/// Build default named format presets used by [`crate::encode::XlsxEncoder`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Text.as_str().to_string(),
        cfg_base_fmt_spec.clone(),
    );
    dict_fmt.insert(
        EnumFmtKey::Boolean.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("center".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            bg_color: Some(C_HEADER_BG_COLOR.to_string()),
            border: Some(1),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Integer.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("0".to_string()),
            align: Some("right".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Decimal.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("0.0000".to_string()),
            align: Some("right".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::DateTime.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("yyyy-mm-dd hh:mm:ss".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_formats_cover_every_key() {
        let dict_fmt = derive_default_xlsx_formats();
        for key in [
            EnumFmtKey::Text,
            EnumFmtKey::Integer,
            EnumFmtKey::Decimal,
            EnumFmtKey::DateTime,
            EnumFmtKey::Boolean,
            EnumFmtKey::Header,
        ] {
            assert!(dict_fmt.contains_key(key.as_str()), "{key:?}");
        }
    }

    #[test]
    fn test_header_preset_is_bold_and_shaded() {
        let dict_fmt = derive_default_xlsx_formats();
        let fmt_header = &dict_fmt["header"];
        assert_eq!(fmt_header.bold, Some(true));
        assert_eq!(fmt_header.bg_color.as_deref(), Some(C_HEADER_BG_COLOR));
        assert_eq!(dict_fmt["text"].bold, None);
    }
}
