//! Stateless helpers shared by the writers and the encoder.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellValue, EnumFieldValue, SpecXlsxValuePolicy};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy string; return error for finite values.
pub fn convert_nan_inf_to_str(
    x: f64,
    value_policy: &SpecXlsxValuePolicy,
) -> Result<String, String> {
    if x.is_nan() {
        return Ok(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Ok(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    Err("Input is neither NaN nor Inf.".to_string())
}

/// Coerce an accessor value into a typed cell and its format preset.
pub fn convert_field_value(
    value: &EnumFieldValue,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> (EnumCellValue, EnumFmtKey) {
    match value {
        EnumFieldValue::Null => {
            if if_keep_missing_values {
                (
                    EnumCellValue::String(value_policy.missing_value_str.clone()),
                    EnumFmtKey::Text,
                )
            } else {
                (EnumCellValue::None, EnumFmtKey::Text)
            }
        }
        EnumFieldValue::Boolean(val) => (EnumCellValue::Boolean(*val), EnumFmtKey::Boolean),
        EnumFieldValue::Integer(val) => (EnumCellValue::Number(*val as f64), EnumFmtKey::Integer),
        EnumFieldValue::Decimal(val) => match convert_nan_inf_to_str(*val, value_policy) {
            Ok(text) => (EnumCellValue::String(text), EnumFmtKey::Text),
            Err(_) => (EnumCellValue::Number(*val), EnumFmtKey::Decimal),
        },
        EnumFieldValue::String(val) => (EnumCellValue::String(val.clone()), EnumFmtKey::Text),
        EnumFieldValue::DateTime(val) => (EnumCellValue::DateTime(*val), EnumFmtKey::DateTime),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FieldNameUtils

/// Validate that `names` has no duplicates.
pub fn validate_unique_field_names(names: &[&str]) -> Result<(), String> {
    if names.len() == names.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in names.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter_map(|(c_name, l_pos)| {
            if l_pos.len() > 1 {
                Some(format!(
                    "{c_name:?} x{} at indices {:?}",
                    l_pos.len(),
                    l_pos
                ))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    Err(c_msg)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
///
/// Excel also rejects a leading or trailing apostrophe, so those are trimmed
/// together with surrounding whitespace.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let c_name: String = c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    let c_name = c_name.trim_matches(|chr: char| chr == '\'' || chr.is_whitespace());
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.to_string()
}

/// Pick a name not in `set_existing` (`base`, `base__2`, `base__3`, ...).
pub fn derive_unique_sheet_name(name: &str, set_existing: &BTreeSet<String>) -> String {
    if !set_existing.contains(name) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if !set_existing.contains(&candidate) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RangeUtils

/// Convert sorted indices to contiguous inclusive ranges.
pub fn derive_contiguous_ranges(sorted_indices: &[usize]) -> Vec<(usize, usize)> {
    if sorted_indices.is_empty() {
        return vec![];
    }

    let mut l_contiguous_ranges = Vec::new();
    let mut n_idx_start = sorted_indices[0];
    let mut n_idx_end = sorted_indices[0];

    for idx in &sorted_indices[1..] {
        if *idx == n_idx_end + 1 {
            n_idx_end = *idx;
        } else {
            l_contiguous_ranges.push((n_idx_start, n_idx_end));
            n_idx_start = *idx;
            n_idx_end = *idx;
        }
    }

    l_contiguous_ranges.push((n_idx_start, n_idx_end));
    l_contiguous_ranges
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
