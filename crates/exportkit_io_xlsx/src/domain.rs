//! Auxiliary-sheet placement of dropdown domains.
//!
//! Each distinct domain occupies one column of a hidden sheet, codes in rows
//! `1..=len`. A domain equal to one already placed (same pairs, same order)
//! reuses that column whatever field it belongs to.

use std::collections::BTreeMap;

use crate::conf::{EnumFmtKey, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{
    EnumCellValue, SpecCell, SpecCellRange, SpecRow, SpecSheet, SpecValueDomain, XlsxExportError,
};

/// Allocator for one hidden auxiliary sheet.
///
/// Instances are never shared between export calls; master and detail blocks
/// each own one.
#[derive(Debug, Clone)]
pub struct DomainSheetAllocator {
    sheet_name: String,
    dict_range_by_domain: BTreeMap<SpecValueDomain, SpecCellRange>,
    dict_domain_by_field: BTreeMap<String, SpecValueDomain>,
    l_columns: Vec<Vec<String>>,
    cnt_reused: u64,
}

impl DomainSheetAllocator {
    /// Allocator targeting the hidden sheet `sheet_name`.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            dict_range_by_domain: BTreeMap::new(),
            dict_domain_by_field: BTreeMap::new(),
            l_columns: Vec::new(),
            cnt_reused: 0,
        }
    }

    /// Target sheet name.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Place `domain` for `field_name` and return its source range.
    ///
    /// Returns `Ok(None)` for an empty domain (free-form input).
    pub fn allocate(
        &mut self,
        field_name: &str,
        domain: &SpecValueDomain,
    ) -> Result<Option<SpecCellRange>, XlsxExportError> {
        if domain.is_empty() {
            return Ok(None);
        }

        match self.dict_domain_by_field.get(field_name) {
            Some(domain_seen) if domain_seen != domain => {
                return Err(XlsxExportError::ConflictingDomain {
                    field: field_name.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.dict_domain_by_field
                    .insert(field_name.to_string(), domain.clone());
            }
        }

        if let Some(range) = self.dict_range_by_domain.get(domain) {
            self.cnt_reused += 1;
            tracing::debug!(
                field = field_name,
                sheet = %self.sheet_name,
                col = range.col_first,
                "Reused domain column"
            );
            return Ok(Some(range.clone()));
        }

        if domain.len() > N_NROWS_EXCEL_MAX {
            return Err(XlsxExportError::DomainOverflow {
                field: field_name.to_string(),
                len: domain.len(),
                max: N_NROWS_EXCEL_MAX,
            });
        }
        let n_col = self.l_columns.len();
        if n_col >= N_NCOLS_EXCEL_MAX {
            return Err(XlsxExportError::ColumnOverflow {
                field: field_name.to_string(),
                col: n_col,
                max: N_NCOLS_EXCEL_MAX,
            });
        }

        self.l_columns
            .push(domain.codes().map(ToString::to_string).collect());
        let range = SpecCellRange {
            sheet_name: self.sheet_name.clone(),
            row_first: 0,
            col_first: n_col,
            row_last: domain.len() - 1,
            col_last: n_col,
        };
        self.dict_range_by_domain
            .insert(domain.clone(), range.clone());

        tracing::debug!(
            field = field_name,
            sheet = %self.sheet_name,
            col = n_col,
            n_values = domain.len(),
            "Allocated domain column"
        );
        Ok(Some(range))
    }

    /// Distinct domain columns placed so far.
    pub fn cnt_allocated(&self) -> u64 {
        self.l_columns.len() as u64
    }

    /// Placements served from an existing column.
    pub fn cnt_reused(&self) -> u64 {
        self.cnt_reused
    }

    /// Materialize the hidden sheet; `None` when nothing was allocated.
    pub fn into_sheet(self) -> Option<SpecSheet> {
        if self.l_columns.is_empty() {
            return None;
        }

        let n_height = self.l_columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut sheet = SpecSheet::new_hidden(self.sheet_name);
        sheet.rows = (0..n_height)
            .map(|n_row| SpecRow {
                cells: self
                    .l_columns
                    .iter()
                    .enumerate()
                    .filter_map(|(n_col, l_codes)| {
                        l_codes.get(n_row).map(|code| SpecCell {
                            col: n_col,
                            value: EnumCellValue::String(code.clone()),
                            fmt: EnumFmtKey::Text,
                        })
                    })
                    .collect(),
                ..Default::default()
            })
            .collect();
        Some(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> SpecValueDomain {
        SpecValueDomain::new([("S", "Small"), ("M", "Medium")])
    }

    #[test]
    fn test_identical_domains_share_one_column() {
        let mut allocator = DomainSheetAllocator::new("Aux");
        let range_a = allocator.allocate("RecurringCyclePeriod", &sizes()).unwrap();
        let range_b = allocator.allocate("RentalPricePeriod", &sizes()).unwrap();

        assert_eq!(range_a, range_b);
        assert_eq!(allocator.cnt_allocated(), 1);
        assert_eq!(allocator.cnt_reused(), 1);
    }

    #[test]
    fn test_different_domains_get_separate_columns() {
        let mut allocator = DomainSheetAllocator::new("Aux");
        let range_a = allocator.allocate("Size", &sizes()).unwrap().unwrap();
        let range_b = allocator
            .allocate(
                "SizeExtended",
                &SpecValueDomain::new([("S", "Small"), ("M", "Medium"), ("L", "Large")]),
            )
            .unwrap()
            .unwrap();

        assert_eq!(range_a.col_first, 0);
        assert_eq!(range_b.col_first, 1);
        assert_eq!(range_b.height(), 3);
    }

    #[test]
    fn test_label_difference_breaks_reuse() {
        let mut allocator = DomainSheetAllocator::new("Aux");
        allocator.allocate("A", &sizes()).unwrap();
        allocator
            .allocate("B", &SpecValueDomain::new([("S", "Tiny"), ("M", "Medium")]))
            .unwrap();
        assert_eq!(allocator.cnt_allocated(), 2);
    }

    #[test]
    fn test_empty_domain_yields_no_range() {
        let mut allocator = DomainSheetAllocator::new("Aux");
        let range = allocator
            .allocate("Free", &SpecValueDomain::default())
            .unwrap();
        assert!(range.is_none());
        assert!(allocator.into_sheet().is_none());
    }

    #[test]
    fn test_same_field_with_other_domain_is_rejected() {
        let mut allocator = DomainSheetAllocator::new("Aux");
        allocator.allocate("Size", &sizes()).unwrap();
        let err = allocator
            .allocate("Size", &SpecValueDomain::new([("XL", "Extra large")]))
            .unwrap_err();
        assert!(matches!(err, XlsxExportError::ConflictingDomain { .. }));
    }

    #[test]
    fn test_into_sheet_lays_codes_in_columns() {
        let mut allocator = DomainSheetAllocator::new("Aux");
        allocator.allocate("Size", &sizes()).unwrap();
        allocator
            .allocate("Flag", &SpecValueDomain::new([(1, "Yes")]))
            .unwrap();

        let sheet = allocator.into_sheet().unwrap();
        assert!(sheet.is_hidden());
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.rows[0].texts(), vec!["S", "1"]);
        assert_eq!(sheet.rows[1].texts(), vec!["M"]);
    }
}
