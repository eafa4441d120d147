//! Master rows followed by collapsed detail blocks.
//!
//! A detail block is a header row plus one row per detail item, all at
//! outline level 1, shifted right by the detail column offset. Detail domains
//! go to their own auxiliary sheet; reuse never crosses the master/detail line.

use std::borrow::Borrow;

use crate::domain::DomainSheetAllocator;
use crate::policy::SpecFieldSet;
use crate::spec::{SpecDocument, SpecXlsxWriteOptions, XlsxExportError};
use crate::util::{derive_unique_sheet_name, sanitize_sheet_name};
use crate::writer::{
    EnumBindingExtent, SpecFieldBinding, TabularDocumentWriter, bind_domains, build_header_row,
    build_record_row, derive_row_bound_rules, log_finished, push_referenced_sheet, validate_columns,
};

const N_OUTLINE_LEVEL_DETAIL: u8 = 1;

/// Single-pass writer for master records of type `T` with detail items `D`.
pub struct MasterDetailBlockWriter<'a, T, D> {
    master: TabularDocumentWriter<'a, T>,
    details: &'a SpecFieldSet<D>,
    l_cols_detail: Vec<usize>,
    allocator: Option<DomainSheetAllocator>,
    l_bindings: Vec<SpecFieldBinding>,
    l_rows_detail: Vec<usize>,
}

impl<'a, T, D> MasterDetailBlockWriter<'a, T, D> {
    /// Create the primary sheet and place master and detail domains.
    ///
    /// Detail field `j` lands at column `layout_offset + j`, where the offset
    /// falls back to [`SpecXlsxWriteOptions::n_detail_col_offset`].
    pub fn new(
        sheet_name: &str,
        masters: &'a SpecFieldSet<T>,
        details: &'a SpecFieldSet<D>,
        options: &'a SpecXlsxWriteOptions,
    ) -> Result<Self, XlsxExportError> {
        let master = TabularDocumentWriter::new_with_extent(
            sheet_name,
            masters,
            options,
            EnumBindingExtent::WrittenRows,
        )?;

        let l_cols_detail: Vec<usize> = details
            .fields()
            .iter()
            .enumerate()
            .map(|(n_pos, field)| {
                field.layout_offset.unwrap_or(options.n_detail_col_offset) + n_pos
            })
            .collect();
        validate_columns(details.fields(), &l_cols_detail)?;

        let mut allocator = None;
        let mut l_bindings = Vec::new();
        if options.if_use_dropdown_lists {
            let mut allocator_detail = DomainSheetAllocator::new(derive_unique_sheet_name(
                &sanitize_sheet_name(&options.sheet_name_detail_domains, "_"),
                &master.sheet_names(),
            ));
            l_bindings = bind_domains(details.fields(), &l_cols_detail, &mut allocator_detail)?;
            allocator = Some(allocator_detail);
        }

        Ok(Self {
            master,
            details,
            l_cols_detail,
            allocator,
            l_bindings,
            l_rows_detail: Vec::new(),
        })
    }

    /// Write one master row, then its detail block when `items` is non-empty.
    pub fn write_record<I, R>(&mut self, record: &T, items: I) -> Result<(), XlsxExportError>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<D>,
    {
        self.master.write_record(record)?;
        let n_record_idx = (self.master.report.cnt_records - 1) as usize;
        let options = self.master.options();

        let mut cnt_items = 0usize;
        for item in items {
            if cnt_items == 0 {
                let row_header = build_header_row(
                    self.details.fields(),
                    &self.l_cols_detail,
                    N_OUTLINE_LEVEL_DETAIL,
                );
                self.master.push_row(row_header)?;
                self.master.report.cnt_detail_rows += 1;
                self.master.report.cnt_detail_blocks += 1;
            }

            let row = match build_record_row(
                self.details.fields(),
                &self.l_cols_detail,
                item.borrow(),
                n_record_idx,
                N_OUTLINE_LEVEL_DETAIL,
                options,
            ) {
                Ok(row) => row,
                Err(err) => {
                    self.master.poison();
                    return Err(err);
                }
            };
            let n_row = self.master.push_row(row)?;
            self.l_rows_detail.push(n_row);
            self.master.report.cnt_detail_rows += 1;
            cnt_items += 1;
        }

        if cnt_items > 0 {
            tracing::debug!(
                sheet = self.master.sheet_name(),
                record_idx = n_record_idx,
                n_items = cnt_items,
                "Detail block written"
            );
        }
        Ok(())
    }

    /// Hand the completed document over to the caller.
    pub fn finish(self) -> Result<SpecDocument, XlsxExportError> {
        let l_rules = derive_row_bound_rules(
            self.master.sheet_name(),
            &self.l_bindings,
            &self.l_rows_detail,
        );

        let mut doc = self.master.into_document()?;
        doc.validations.extend(l_rules);
        if let Some(allocator) = self.allocator {
            doc.report.cnt_domains_allocated += allocator.cnt_allocated();
            doc.report.cnt_domains_reused += allocator.cnt_reused();
            if let Some(sheet_aux) = allocator.into_sheet() {
                push_referenced_sheet(&mut doc.sheets, &doc.validations, sheet_aux);
            }
        }

        log_finished(&doc);
        Ok(doc)
    }
}

/// Write `(master, detail items)` pairs in one forward pass.
pub fn write_master_detail_records<T, D, I, R, J, RD>(
    sheet_name: &str,
    masters: &SpecFieldSet<T>,
    details: &SpecFieldSet<D>,
    blocks: I,
    options: &SpecXlsxWriteOptions,
) -> Result<SpecDocument, XlsxExportError>
where
    I: IntoIterator<Item = (R, J)>,
    R: Borrow<T>,
    J: IntoIterator<Item = RD>,
    RD: Borrow<D>,
{
    let mut writer = MasterDetailBlockWriter::new(sheet_name, masters, details, options)?;
    for (record, items) in blocks {
        writer.write_record(record.borrow(), items)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::EnumFmtKey;
    use crate::policy::{SpecModeFlags, resolve_fields};
    use crate::spec::{EnumCellValue, SpecFieldDescriptor, SpecValueDomain};

    struct Product {
        name: &'static str,
        attributes: Vec<Attribute>,
    }

    struct Attribute {
        name: &'static str,
        control: i64,
    }

    fn controls() -> SpecValueDomain {
        SpecValueDomain::new([(1, "Drop-down list"), (2, "Radio list")])
    }

    fn masters() -> SpecFieldSet<Product> {
        resolve_fields(
            vec![
                SpecFieldDescriptor::new("Name", |p: &Product| p.name),
                SpecFieldDescriptor::new("Kind", |_: &Product| 1_i64).with_domain(controls()),
            ],
            &SpecModeFlags::default(),
        )
        .unwrap()
    }

    fn details() -> SpecFieldSet<Attribute> {
        resolve_fields(
            vec![
                SpecFieldDescriptor::new("AttributeName", |a: &Attribute| a.name),
                SpecFieldDescriptor::new("AttributeControlType", |a: &Attribute| a.control)
                    .with_domain(controls()),
            ],
            &SpecModeFlags::default(),
        )
        .unwrap()
    }

    fn products() -> Vec<Product> {
        vec![
            Product {
                name: "Shirt",
                attributes: vec![
                    Attribute {
                        name: "Color",
                        control: 1,
                    },
                    Attribute {
                        name: "Size",
                        control: 2,
                    },
                ],
            },
            Product {
                name: "Mug",
                attributes: vec![],
            },
            Product {
                name: "Hat",
                attributes: vec![Attribute {
                    name: "Fabric",
                    control: 1,
                }],
            },
        ]
    }

    fn write(options: &SpecXlsxWriteOptions) -> SpecDocument {
        let masters = masters();
        let details = details();
        write_master_detail_records(
            "Products",
            &masters,
            &details,
            products().iter().map(|p| (p, p.attributes.iter())),
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_detail_rows_follow_their_master_row() {
        let doc = write(&SpecXlsxWriteOptions::default());
        let sheet = doc.primary().unwrap();
        let l_levels: Vec<u8> = sheet.rows.iter().map(|row| row.outline_level).collect();

        // header, Shirt, block(3), Mug, Hat, block(2)
        assert_eq!(l_levels, vec![0, 0, 1, 1, 1, 0, 0, 1, 1]);
        assert_eq!(sheet.rows[1].texts()[0], "Shirt");
        assert_eq!(sheet.rows[5].texts()[0], "Mug");
        assert_eq!(sheet.rows[6].texts()[0], "Hat");
        assert!(sheet.rows.iter().filter(|r| r.outline_level == 1).all(|r| r.if_collapsed));
        assert!(sheet.rows.iter().filter(|r| r.outline_level == 0).all(|r| !r.if_collapsed));
    }

    #[test]
    fn test_detail_cells_use_default_offset() {
        let doc = write(&SpecXlsxWriteOptions::default());
        let sheet = doc.primary().unwrap();

        let row_header = &sheet.rows[2];
        assert_eq!(row_header.cells[0].col, 2);
        assert_eq!(row_header.cells[0].fmt, EnumFmtKey::Header);
        assert_eq!(
            sheet.rows[3].cell(3).unwrap().value,
            EnumCellValue::String("1".to_string())
        );
        assert_eq!(doc.report.cnt_detail_blocks, 2);
        assert_eq!(doc.report.cnt_detail_rows, 5);
        assert_eq!(doc.report.cnt_records, 3);
    }

    #[test]
    fn test_detail_domains_use_their_own_sheet() {
        let doc = write(&SpecXlsxWriteOptions::default());
        let l_hidden: Vec<&str> = doc.auxiliary_sheets().map(|s| s.name.as_str()).collect();
        assert_eq!(
            l_hidden,
            vec!["DataForProductsFilters", "DataForProductAttributesFilters"]
        );
        assert_eq!(doc.report.cnt_domains_allocated, 2);
        assert_eq!(doc.report.cnt_domains_reused, 0);
    }

    #[test]
    fn test_rules_cover_only_written_runs() {
        let doc = write(&SpecXlsxWriteOptions::default());
        let l_master: Vec<(usize, usize)> = doc
            .validations
            .iter()
            .filter(|rule| rule.field_name == "Kind")
            .map(|rule| (rule.target.row_first, rule.target.row_last))
            .collect();
        let l_detail: Vec<(usize, usize)> = doc
            .validations
            .iter()
            .filter(|rule| rule.field_name == "AttributeControlType")
            .map(|rule| (rule.target.row_first, rule.target.row_last))
            .collect();

        assert_eq!(l_master, vec![(1, 1), (5, 6)]);
        assert_eq!(l_detail, vec![(3, 4), (8, 8)]);
        assert!(
            doc.validations
                .iter()
                .filter(|rule| rule.field_name == "AttributeControlType")
                .all(|rule| rule.target.col_first == 3
                    && rule.source.sheet_name == "DataForProductAttributesFilters")
        );
    }

    #[test]
    fn test_empty_input_emits_no_auxiliary_sheets() {
        let masters = masters();
        let details = details();
        let doc = write_master_detail_records(
            "Products",
            &masters,
            &details,
            Vec::<(&Product, Vec<&Attribute>)>::new(),
            &SpecXlsxWriteOptions::default(),
        )
        .unwrap();

        assert_eq!(doc.sheets.len(), 1);
        assert_eq!(doc.auxiliary_sheets().count(), 0);
        assert!(doc.validations.is_empty());
        assert_eq!(doc.primary().unwrap().rows.len(), 1);
    }

    #[test]
    fn test_masters_without_details_keep_only_master_domains() {
        let masters = masters();
        let details = details();
        let l_products = vec![Product {
            name: "Mug",
            attributes: vec![],
        }];
        let doc = write_master_detail_records(
            "Products",
            &masters,
            &details,
            l_products.iter().map(|p| (p, p.attributes.iter())),
            &SpecXlsxWriteOptions::default(),
        )
        .unwrap();

        let l_hidden: Vec<&str> = doc.auxiliary_sheets().map(|s| s.name.as_str()).collect();
        assert_eq!(l_hidden, vec!["DataForProductsFilters"]);
        let l_fields: Vec<&str> = doc.validations.iter().map(|r| r.field_name.as_str()).collect();
        assert_eq!(l_fields, vec!["Kind"]);
        assert!(
            doc.validations
                .iter()
                .all(|rule| doc.sheets.iter().any(|s| s.name == rule.source.sheet_name))
        );
    }

    #[test]
    fn test_colliding_layout_offsets_are_rejected() {
        let masters = masters();
        let details = resolve_fields(
            vec![
                SpecFieldDescriptor::new("A", |a: &Attribute| a.name).with_layout_offset(4),
                SpecFieldDescriptor::new("B", |a: &Attribute| a.control).with_layout_offset(3),
            ],
            &SpecModeFlags::default(),
        )
        .unwrap();
        let options = SpecXlsxWriteOptions::default();

        let err = MasterDetailBlockWriter::new("Products", &masters, &details, &options)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            XlsxExportError::ColumnCollision { field, col: 4 } if field == "B"
        ));
    }

    #[test]
    fn test_detail_fault_poisons_writer() {
        let masters = masters();
        let details = resolve_fields(
            vec![SpecFieldDescriptor::new_fallible(
                "AttributeName",
                |_: &Attribute| Err("attribute removed".to_string()),
            )],
            &SpecModeFlags::default(),
        )
        .unwrap();
        let options = SpecXlsxWriteOptions::default();
        let l_products = products();

        let mut writer =
            MasterDetailBlockWriter::new("Products", &masters, &details, &options).unwrap();
        let err = writer
            .write_record(&l_products[0], l_products[0].attributes.iter())
            .unwrap_err();
        assert!(matches!(err, XlsxExportError::AccessorFault { record_idx: 0, .. }));
        assert!(matches!(
            writer.finish(),
            Err(XlsxExportError::WriterPoisoned { .. })
        ));
    }
}
