use exportkit_io_xlsx::{
    EnumCellValue, EnumFieldCondition, SpecFieldDescriptor, SpecModeFlags, SpecValueDomain,
    SpecXlsxWriteOptions, XlsxEncoder, resolve_fields, write_master_detail_records, write_records,
};

struct Shirt {
    name: &'static str,
    size: &'static str,
    note: &'static str,
    options: Vec<(&'static str, i64)>,
}

fn shirts() -> Vec<Shirt> {
    vec![
        Shirt {
            name: "Oxford",
            size: "S",
            note: "cotton",
            options: vec![("Color", 1)],
        },
        Shirt {
            name: "Polo",
            size: "M",
            note: "pique",
            options: vec![],
        },
        Shirt {
            name: "Flannel",
            size: "M",
            note: "wool",
            options: vec![("Color", 1), ("Fit", 2), ("Cuff", 2)],
        },
    ]
}

fn sizes() -> SpecValueDomain {
    SpecValueDomain::new([("S", "Small"), ("M", "Medium")])
}

#[test]
fn test_excluded_field_leaves_two_header_cells_and_one_binding() {
    let fields = resolve_fields(
        vec![
            SpecFieldDescriptor::new("Name", |s: &Shirt| s.name),
            SpecFieldDescriptor::new("Size", |s: &Shirt| s.size).with_domain(sizes()),
            SpecFieldDescriptor::new("Note", |s: &Shirt| s.note)
                .with_condition(EnumFieldCondition::AdvancedOnly),
        ],
        &SpecModeFlags::new(false),
    )
    .unwrap();
    let doc = write_records("Shirt", &fields, shirts(), &SpecXlsxWriteOptions::default()).unwrap();

    let sheet = doc.primary().unwrap();
    assert_eq!(sheet.rows[0].texts(), vec!["Name", "Size"]);
    assert!(sheet.rows.iter().all(|row| row.cells.len() <= 2));

    let l_aux: Vec<_> = doc.auxiliary_sheets().collect();
    assert_eq!(l_aux.len(), 1);
    assert_eq!(l_aux[0].height(), 2);

    assert_eq!(doc.validations.len(), 1);
    let rule = &doc.validations[0];
    assert_eq!(rule.field_name, "Size");
    assert_eq!(rule.target.col_first, 1);
    assert_eq!(rule.source.sheet_name, l_aux[0].name);
    assert_eq!(rule.source.height(), 2);
}

#[test]
fn test_row_k_comes_from_record_k_minus_one() {
    let fields = resolve_fields(
        vec![SpecFieldDescriptor::new("Name", |s: &Shirt| s.name)],
        &SpecModeFlags::default(),
    )
    .unwrap();
    let l_shirts = shirts();
    let doc = write_records("Shirt", &fields, &l_shirts, &SpecXlsxWriteOptions::default()).unwrap();
    let sheet = doc.primary().unwrap();

    assert_eq!(sheet.height(), l_shirts.len() + 1);
    for (n_idx, shirt) in l_shirts.iter().enumerate() {
        assert_eq!(
            sheet.rows[n_idx + 1].cells[0].value,
            EnumCellValue::String(shirt.name.to_string())
        );
    }
}

#[test]
fn test_shared_domain_is_allocated_once() {
    let fields = resolve_fields(
        vec![
            SpecFieldDescriptor::new("Size", |s: &Shirt| s.size).with_domain(sizes()),
            SpecFieldDescriptor::new("SizeOnTag", |s: &Shirt| s.size).with_domain(sizes()),
            SpecFieldDescriptor::new("SizeUk", |s: &Shirt| s.size)
                .with_domain(SpecValueDomain::new([("S", "8"), ("M", "10")])),
        ],
        &SpecModeFlags::default(),
    )
    .unwrap();
    let doc = write_records("Shirt", &fields, shirts(), &SpecXlsxWriteOptions::default()).unwrap();

    assert_eq!(doc.report.cnt_domains_allocated, 2);
    assert_eq!(doc.report.cnt_domains_reused, 1);
    assert_eq!(doc.validations[0].source, doc.validations[1].source);
    assert_ne!(doc.validations[0].source, doc.validations[2].source);
}

#[test]
fn test_detail_blocks_are_contiguous_and_collapsed() {
    let masters = resolve_fields(
        vec![SpecFieldDescriptor::new("Name", |s: &Shirt| s.name)],
        &SpecModeFlags::default(),
    )
    .unwrap();
    let details = resolve_fields(
        vec![
            SpecFieldDescriptor::new("Option", |o: &(&'static str, i64)| o.0),
            SpecFieldDescriptor::new("Control", |o: &(&'static str, i64)| o.1),
        ],
        &SpecModeFlags::default(),
    )
    .unwrap();
    let l_shirts = shirts();
    let doc = write_master_detail_records(
        "Shirt",
        &masters,
        &details,
        l_shirts.iter().map(|s| (s, s.options.iter())),
        &SpecXlsxWriteOptions::default(),
    )
    .unwrap();
    let sheet = doc.primary().unwrap();

    let mut n_row = 1;
    for shirt in &l_shirts {
        let row_master = &sheet.rows[n_row];
        assert_eq!(row_master.outline_level, 0);
        assert_eq!(row_master.texts(), vec![shirt.name]);
        n_row += 1;

        if shirt.options.is_empty() {
            continue;
        }
        let n_block = shirt.options.len() + 1;
        for row in &sheet.rows[n_row..n_row + n_block] {
            assert_eq!(row.outline_level, 1);
            assert!(row.if_collapsed);
            assert_eq!(row.cells[0].col, 2);
        }
        n_row += n_block;
    }
    assert_eq!(n_row, sheet.height());
}

#[test]
fn test_saved_workbook_lands_on_disk() {
    let fields = resolve_fields(
        vec![
            SpecFieldDescriptor::new("Name", |s: &Shirt| s.name),
            SpecFieldDescriptor::new("Size", |s: &Shirt| s.size).with_domain(sizes()),
        ],
        &SpecModeFlags::default(),
    )
    .unwrap();
    let doc = write_records("Shirt", &fields, shirts(), &SpecXlsxWriteOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shirts.xlsx");
    XlsxEncoder::default().save(&doc, &path).unwrap();

    let n_len = std::fs::metadata(&path).unwrap().len();
    assert!(n_len > 0);
}
