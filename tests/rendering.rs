use lopdf::content::Content;
use lopdf::Document;
use pitch_report::charts::ChartImage;
use pitch_report::fonts::{self, FontFiles};
use pitch_report::report::datasets;
use pitch_report::model::{Block, BulletLevel, HeadingLevel, ImageBlock};
use pitch_report::table::ColumnWidths;
use pitch_report::{
    generate_report, ChartFactory, DocumentAssembler, ErrorCategory, ReportOptions, Theme,
};
use sha2::{Digest, Sha256};

fn test_fonts(test: &str) -> Option<FontFiles> {
    match fonts::resolve_fonts(None) {
        Ok(files) => Some(files),
        Err(_) => {
            eprintln!(
                "Skipping {test}: no font family found. \
                 Set PITCH_REPORT_FONTS_DIR or copy assets/fonts next to the binary."
            );
            None
        }
    }
}

fn assembler(fonts: FontFiles) -> DocumentAssembler {
    DocumentAssembler::new(Theme::default(), fonts)
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes)
        .expect("rendered PDF parses")
        .get_pages()
        .len()
}

/// Number of image draws on each page; table cell backgrounds are painted as images.
fn image_draws_per_page(bytes: &[u8]) -> Vec<usize> {
    let document = Document::load_mem(bytes).expect("rendered PDF parses");
    document
        .get_pages()
        .values()
        .map(|page_id| {
            let content = document.get_page_content(*page_id).expect("page content");
            Content::decode(&content)
                .expect("content stream decodes")
                .operations
                .iter()
                .filter(|operation| operation.operator == "Do")
                .count()
        })
        .collect()
}

fn sample_blocks() -> Vec<Block> {
    vec![
        Block::heading(HeadingLevel::H1, "1. Sample"),
        Block::body(
            "Hello, **PDF**! This paragraph mixes *italic* and [color=#E94560]{colored} text.",
        ),
        Block::bullet(BulletLevel::First, "**First:** a top-level bullet."),
        Block::bullet(BulletLevel::Second, "A nested bullet."),
    ]
}

fn table_rows(rows: usize, columns: usize) -> Vec<Vec<String>> {
    (0..rows)
        .map(|row| {
            (0..columns)
                .map(|column| {
                    if row == 0 {
                        format!("Column {column}")
                    } else {
                        format!("Row {row} cell {column}")
                    }
                })
                .collect()
        })
        .collect()
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            if let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            {
                let start_index = offset + start_pos + start.len();
                if let Some(end_pos) = data[start_index..]
                    .windows(end.len())
                    .position(|window| window == end)
                {
                    for byte in &mut data[start_index..start_index + end_pos] {
                        if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                            *byte = b'0';
                        }
                    }
                    offset = start_index + end_pos + end.len();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(
        &mut normalized,
        b"<xmp:MetadataDate>",
        b"</xmp:MetadataDate>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:DocumentID>",
        b"</xmpMM:DocumentID>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:InstanceID>",
        b"</xmpMM:InstanceID>",
    );
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn empty_block_sequence_renders_one_page() {
    let Some(fonts) = test_fonts("empty_block_sequence_renders_one_page") else {
        return;
    };
    let rendered = assembler(fonts).render_to_vec(&[]).expect("render empty document");
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert_eq!(page_count(&rendered.bytes), 1);
    assert_eq!(rendered.pages, 1);
    assert!(rendered.sections.is_empty());
}

#[test]
fn long_table_flows_onto_several_pages() {
    let Some(fonts) = test_fonts("long_table_flows_onto_several_pages") else {
        return;
    };
    let assembler = assembler(fonts);
    let table = assembler
        .build_table(table_rows(120, 3), &ColumnWidths::Proportional(vec![1.0, 2.0, 2.0]))
        .expect("valid table");
    let rendered = assembler
        .render_to_vec(&[Block::Table(table)])
        .expect("render long table");

    let pages = page_count(&rendered.bytes);
    assert!(pages > 1, "120 rows should not fit on one page");
    assert_eq!(rendered.pages, pages);

    // One background per cell: a dropped or repeated row changes the total.
    let draws = image_draws_per_page(&rendered.bytes);
    assert_eq!(draws.len(), pages);
    assert!(draws.iter().all(|count| *count > 0 && count % 3 == 0));
    assert_eq!(draws.iter().sum::<usize>(), 120 * 3);
}

#[test]
fn five_column_table_header_stands_out() {
    let theme = Theme::default();
    let table = pitch_report::table::build_table(
        table_rows(11, 5),
        &ColumnWidths::Proportional(vec![1.0; 5]),
        &theme,
    )
    .expect("valid table");

    assert_eq!(table.header().len(), 5);
    assert_eq!(table.body_rows().len(), 10);
    for row in 1..11 {
        assert_ne!(table.cell_text_color(0), table.cell_text_color(row));
        for column in 0..5 {
            assert_ne!(
                table.cell_background(0, column),
                table.cell_background(row, column)
            );
        }
    }

    let Some(fonts) = test_fonts("five_column_table_header_stands_out") else {
        return;
    };
    let rendered = assembler(fonts)
        .render_to_vec(&[Block::Table(table)])
        .expect("render table");
    assert_eq!(page_count(&rendered.bytes), 1);
    assert_eq!(image_draws_per_page(&rendered.bytes), vec![55]);
}

#[test]
fn rendering_is_deterministic() {
    let Some(fonts) = test_fonts("rendering_is_deterministic") else {
        return;
    };
    let assembler = assembler(fonts);
    let bytes_a = assembler.render_to_vec(&sample_blocks()).expect("first render").bytes;
    let bytes_b = assembler.render_to_vec(&sample_blocks()).expect("second render").bytes;

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");

    let hash_a = normalized_hash(&bytes_a);
    let hash_b = normalized_hash(&bytes_b);

    assert_eq!(
        hash_a, hash_b,
        "PDF renders must be deterministic after metadata normalization"
    );
}

fn every_chart(factory: &ChartFactory) -> Vec<(&'static str, ChartImage)> {
    let (market, market_options) = datasets::market();
    let (revenue, revenue_options) = datasets::revenue();
    let (tech, tech_options) = datasets::tech_stack();
    let (users, users_options) = datasets::post_launch();
    let gantt = datasets::gantt().expect("gantt dataset");

    vec![
        (
            "pie",
            factory
                .pie_chart(&revenue, &revenue_options, datasets::REVENUE_SIZE)
                .expect("pie"),
        ),
        (
            "donut",
            factory
                .pie_chart(&tech, &tech_options.donut(0.45), datasets::TECH_SIZE)
                .expect("donut"),
        ),
        (
            "bar",
            factory
                .horizontal_bar_chart(&market, &market_options, datasets::MARKET_SIZE)
                .expect("bar"),
        ),
        (
            "gantt",
            factory.gantt_chart(&gantt, datasets::GANTT_SIZE).expect("gantt"),
        ),
        (
            "architecture",
            factory
                .architecture_diagram(&datasets::architecture(), datasets::ARCHITECTURE_SIZE)
                .expect("architecture"),
        ),
        (
            "flow",
            factory
                .flow_chart(&datasets::user_flow(), datasets::FLOW_SIZE)
                .expect("flow"),
        ),
        (
            "trend",
            factory
                .trend_chart(&users, &users_options, datasets::POST_LAUNCH_SIZE)
                .expect("trend"),
        ),
    ]
}

#[test]
fn charts_are_byte_identical_across_renders() {
    let Some(fonts) = test_fonts("charts_are_byte_identical_across_renders") else {
        return;
    };
    let factory = ChartFactory::new(&Theme::default(), &fonts).expect("chart factory");

    let first = every_chart(&factory);
    let second = every_chart(&factory);
    assert_eq!(first.len(), 7);
    for ((name, a), (_, b)) in first.iter().zip(&second) {
        assert!(a.bytes().starts_with(b"\x89PNG"), "{name} is not a PNG");
        assert_eq!(a.bytes(), b.bytes(), "{name} chart differs between renders");
        assert_eq!(
            (a.width_px(), a.height_px()),
            (b.width_px(), b.height_px())
        );
    }
}

#[test]
fn render_replaces_existing_file() {
    let Some(fonts) = test_fonts("render_replaces_existing_file") else {
        return;
    };
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, b"stale").expect("seed file");

    let outcome = assembler(fonts)
        .render(&sample_blocks(), &path)
        .expect("render to file");

    let written = std::fs::read(&path).expect("read output");
    assert_eq!(outcome.path, path);
    assert_eq!(outcome.size_bytes, written.len());
    assert!(written.starts_with(b"%PDF"));
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.sections[0].title, "1. Sample");
    assert_eq!(outcome.sections[0].page, 1);
}

#[test]
fn oversize_image_aborts_without_writing() {
    let Some(fonts) = test_fonts("oversize_image_aborts_without_writing") else {
        return;
    };
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("report.pdf");
    let blocks = vec![Block::Image(ImageBlock::new(vec![0u8; 16], 120.0, 300.0))];

    let err = assembler(fonts).render(&blocks, &path).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Layout);
    assert!(!path.exists());
}

#[test]
fn full_report_renders_every_section() {
    if test_fonts("full_report_renders_every_section").is_none() {
        return;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let options = ReportOptions::new().with_output(dir.path().join("LetsWatch.pdf"));

    let outcome = generate_report(&options).expect("render report");
    let bytes = std::fs::read(&outcome.path).expect("read report");

    assert_eq!(page_count(&bytes), outcome.pages);
    assert!(outcome.pages >= 10, "cover plus nine sections with page breaks");
    assert_eq!(outcome.sections.len(), 9);
    assert_eq!(outcome.sections[0].title, "1. Project Definition and Features");
    assert_eq!(outcome.sections[0].page, 2);
    for pair in outcome.sections.windows(2) {
        assert!(pair[0].page < pair[1].page);
    }
}
