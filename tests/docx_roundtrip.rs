use std::io::{Cursor, Read};

use plan_doc::blocks::{HeadingLevel, TaskStatus};
use plan_doc::docx::{read_document, DecodedDocument, DocxSerializer};
use plan_doc::model::{Alignment, ListFormat};
use plan_doc::outline::Outline;
use plan_doc::theme::Rgb;
use plan_doc::{write_document, Document, DocumentBuilder, Error, Serializer, Theme};

fn round_trip(document: &Document) -> DecodedDocument {
    let bytes = DocxSerializer.serialize(document).expect("serialize docx");
    read_document(&bytes).expect("decode docx")
}

fn paragraphs(texts: &[&str]) -> Document {
    let mut builder = DocumentBuilder::default();
    for text in texts {
        let block = builder.blocks().paragraph(*text);
        builder.append(block).expect("builder is open");
    }
    builder.finalize()
}

#[test]
fn heading_bullets_and_task_survive_decoding() {
    let mut builder = DocumentBuilder::default().with_title("E2E");
    let blocks = vec![
        builder.blocks().heading(HeadingLevel::One, "Title"),
        builder.blocks().bullet("a"),
        builder.blocks().bullet("b"),
        builder.blocks().task(TaskStatus::Done, "x"),
    ];
    builder.extend(blocks).unwrap();
    let decoded = round_trip(&builder.finalize());

    assert_eq!(decoded.title, "E2E");
    let texts: Vec<String> = decoded.blocks.iter().map(|block| block.text()).collect();
    assert_eq!(texts, ["Title", "a", "b", "[DONE] x"]);

    let heading = &decoded.blocks[0];
    assert_eq!(heading.style_id.as_deref(), Some("Heading1"));
    assert_eq!(heading.bottom_border, Some(Rgb(0x2E, 0x86, 0xAB)));
    assert!(heading.runs[0].bold);
    assert_eq!(heading.runs[0].size, Some(18));

    for bullet in &decoded.blocks[1..3] {
        let num_id = bullet.num_id.expect("bullet belongs to a list");
        assert_eq!(decoded.list_format(num_id), Some(ListFormat::Bullet));
        assert_eq!(bullet.style_id, None);
    }

    let task = &decoded.blocks[3];
    let label = &task.runs[0];
    assert_eq!(label.text, "[DONE] ");
    assert!(label.bold);
    assert_eq!(label.color, Some(Rgb(0x1A, 0x7A, 0x4A)));
    assert_eq!(label.font.as_deref(), Some("Courier New"));
    assert_eq!(task.runs[1].text, "x");
    assert_eq!(task.runs[1].font.as_deref(), Some("Arial"));
}

#[test]
fn text_round_trips_exactly() {
    let samples = [
        "  leading and trailing spaces  ",
        "tabs\tand\nnewlines",
        "markup <w:t> & \"quotes\" 'apostrophes' &amp;",
        "non-ASCII: é ü — 漢字 🚀",
        "windows\r\nline end",
        "lone\rreturn",
        "",
    ];
    let document = paragraphs(&samples);
    let bytes = DocxSerializer.serialize(&document).expect("serialize docx");

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).expect("open package");
    let mut body = String::new();
    archive
        .by_name("word/document.xml")
        .expect("document part")
        .read_to_string(&mut body)
        .expect("utf-8 part");
    assert!(!body.contains('\r'), "line ends must survive XML normalization");
    assert!(body.contains("windows&#13;\nline end"));

    let decoded = read_document(&bytes).expect("decode docx");
    let texts: Vec<String> = decoded.blocks.iter().map(|block| block.text()).collect();
    assert_eq!(texts, samples);
}

#[test]
fn control_characters_fail_serialization() {
    let document = paragraphs(&["bell\u{7}"]);
    assert!(matches!(
        DocxSerializer.serialize(&document),
        Err(Error::UnsupportedCharacter('\u{7}'))
    ));
}

#[test]
fn callouts_keep_their_bars_and_alignment() {
    let theme = Theme::default();
    let mut builder = DocumentBuilder::new(theme.clone());
    let blocks = vec![
        builder.blocks().milestone("done"),
        builder.blocks().note("careful"),
        builder.blocks().version_box("v2.0", "Chatbot", "later", theme.palette.accent),
        builder
            .blocks()
            .centered("Plan", plan_doc::blocks::CenteredStyle::Title),
        builder.blocks().spacer(),
        builder.blocks().divider(),
    ];
    builder.extend(blocks).unwrap();
    let decoded = round_trip(&builder.finalize());

    assert_eq!(decoded.blocks.len(), 6);
    assert_eq!(decoded.blocks[0].left_border, Some(theme.palette.success));
    assert!(decoded.blocks[0].runs[1].italic);
    assert_eq!(decoded.blocks[1].left_border, Some(theme.palette.warning));
    assert_eq!(decoded.blocks[2].left_border, Some(theme.palette.accent));
    assert_eq!(decoded.blocks[2].runs[2].color, Some(theme.palette.muted));
    assert_eq!(decoded.blocks[3].alignment, Alignment::Center);
    assert!(decoded.blocks[4].runs.is_empty());
    assert_eq!(decoded.blocks[5].bottom_border, Some(theme.palette.rule));
}

#[test]
fn numbered_items_use_decimal_numbering() {
    let mut builder = DocumentBuilder::default();
    let blocks = vec![builder.blocks().numbered("one"), builder.blocks().numbered("two")];
    builder.extend(blocks).unwrap();
    let decoded = round_trip(&builder.finalize());

    for block in &decoded.blocks {
        let num_id = block.num_id.expect("numbered item");
        assert_eq!(decoded.list_format(num_id), Some(ListFormat::Decimal));
    }
}

#[test]
fn serialization_is_deterministic() {
    let document = Outline::bundled()
        .and_then(|outline| outline.build(Theme::default()))
        .expect("bundled outline builds");

    let first = DocxSerializer.serialize(&document).unwrap();
    let second = DocxSerializer.serialize(&document).unwrap();
    assert_eq!(first, second);
}

#[test]
fn bundled_plan_writes_and_decodes() {
    let document = Outline::bundled()
        .and_then(|outline| outline.build(Theme::default()))
        .expect("bundled outline builds");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("project_plan.docx");
    let written = write_document(&document, &DocxSerializer, &path).expect("write docx");

    let bytes = std::fs::read(&path).expect("read back");
    assert_eq!(bytes.len(), written);

    let decoded = read_document(&bytes).expect("decode docx");
    assert_eq!(decoded.title, document.title());
    assert_eq!(decoded.blocks.len(), document.blocks().len());
    for (decoded, block) in decoded.blocks.iter().zip(document.blocks()) {
        assert_eq!(decoded.text(), block.text());
    }
    assert!(decoded
        .blocks
        .iter()
        .any(|block| block.text().starts_with("Total tasks: 78")));
}

#[test]
fn custom_theme_colors_reach_the_package() {
    let theme = Theme::from_toml_str(
        r##"
        [palette]
        success = "#00AA00"
        "##,
    )
    .expect("valid theme");
    let mut builder = DocumentBuilder::new(theme);
    let block = builder.blocks().task(TaskStatus::Done, "green");
    builder.append(block).unwrap();

    let decoded = round_trip(&builder.finalize());
    assert_eq!(decoded.blocks[0].runs[0].color, Some(Rgb(0, 0xAA, 0)));
}
