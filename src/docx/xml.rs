//! WordprocessingML part renderers.
//!
//! Every function returns the complete text of one package part.  Only explicit run overrides are
//! written into `document.xml`; defaults and heading formatting live in `styles.xml`.

use html_escape::{encode_double_quoted_attribute, encode_text};
use log::warn;

use crate::error::{Error, Result};
use crate::model::{Alignment, Block, Border, Document, ParagraphStyle, RunStyle, TextRun};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
pub(crate) const STYLES_PART: &str = "word/styles.xml";
pub(crate) const NUMBERING_PART: &str = "word/numbering.xml";
pub(crate) const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub(crate) const CORE_PART: &str = "docProps/core.xml";
pub(crate) const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Whether `c` is allowed in XML 1.0 character data.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_text(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(Error::UnsupportedCharacter(c)),
        None => Ok(()),
    }
}

/// Fails on the first title or run character that XML cannot carry.
pub(crate) fn check_document(document: &Document) -> Result<()> {
    check_text(document.title())?;
    for block in document.blocks() {
        for run in block.runs() {
            check_text(run.text())?;
        }
    }
    Ok(())
}

/// Escapes character data.  Carriage returns become `&#13;` so readers do not fold line ends.
fn escape_text(text: &str) -> String {
    encode_text(text).replace('\r', "&#13;")
}

pub(crate) fn content_types() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/{document}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/{styles}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            r#"<Override PartName="/{numbering}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#,
            r#"<Override PartName="/{core}" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            "</Types>"
        ),
        decl = XML_DECLARATION,
        document = DOCUMENT_PART,
        styles = STYLES_PART,
        numbering = NUMBERING_PART,
        core = CORE_PART,
    )
}

pub(crate) fn package_relationships() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Relationships xmlns="{ns}">"#,
            r#"<Relationship Id="rId1" Type="{base}/officeDocument" Target="{document}"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="{core}"/>"#,
            "</Relationships>"
        ),
        decl = XML_DECLARATION,
        ns = REL_NS,
        base = REL_TYPE_BASE,
        document = DOCUMENT_PART,
        core = CORE_PART,
    )
}

pub(crate) fn document_relationships() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Relationships xmlns="{ns}">"#,
            r#"<Relationship Id="rId1" Type="{base}/styles" Target="styles.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{base}/numbering" Target="numbering.xml"/>"#,
            "</Relationships>"
        ),
        decl = XML_DECLARATION,
        ns = REL_NS,
        base = REL_TYPE_BASE,
    )
}

pub(crate) fn core_properties(title: &str) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title>",
            "<dc:creator>{creator}</dc:creator>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECLARATION,
        title = escape_text(title),
        creator = env!("CARGO_PKG_NAME"),
    )
}

fn run_properties(style: &RunStyle) -> String {
    format!(
        r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>{bold}{color}<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr>"#,
        font = encode_double_quoted_attribute(&style.font),
        bold = if style.bold { "<w:b/>" } else { "" },
        color = style
            .color
            .map(|rgb| format!(r#"<w:color w:val="{}"/>"#, rgb.hex()))
            .unwrap_or_default(),
        size = u32::from(style.size) * 2,
    )
}

fn heading_style(style: &ParagraphStyle) -> String {
    format!(
        concat!(
            r#"<w:style w:type="paragraph" w:styleId="{id}">"#,
            r#"<w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:spacing w:before="{before}" w:after="{after}"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
            "{run}",
            "</w:style>"
        ),
        id = style.id,
        name = style.name,
        before = style.spacing.before,
        after = style.spacing.after,
        outline = style.level.number() - 1,
        run = run_properties(&style.run),
    )
}

pub(crate) fn styles(document: &Document) -> String {
    let sheet = document.styles();
    let default_run = &sheet.default_run;
    let headings: String = sheet.headings.iter().map(heading_style).collect();

    format!(
        concat!(
            "{decl}",
            r#"<w:styles xmlns:w="{ns}">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
            "{headings}",
            "</w:styles>"
        ),
        decl = XML_DECLARATION,
        ns = W_NS,
        font = encode_double_quoted_attribute(&default_run.font),
        size = u32::from(default_run.size) * 2,
        headings = headings,
    )
}

pub(crate) fn numbering(document: &Document) -> String {
    let mut abstract_nums = String::new();
    let mut nums = String::new();

    for (index, list) in document.lists().iter().enumerate() {
        abstract_nums.push_str(&format!(
            concat!(
                r#"<w:abstractNum w:abstractNumId="{index}"><w:multiLevelType w:val="singleLevel"/>"#,
                r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="{format}"/>"#,
                r#"<w:lvlText w:val="{text}"/><w:lvlJc w:val="left"/>"#,
                r#"<w:pPr><w:ind w:left="{left}" w:hanging="{hanging}"/></w:pPr></w:lvl>"#,
                "</w:abstractNum>"
            ),
            index = index,
            format = list.format.keyword(),
            text = encode_double_quoted_attribute(&list.text),
            left = list.indent_left,
            hanging = list.hanging,
        ));
        nums.push_str(&format!(
            r#"<w:num w:numId="{id}"><w:abstractNumId w:val="{index}"/></w:num>"#,
            id = num_id(index),
            index = index,
        ));
    }

    format!(
        r#"{decl}<w:numbering xmlns:w="{ns}">{abstract_nums}{nums}</w:numbering>"#,
        decl = XML_DECLARATION,
        ns = W_NS,
        abstract_nums = abstract_nums,
        nums = nums,
    )
}

/// Numbering instance id of the list at `index` in the definition table.
pub(crate) fn num_id(index: usize) -> usize {
    index + 1
}

fn border(side: &str, border: &Border) -> String {
    format!(
        r#"<w:{side} w:val="{style}" w:sz="{size}" w:space="{space}" w:color="{color}"/>"#,
        side = side,
        style = border.style.keyword(),
        size = border.size,
        space = border.space,
        color = border.color.hex(),
    )
}

fn paragraph_properties(document: &Document, block: &Block) -> String {
    let mut properties = String::new();

    if let Some(level) = block.heading() {
        properties.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, level.style_id()));
    }

    if let Some(membership) = block.list() {
        match document.list(&membership.reference) {
            Some((index, _)) => properties.push_str(&format!(
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                membership.level,
                num_id(index)
            )),
            None => warn!(
                "Block references undefined list '{}'; writing it without numbering",
                membership.reference
            ),
        }
    }

    let borders = block.borders();
    if !borders.is_empty() {
        properties.push_str("<w:pBdr>");
        if let Some(left) = &borders.left {
            properties.push_str(&border("left", left));
        }
        if let Some(bottom) = &borders.bottom {
            properties.push_str(&border("bottom", bottom));
        }
        properties.push_str("</w:pBdr>");
    }

    let spacing = block.spacing();
    properties.push_str(&format!(
        r#"<w:spacing w:before="{}" w:after="{}"/>"#,
        spacing.before, spacing.after
    ));

    if block.indent_left() > 0 {
        properties.push_str(&format!(r#"<w:ind w:left="{}"/>"#, block.indent_left()));
    }

    if block.alignment() != Alignment::Left {
        properties.push_str(&format!(r#"<w:jc w:val="{}"/>"#, block.alignment().keyword()));
    }

    format!("<w:pPr>{}</w:pPr>", properties)
}

fn run(run: &TextRun) -> String {
    let mut properties = String::new();
    if let Some(font) = run.font() {
        let font = encode_double_quoted_attribute(font);
        properties.push_str(&format!(
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:cs="{font}"/>"#,
            font = font
        ));
    }
    if run.is_bold() {
        properties.push_str("<w:b/>");
    }
    if run.is_italic() {
        properties.push_str("<w:i/>");
    }
    if let Some(color) = run.color() {
        properties.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.hex()));
    }
    if let Some(size) = run.size() {
        let half_points = u32::from(size) * 2;
        properties.push_str(&format!(
            r#"<w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/>"#,
            half_points = half_points
        ));
    }

    let properties = if properties.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{}</w:rPr>", properties)
    };

    format!(
        r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        properties,
        escape_text(run.text())
    )
}

fn paragraph(document: &Document, block: &Block) -> String {
    let runs: String = block.runs().iter().map(run).collect();
    format!("<w:p>{}{}</w:p>", paragraph_properties(document, block), runs)
}

pub(crate) fn document_body(document: &Document) -> String {
    let page = document.page();
    let paragraphs: String = document
        .blocks()
        .iter()
        .map(|block| paragraph(document, block))
        .collect();

    format!(
        concat!(
            "{decl}",
            r#"<w:document xmlns:w="{w}" xmlns:r="{r}"><w:body>"#,
            "{paragraphs}",
            r#"<w:sectPr><w:pgSz w:w="{width}" w:h="{height}"/>"#,
            r#"<w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="708" w:footer="708" w:gutter="0"/>"#,
            "</w:sectPr></w:body></w:document>"
        ),
        decl = XML_DECLARATION,
        w = W_NS,
        r = R_NS,
        paragraphs = paragraphs,
        width = page.width,
        height = page.height,
        top = page.margin_top,
        right = page.margin_right,
        bottom = page.margin_bottom,
        left = page.margin_left,
    )
}
