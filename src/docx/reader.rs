//! Decoder for the `.docx` packages written by [`DocxSerializer`](super::DocxSerializer).
//!
//! This is not a general WordprocessingML parser.  It understands the subset of markup the
//! serializer emits (paragraph style, numbering, left and bottom borders, alignment, run
//! formatting) and reports it back as plain values.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::OnceLock;

use html_escape::decode_html_entities;
use regex::Regex;
use zip::ZipArchive;

use super::xml::{is_xml_char, CORE_PART, DOCUMENT_PART, NUMBERING_PART};
use crate::error::{Error, Result};
use crate::model::{Alignment, ListFormat};
use crate::theme::Rgb;

/// One decoded text run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
    /// Size in points.
    pub size: Option<u8>,
    pub font: Option<String>,
}

/// One decoded paragraph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedBlock {
    pub style_id: Option<String>,
    pub num_id: Option<usize>,
    pub left_border: Option<Rgb>,
    pub bottom_border: Option<Rgb>,
    pub alignment: Alignment,
    pub runs: Vec<DecodedRun>,
}

impl DecodedBlock {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Title, list formats and paragraphs of a decoded package.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedDocument {
    pub title: String,
    pub blocks: Vec<DecodedBlock>,
    lists: BTreeMap<usize, ListFormat>,
}

impl DecodedDocument {
    /// Marker format of the numbering instance `num_id`.
    pub fn list_format(&self, num_id: usize) -> Option<ListFormat> {
        self.lists.get(&num_id).copied()
    }
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static REGEX: OnceLock<Regex> = OnceLock::new();
            REGEX.get_or_init(|| Regex::new($pattern).expect("Invalid docx regex"))
        }
    };
}

cached_regex!(paragraph_regex, r"(?s)<w:p>(.*?)</w:p>");
cached_regex!(paragraph_properties_regex, r"(?s)<w:pPr>(.*?)</w:pPr>");
cached_regex!(style_regex, r#"<w:pStyle w:val="([^"]*)"/>"#);
cached_regex!(num_id_regex, r#"<w:numId w:val="(\d+)"/>"#);
cached_regex!(left_border_regex, r#"<w:left w:val="[^"]*" [^>]*w:color="([^"]*)"/>"#);
cached_regex!(bottom_border_regex, r#"<w:bottom w:val="[^"]*" [^>]*w:color="([^"]*)"/>"#);
cached_regex!(justification_regex, r#"<w:jc w:val="([^"]*)"/>"#);
cached_regex!(run_regex, r"(?s)<w:r>(.*?)</w:r>");
cached_regex!(run_properties_regex, r"(?s)<w:rPr>(.*?)</w:rPr>");
cached_regex!(font_regex, r#"<w:rFonts w:ascii="([^"]*)""#);
cached_regex!(color_regex, r#"<w:color w:val="([^"]*)"/>"#);
cached_regex!(size_regex, r#"<w:sz w:val="(\d+)"/>"#);
cached_regex!(text_regex, r#"(?s)<w:t(?: [^>]*)?>(.*?)</w:t>"#);
cached_regex!(title_regex, r"(?s)<dc:title>(.*?)</dc:title>");
cached_regex!(
    abstract_num_regex,
    r#"(?s)<w:abstractNum w:abstractNumId="(\d+)">(.*?)</w:abstractNum>"#
);
cached_regex!(num_format_regex, r#"<w:numFmt w:val="([^"]*)"/>"#);
cached_regex!(
    num_regex,
    r#"<w:num w:numId="(\d+)"><w:abstractNumId w:val="(\d+)"/></w:num>"#
);

/// Decodes a `.docx` package produced by the serializer.
pub fn read_document(bytes: &[u8]) -> Result<DecodedDocument> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let body = read_part(&mut archive, DOCUMENT_PART)?;
    let title = match read_optional_part(&mut archive, CORE_PART)? {
        Some(core) => capture(title_regex(), &core)
            .map(decode_text)
            .transpose()?
            .unwrap_or_default(),
        None => String::new(),
    };
    let lists = match read_optional_part(&mut archive, NUMBERING_PART)? {
        Some(numbering) => decode_numbering(&numbering)?,
        None => BTreeMap::new(),
    };

    let blocks = paragraph_regex()
        .captures_iter(&body)
        .map(|captures| decode_paragraph(&captures[1]))
        .collect::<Result<Vec<_>>>()?;

    Ok(DecodedDocument {
        title,
        blocks,
        lists,
    })
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    read_optional_part(archive, name)?
        .ok_or_else(|| Error::Decode(format!("package has no {} part", name)))
}

fn read_optional_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn capture<'h>(regex: &Regex, haystack: &'h str) -> Option<&'h str> {
    regex
        .captures(haystack)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Decode(format!("invalid {} '{}'", what, value)))
}

fn parse_color(value: &str) -> Result<Rgb> {
    value
        .parse()
        .map_err(|_| Error::Decode(format!("invalid color '{}'", value)))
}

fn decode_numbering(xml: &str) -> Result<BTreeMap<usize, ListFormat>> {
    let mut formats = BTreeMap::new();
    for captures in abstract_num_regex().captures_iter(xml) {
        let id: usize = parse_number(&captures[1], "abstract numbering id")?;
        let format = match capture(num_format_regex(), &captures[2]) {
            Some("bullet") => ListFormat::Bullet,
            Some("decimal") => ListFormat::Decimal,
            other => {
                return Err(Error::Decode(format!(
                    "unsupported numbering format {:?}",
                    other
                )))
            }
        };
        formats.insert(id, format);
    }

    let mut lists = BTreeMap::new();
    for captures in num_regex().captures_iter(xml) {
        let num_id: usize = parse_number(&captures[1], "numbering id")?;
        let abstract_id: usize = parse_number(&captures[2], "abstract numbering id")?;
        let format = formats.get(&abstract_id).copied().ok_or_else(|| {
            Error::Decode(format!("numbering {} references missing definition", num_id))
        })?;
        lists.insert(num_id, format);
    }
    Ok(lists)
}

fn decode_alignment(value: &str) -> Result<Alignment> {
    match value {
        "left" | "start" => Ok(Alignment::Left),
        "center" => Ok(Alignment::Center),
        "right" | "end" => Ok(Alignment::Right),
        "both" => Ok(Alignment::Justified),
        other => Err(Error::Decode(format!("unsupported alignment '{}'", other))),
    }
}

/// Decodes character data the way an XML 1.0 parser does.
///
/// Literal line ends are normalized to `\n` before references are expanded, so only `&#13;`
/// yields a carriage return.
fn decode_text(raw: &str) -> Result<String> {
    if let Some(c) = raw.chars().find(|c| !is_xml_char(*c)) {
        return Err(Error::Decode(format!("character {:?} is not allowed in XML", c)));
    }
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    Ok(decode_html_entities(&normalized).into_owned())
}

fn decode_paragraph(xml: &str) -> Result<DecodedBlock> {
    let mut block = DecodedBlock::default();

    if let Some(properties) = capture(paragraph_properties_regex(), xml) {
        block.style_id = capture(style_regex(), properties).map(str::to_string);
        block.num_id = capture(num_id_regex(), properties)
            .map(|value| parse_number(value, "numbering id"))
            .transpose()?;
        block.left_border = capture(left_border_regex(), properties)
            .map(parse_color)
            .transpose()?;
        block.bottom_border = capture(bottom_border_regex(), properties)
            .map(parse_color)
            .transpose()?;
        if let Some(value) = capture(justification_regex(), properties) {
            block.alignment = decode_alignment(value)?;
        }
    }

    block.runs = run_regex()
        .captures_iter(xml)
        .map(|captures| decode_run(&captures[1]))
        .collect::<Result<Vec<_>>>()?;

    Ok(block)
}

fn decode_run(xml: &str) -> Result<DecodedRun> {
    let mut run = DecodedRun {
        text: text_regex()
            .captures_iter(xml)
            .map(|captures| decode_text(&captures[1]))
            .collect::<Result<String>>()?,
        ..DecodedRun::default()
    };

    if let Some(properties) = capture(run_properties_regex(), xml) {
        run.bold = properties.contains("<w:b/>");
        run.italic = properties.contains("<w:i/>");
        run.font = capture(font_regex(), properties)
            .map(|font| decode_html_entities(font).into_owned());
        run.color = capture(color_regex(), properties)
            .map(parse_color)
            .transpose()?;
        run.size = capture(size_regex(), properties)
            .map(|value| parse_number::<u16>(value, "run size"))
            .transpose()?
            .map(|half_points| u8::try_from(half_points / 2))
            .transpose()
            .map_err(|_| Error::Decode("run size out of range".to_string()))?;
    }

    Ok(run)
}
