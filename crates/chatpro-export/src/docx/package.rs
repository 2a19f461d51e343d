//! Office Open XML packaging for [`Document`].

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use chatpro_core::{Error, Result};

use super::{Document, Paragraph, TextRun};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="60"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Serialize `document` into a `.docx` package.
pub fn pack(document: &Document) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("word/document.xml", document_xml(document)),
        ("word/styles.xml", STYLES.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("docProps/core.xml", core_xml(&document.title)),
    ];
    for (name, body) in &parts {
        zip.start_file(*name, options)
            .map_err(|e| Error::Export(format!("{}: {}", name, e)))?;
        zip.write_all(body.as_bytes())
            .map_err(|e| Error::Export(format!("{}: {}", name, e)))?;
    }

    let bytes = zip.finish()?.into_inner();
    debug!("packed {} paragraphs into {} bytes", document.paragraphs.len(), bytes.len());
    Ok(bytes)
}

pub fn document_xml(document: &Document) -> String {
    let body: String = document.paragraphs.iter().map(paragraph_xml).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        W_NS, body
    )
}

fn paragraph_xml(p: &Paragraph) -> String {
    let mut props = String::new();
    if let Some(level) = p.heading {
        props.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, level.style_id()));
    }
    if let Some(border) = p.bottom_border {
        props.push_str(&format!(
            r#"<w:pBdr><w:bottom w:val="single" w:sz="{}" w:space="{}" w:color="{}"/></w:pBdr>"#,
            border.size, border.space, border.color
        ));
    }
    if let Some(fill) = p.shading {
        props.push_str(&format!(r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, fill));
    }
    let mut spacing = String::new();
    if let Some(before) = p.spacing.before {
        spacing.push_str(&format!(r#" w:before="{}""#, before));
    }
    if let Some(after) = p.spacing.after {
        spacing.push_str(&format!(r#" w:after="{}""#, after));
    }
    if !spacing.is_empty() {
        props.push_str(&format!("<w:spacing{}/>", spacing));
    }

    let runs: String = p.runs.iter().map(run_xml).collect();
    format!("<w:p><w:pPr>{}</w:pPr>{}</w:p>", props, runs)
}

fn run_xml(run: &TextRun) -> String {
    let mut props = String::new();
    if let Some(font) = run.font {
        props.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            font
        ));
    }
    if run.bold {
        props.push_str("<w:b/>");
    }
    if let Some(color) = run.color {
        props.push_str(&format!(r#"<w:color w:val="{}"/>"#, color));
    }
    if let Some(size) = run.size {
        props.push_str(&format!(r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size));
    }

    let text = run
        .text
        .split('\n')
        .map(|line| format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(line)))
        .collect::<Vec<_>>()
        .join("<w:br/>");
    format!("<w:r><w:rPr>{}</w:rPr>{}</w:r>", props, text)
}

fn core_xml(title: &str) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created></cp:coreProperties>"#,
        escape_xml(title),
        now
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            // Not representable in XML 1.0.
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::build_document;
    use chatpro_core::ChatMessage;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut body = String::new();
        part.read_to_string(&mut body).unwrap();
        body
    }

    #[test]
    fn test_package_parts() {
        let doc = build_document(&[ChatMessage::user("hi")], "ChatGPT", "now");
        let bytes = pack(&doc).unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/core.xml",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/styles.xml",
            ]
        );
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>ChatGPT Conversation</dc:title>"));
    }

    #[test]
    fn test_document_xml_content() {
        let messages = vec![
            ChatMessage::user("Is 1 < 2 & 3 > 2?"),
            ChatMessage::assistant("```\nline one\nline two\n```"),
        ];
        let bytes = pack(&build_document(&messages, "Claude", "now")).unwrap();
        let xml = read_part(&bytes, "word/document.xml");

        assert!(xml.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(xml.contains("Claude Conversation"));
        assert!(xml.contains("Is 1 &lt; 2 &amp; 3 &gt; 2?"));
        assert!(xml.contains(r#"<w:shd w:val="clear" w:color="auto" w:fill="F3F4F6"/>"#));
        assert!(xml.contains(
            r#"<w:t xml:space="preserve">line one</w:t><w:br/><w:t xml:space="preserve">line two</w:t>"#
        ));
        assert!(xml.contains(
            r#"<w:bottom w:val="single" w:sz="6" w:space="10" w:color="CCCCCC"/>"#
        ));
    }

    #[test]
    fn test_escape_xml_drops_control_chars() {
        assert_eq!(escape_xml("a\u{1}b\t\"c\""), "ab\t&quot;c&quot;");
    }

    #[test]
    fn test_written_package_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let doc = build_document(&[ChatMessage::assistant("done")], "Gemini", "now");
        std::fs::write(&path, pack(&doc).unwrap()).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 6);
    }
}
