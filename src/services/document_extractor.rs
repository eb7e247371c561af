//! 文档解析服务 - 业务能力层
//!
//! 把上传文件的原始字节转换成一整段文本。
//!
//! - TXT：UTF-8 解码
//! - PDF：先用 `lopdf` 检查页数，再用 `pdf-extract` 提取文本
//! - DOCX：用 `docx-rs` 读取文档结构，每个段落一行
//! - PPTX：OOXML 压缩包，直接读取幻灯片 XML 并提取文本节点

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::error::{AppResult, ExtractionError, ValidationError};
use crate::models::DocumentKind;

static PPTX_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p:sp>.*?</p:sp>").expect("PPTX 形状正则无效"));
static PPTX_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a:p[ >].*?</a:p>").expect("PPTX 段落正则无效"));
static PPTX_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a:t(?:\s[^>]*)?>([^<]*)</a:t>").expect("PPTX 文本正则无效"));
static SLIDE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("幻灯片路径正则无效"));
static XML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("XML 实体正则无效")
});

/// 文档解析器
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    max_pdf_pages: usize,
}

impl DocumentExtractor {
    pub fn new(max_pdf_pages: usize) -> Self {
        Self { max_pdf_pages }
    }

    /// 提取文档文本
    ///
    /// # 返回
    /// 文档损坏时返回 `ExtractionError`；PDF 超过页数上限时返回 `ValidationError`
    pub fn extract_text(&self, bytes: &[u8], kind: DocumentKind) -> AppResult<String> {
        debug!("解析 {} 文件 ({} 字节)", kind, bytes.len());

        let text = match kind {
            DocumentKind::Txt => parse_txt(bytes)?,
            DocumentKind::Pdf => self.parse_pdf(bytes)?,
            DocumentKind::Docx => parse_docx(bytes)?,
            DocumentKind::Pptx => parse_pptx(bytes)?,
        };

        info!("📄 {} 文件解析完成，共 {} 字符", kind, text.chars().count());
        Ok(text)
    }

    fn parse_pdf(&self, bytes: &[u8]) -> AppResult<String> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractionError::new(DocumentKind::Pdf, e))?;

        let page_count = document.get_pages().len();
        if page_count > self.max_pdf_pages {
            return Err(ValidationError::TooManyPages {
                limit: self.max_pdf_pages,
                actual: page_count,
            }
            .into());
        }

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::new(DocumentKind::Pdf, e))?;
        Ok(text)
    }
}

fn parse_txt(bytes: &[u8]) -> Result<String, ExtractionError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ExtractionError::new(DocumentKind::Txt, e))
}

fn parse_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx =
        docx_rs::read_docx(bytes).map_err(|e| ExtractionError::new(DocumentKind::Docx, e))?;

    let mut text = String::new();
    for child in &docx.document.children {
        // 表格等非段落内容不参与出题
        if let DocumentChild::Paragraph(paragraph) = child {
            text.push_str(&paragraph_text(paragraph));
            text.push('\n');
        }
    }
    Ok(text)
}

/// 拼接段落中所有文本，超链接里的文字也算在内
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut line = String::new();
    collect_paragraph_children(&paragraph.children, &mut line);
    line
}

fn collect_paragraph_children(children: &[ParagraphChild], line: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => line.push_str(&t.text),
                        RunChild::Tab(_) => line.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_paragraph_children(&link.children, line),
            _ => {}
        }
    }
}

fn parse_pptx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::new(DocumentKind::Pptx, e))?;

    // 按幻灯片编号排序
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = SLIDE_ENTRY.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort();

    let mut text = String::new();
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name, DocumentKind::Pptx)?;
        for shape in PPTX_SHAPE.find_iter(&xml) {
            let paragraphs: Vec<String> = PPTX_PARAGRAPH
                .find_iter(shape.as_str())
                .map(|paragraph| collect_runs(&PPTX_TEXT, paragraph.as_str()))
                .collect();
            text.push_str(&paragraphs.join("\n"));
            text.push('\n');
        }
    }
    Ok(text)
}

fn read_entry(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
    kind: DocumentKind,
) -> Result<String, ExtractionError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ExtractionError::new(kind, format!("{}: {}", name, e)))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::new(kind, format!("{}: {}", name, e)))?;
    Ok(xml)
}

/// 拼接一个段落里所有文本节点
fn collect_runs(run_pattern: &Regex, paragraph_xml: &str) -> String {
    run_pattern
        .captures_iter(paragraph_xml)
        .filter_map(|caps| caps.get(1))
        .map(|run| unescape_xml(run.as_str()))
        .collect()
}

/// 还原 XML 实体
pub fn unescape_xml(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, content) in entries {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_txt() {
        let extractor = DocumentExtractor::new(200);
        let text = extractor
            .extract_text("Hello Rust".as_bytes(), DocumentKind::Txt)
            .unwrap();
        assert_eq!(text, "Hello Rust");

        let result = extractor.extract_text(&[0xff, 0xfe, 0xfd], DocumentKind::Txt);
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
    const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

    fn docx_package(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        zip_with(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/document.xml", &document),
        ])
    }

    #[test]
    fn test_docx_self_closing_empty_paragraph_keeps_blank_line() {
        let bytes = docx_package(
            r#"<w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p><w:p w:rsidR="00A1"/><w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>"#,
        );

        let text = DocumentExtractor::new(200)
            .extract_text(&bytes, DocumentKind::Docx)
            .unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond paragraph.\n");
    }

    #[test]
    fn test_docx_joins_runs_per_paragraph() {
        let bytes = docx_package(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Rome and Carthage</w:t></w:r></w:p><w:p w:rsidR="1"><w:r><w:t>Punic Wars</w:t></w:r><w:r><w:t>.</w:t></w:r></w:p>"#,
        );

        let text = DocumentExtractor::new(200)
            .extract_text(&bytes, DocumentKind::Docx)
            .unwrap();
        assert_eq!(text, "Rome and Carthage\nPunic Wars.\n");
    }

    #[test]
    fn test_docx_written_by_docx_rs() {
        let mut cursor = Cursor::new(Vec::new());
        docx_rs::Docx::new()
            .add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text("Hannibal crossed the Alps.")),
            )
            .add_paragraph(docx_rs::Paragraph::new())
            .add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text("Scipio won at Zama.")),
            )
            .build()
            .pack(&mut cursor)
            .unwrap();

        let text = DocumentExtractor::new(200)
            .extract_text(&cursor.into_inner(), DocumentKind::Docx)
            .unwrap();
        assert_eq!(text, "Hannibal crossed the Alps.\n\nScipio won at Zama.\n");
    }

    #[test]
    fn test_pptx_slides_in_numeric_order() {
        let slide = |body: &str| {
            format!(
                r#"<p:sld><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p><a:p><a:r><a:t>Second line</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
                body
            )
        };
        let slide1 = slide("Slide one");
        let slide2 = slide("Slide two");
        let slide10 = slide("Slide ten");
        let bytes = zip_with(&[
            ("ppt/slides/slide10.xml", &slide10),
            ("ppt/slides/slide2.xml", &slide2),
            ("ppt/slides/slide1.xml", &slide1),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
        ]);

        let text = DocumentExtractor::new(200)
            .extract_text(&bytes, DocumentKind::Pptx)
            .unwrap();
        assert_eq!(
            text,
            "Slide one\nSecond line\nSlide two\nSecond line\nSlide ten\nSecond line\n"
        );
    }

    #[test]
    fn test_corrupted_archives() {
        let extractor = DocumentExtractor::new(200);
        assert!(matches!(
            extractor.extract_text(b"not a zip", DocumentKind::Docx),
            Err(AppError::Extraction(_))
        ));
        let no_body = zip_with(&[("other.xml", "<x/>")]);
        assert!(matches!(
            extractor.extract_text(&no_body, DocumentKind::Docx),
            Err(AppError::Extraction(_))
        ));
        assert!(matches!(
            extractor.extract_text(b"%PDF-garbage", DocumentKind::Pdf),
            Err(AppError::Extraction(_))
        ));
    }

    #[test]
    fn test_unescape_xml() {
        assert_eq!(
            unescape_xml("a &lt;b&gt; &quot;c&quot; &apos;d&apos; &#65;&#x42; &bogus;"),
            "a <b> \"c\" 'd' AB &bogus;"
        );
    }
}
