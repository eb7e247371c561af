//! 导出服务 - 业务能力层
//!
//! 把一份测验的题目列表转换成可下载的文件字节。三种格式共用同一套文本排版：
//!
//! ```text
//! Q1: 题干
//!    A) 选项
//!    ...
//!    Correct Answer: 答案
//! (空行)
//! ```

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::info;

use crate::error::ExportError;
use crate::models::{ExportFormat, QuestionItem};

const QUIZ_TITLE: &str = "Generated Quiz";

// A4，单位 pt
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 11;
const TITLE_SIZE: i64 = 18;
const LEADING: i64 = 14;
const WRAP_CHARS: usize = 90;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN - 2 * LEADING) / LEADING) as usize;

/// 按统一排版生成文本行
pub fn item_lines(items: &[QuestionItem]) -> Vec<String> {
    let mut lines = Vec::new();
    for (number, item) in items.iter().enumerate() {
        lines.push(format!("Q{}: {}", number + 1, item.question_text()));
        if let QuestionItem::Mcq { options, .. } = item {
            for (key, text) in options {
                lines.push(format!("   {}) {}", key, text));
            }
        }
        lines.push(format!("   Correct Answer: {}", item.correct_answer()));
        lines.push(String::new());
    }
    lines
}

/// 导出为指定格式
pub fn export(items: &[QuestionItem], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let bytes = match format {
        ExportFormat::Txt => export_txt(items),
        ExportFormat::Docx => export_docx(items)?,
        ExportFormat::Pdf => export_pdf(items)?,
    };
    info!(
        "💾 导出 {} 道题为 {} ({} 字节)",
        items.len(),
        format.file_name(),
        bytes.len()
    );
    Ok(bytes)
}

pub fn export_txt(items: &[QuestionItem]) -> Vec<u8> {
    let mut text = item_lines(items).join("\n");
    text.push('\n');
    text.into_bytes()
}

pub fn export_docx(items: &[QuestionItem]) -> Result<Vec<u8>, ExportError> {
    let heading = Paragraph::new().add_run(Run::new().add_text(QUIZ_TITLE).bold().size(32));
    let docx = item_lines(items)
        .into_iter()
        .fold(Docx::new().add_paragraph(heading), |docx, line| {
            docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
        });

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}

pub fn export_pdf(items: &[QuestionItem]) -> Result<Vec<u8>, ExportError> {
    let lines: Vec<String> = item_lines(items)
        .iter()
        .flat_map(|line| wrap_line(line, WRAP_CHARS))
        .collect();
    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![lines.as_slice()]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (page_index, page_lines) in pages.iter().enumerate() {
        let content = page_content(page_index, page_lines);
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buffer)
}

/// 单页内容：首页带标题，每页带页脚
fn page_content(page_index: usize, lines: &[String]) -> Content {
    let mut operations = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    if page_index == 0 {
        push_text(&mut operations, TITLE_SIZE, MARGIN, y, QUIZ_TITLE);
        y -= 2 * LEADING;
    }
    for line in lines {
        if !line.is_empty() {
            push_text(&mut operations, FONT_SIZE, MARGIN, y, line);
        }
        y -= LEADING;
    }

    let footer = format!("Page {}", page_index + 1);
    push_text(&mut operations, 9, PAGE_WIDTH / 2 - 15, MARGIN / 2, &footer);

    Content { operations }
}

fn push_text(operations: &mut Vec<Operation>, size: i64, x: i64, y: i64, text: &str) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::string_literal(to_latin1(text))],
    ));
    operations.push(Operation::new("ET", vec![]));
}

/// Helvetica 只能显示 Latin-1，其余字符替换为 `?`
fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// 按单词折行；单个超长单词按字符截断
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let indent: String = line.chars().take_while(|c| *c == ' ').collect();
    let mut wrapped = Vec::new();
    let mut current = indent.clone();

    for word in line.split_whitespace() {
        let current_len = current.chars().count();
        let word_len = word.chars().count();
        let needs_space = current_len > indent.len();

        if current_len + usize::from(needs_space) + word_len > width && needs_space {
            wrapped.push(std::mem::replace(&mut current, indent.clone()));
        } else if needs_space {
            current.push(' ');
        }

        if indent.len() + word_len > width {
            let chars: Vec<char> = word.chars().collect();
            let room = width.saturating_sub(indent.len()).max(1);
            for piece in chars.chunks(room) {
                if current.chars().count() > indent.len() {
                    wrapped.push(std::mem::replace(&mut current, indent.clone()));
                }
                current.extend(piece);
            }
        } else {
            current.push_str(word);
        }
    }
    if current.chars().count() > indent.len() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;
    use crate::services::document_extractor::DocumentExtractor;
    use std::collections::BTreeMap;

    fn sample_items() -> Vec<QuestionItem> {
        let options: BTreeMap<String, String> = [("A", "Paris"), ("B", "Rome"), ("C", "Berlin"), ("D", "Madrid")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vec![
            QuestionItem::Mcq {
                id: "1".to_string(),
                question_text: "What is the capital of France?".to_string(),
                options,
                correct_answer: "Paris".to_string(),
            },
            QuestionItem::FillBlank {
                id: "2".to_string(),
                question_text: "___ is the capital of Italy.".to_string(),
                correct_answer: "Rome".to_string(),
            },
        ]
    }

    #[test]
    fn test_item_lines_layout() {
        let lines = item_lines(&sample_items());
        assert_eq!(
            lines,
            vec![
                "Q1: What is the capital of France?",
                "   A) Paris",
                "   B) Rome",
                "   C) Berlin",
                "   D) Madrid",
                "   Correct Answer: Paris",
                "",
                "Q2: ___ is the capital of Italy.",
                "   Correct Answer: Rome",
                "",
            ]
        );
    }

    #[test]
    fn test_txt_export() {
        let bytes = export(&sample_items(), ExportFormat::Txt).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Q1: What is the capital of France?\n"));
        assert!(text.contains("   Correct Answer: Rome\n"));
    }

    #[test]
    fn test_docx_export_is_readable() {
        let bytes = export(&sample_items(), ExportFormat::Docx).unwrap();
        let text = DocumentExtractor::new(200)
            .extract_text(&bytes, DocumentKind::Docx)
            .unwrap();
        assert!(text.contains(QUIZ_TITLE));
        assert!(text.contains("Q2: ___ is the capital of Italy."));
        assert!(text.contains("A) Paris"));
    }

    #[test]
    fn test_pdf_export_paginates() {
        let single = export(&sample_items(), ExportFormat::Pdf).unwrap();
        assert!(single.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&single).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let many: Vec<QuestionItem> = std::iter::repeat(sample_items())
            .take(20)
            .flatten()
            .collect();
        let bytes = export_pdf(&many).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let expected = (item_lines(&many).len() + LINES_PER_PAGE - 1) / LINES_PER_PAGE;
        assert_eq!(doc.get_pages().len(), expected);
        assert!(expected > 1);
    }

    #[test]
    fn test_pdf_export_empty_quiz_has_one_page() {
        let bytes = export_pdf(&[]).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_to_latin1() {
        assert_eq!(to_latin1("café 北京"), b"caf\xe9 ??".to_vec());
    }

    #[test]
    fn test_wrap_line() {
        let line = format!("Q1: {}", "word ".repeat(40));
        let wrapped = wrap_line(line.trim_end(), 30);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 30));
        assert_eq!(wrapped.join(" "), line.trim_end());

        let indented = wrap_line("   Correct Answer: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", 20);
        assert!(indented.iter().all(|l| l.starts_with("   ")));
        assert!(indented.iter().all(|l| l.chars().count() <= 20));

        assert_eq!(wrap_line("short", 30), vec!["short"]);
    }
}
