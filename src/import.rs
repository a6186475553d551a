use crate::block::{append_to_chain, Block, Workspace};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportWarning {
    pub line: usize,
    pub message: String,
}

impl Display for ImportWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug, Clone)]
struct SourceLine {
    text: String,
    number: usize,
}

pub fn import_source(source: &str) -> (Workspace, Vec<ImportWarning>) {
    let mut hat = Block::hat();
    let warnings = import_into(&mut hat, source);
    let mut workspace = Workspace::new();
    workspace.push_top_block(hat);
    (workspace, warnings)
}

pub fn import_into(container: &mut Block, source: &str) -> Vec<ImportWarning> {
    let lines = source_lines(source);
    let mut warnings = Vec::new();
    if let Some(chain) = container.body_slot_mut() {
        parse_range(&lines, 0, lines.len(), chain, &mut warnings, true);
    }
    warnings
}

fn source_lines(source: &str) -> Vec<SourceLine> {
    let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .lines()
        .enumerate()
        .map(|(idx, raw)| SourceLine {
            text: raw.trim().to_string(),
            number: idx + 1,
        })
        .collect()
}

// Scans [start, end), appending one block per logical line to `chain`, and
// returns the first unconsumed index. A bare `}` ends the scan unless this is
// the root scan, where it is recovered with a warning instead.
fn parse_range(
    lines: &[SourceLine],
    start: usize,
    end: usize,
    chain: &mut Option<Box<Block>>,
    warnings: &mut Vec<ImportWarning>,
    root: bool,
) -> usize {
    let mut i = start;
    while i < end {
        let line = &lines[i];
        if line.text.is_empty() {
            i += 1;
            continue;
        }
        if line.text == "}" {
            if !root {
                return i + 1;
            }
            warnings.push(ImportWarning {
                line: line.number,
                message: "unexpected '}' outside any block".to_string(),
            });
            i += 1;
            continue;
        }
        if line.text.ends_with('{') {
            let header_text = line.text[..line.text.len() - 1].trim_end().to_string();
            let close = find_scope_end(lines, i + 1, end);
            if close == end {
                warnings.push(ImportWarning {
                    line: line.number,
                    message: format!("unclosed '{{' after '{}'", header_text),
                });
            }
            let mut header = Block::header(header_text);
            if let Some(body) = header.body_slot_mut() {
                parse_range(lines, i + 1, close, body, warnings, false);
            }
            append_to_chain(chain, header);
            i = close + 1;
            continue;
        }
        // One trailing terminator is stripped; stripping again is a no-op.
        let code = line.text.strip_suffix(';').unwrap_or(&line.text).trim_end();
        append_to_chain(chain, Block::statement(code));
        i += 1;
    }
    end
}

// Delimiter detection is purely textual: a brace inside a quoted string is
// indistinguishable from a real delimiter here. Known limitation of the
// line-oriented import format, kept as such.
fn find_scope_end(lines: &[SourceLine], after: usize, end: usize) -> usize {
    let mut depth = 1i32;
    for j in after..end {
        let text = &lines[j].text;
        if text.contains('{') {
            depth += 1;
        }
        if text.contains('}') {
            depth -= 1;
        }
        if depth == 0 {
            return j;
        }
    }
    end
}
