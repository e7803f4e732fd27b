use serde::Serialize;

use optimizer_core::{ResultItem, StructuredResult, BULLET};

/// One rendered result section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    /// Read-only code block with the copy control attached.
    Code { title: String, code: String },
    Bullets { title: String, bullets: Vec<String> },
}

impl Block {
    pub fn title(&self) -> &str {
        match self {
            Block::Code { title, .. } | Block::Bullets { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPanel {
    pub heading: String,
    pub blocks: Vec<Block>,
}

/// Split a description on the bullet separator, dropping blank segments.
pub fn split_bullets(description: &str) -> Vec<String> {
    description
        .split(BULLET)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Items with a `code` detail render as code blocks; other detail keys are
/// not shown.
pub fn render_item(item: &ResultItem) -> Block {
    match item.code() {
        Some(code) => Block::Code {
            title: item.title.clone(),
            code: code.to_string(),
        },
        None => Block::Bullets {
            title: item.title.clone(),
            bullets: split_bullets(&item.description),
        },
    }
}

pub fn render(result: &StructuredResult) -> ResultPanel {
    ResultPanel {
        heading: result.summary.clone(),
        blocks: result.items.iter().map(render_item).collect(),
    }
}
