use colored::Colorize;

use optimizer_core::StructuredResult;
use optimizer_suggest::{render, Block, ResultPanel};

pub fn print_result(result: &StructuredResult) {
    print!("{}", format_panel(&render(result)));
}

/// Plain-text layout of the result panel; colour is dropped when stdout
/// is not a terminal.
pub fn format_panel(panel: &ResultPanel) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", panel.heading.bold()));
    for block in &panel.blocks {
        out.push('\n');
        out.push_str(&format!("{}\n", block.title().cyan().bold()));
        match block {
            Block::Code { code, .. } => {
                out.push_str(&format!("{}\n", "-".repeat(40).dimmed()));
                out.push_str(code);
                if !code.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&format!("{}\n", "-".repeat(40).dimmed()));
            }
            Block::Bullets { bullets, .. } => {
                for b in bullets {
                    out.push_str("  • ");
                    out.push_str(b);
                    out.push('\n');
                }
            }
        }
    }
    out
}

pub fn copy_feedback(label: &str) -> String {
    label.green().to_string()
}
