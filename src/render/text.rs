// src/render/text.rs
use std::fmt::Write;

use super::plan::{Block, RenderPlan};

pub const TEXT_HEADING: &str = "Extracted Content";

/// Terminal rendering of a plan, used by the headless `process` command
pub fn render_text(plan: &RenderPlan) -> String {
    let mut out = String::new();
    match plan {
        RenderPlan::TaskList(_) | RenderPlan::ItemList(_) => {
            for block in plan.blocks() {
                write_block(&mut out, block);
            }
        }
        RenderPlan::TextBlock(text) => {
            let _ = writeln!(out, "=== {} ===", TEXT_HEADING);
            let _ = writeln!(out, "{}", text);
        }
        RenderPlan::RawJson(json) => {
            let _ = writeln!(out, "{}", json);
        }
        RenderPlan::PlainValue(value) => {
            let _ = writeln!(out, "{}", value);
        }
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    let _ = writeln!(out, "[{}]", block.title);
    for line in &block.lines {
        let _ = writeln!(out, "  {}", line);
    }
}
