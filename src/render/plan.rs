// src/render/plan.rs
use serde_json::{Map, Value};
use std::fmt;

/// One displayed row: `Key: value` for mapping fields, a bare value otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub key: Option<String>,
    pub value: String,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}: {}", key, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// One expandable section of a task or item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub title: String,
    pub lines: Vec<Line>,
    pub expanded: bool,
}

/// Which display strategy a result gets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    TaskList(Vec<Block>),
    TextBlock(String),
    RawJson(String),
    ItemList(Vec<Block>),
    PlainValue(String),
}

impl RenderPlan {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderPlan::TaskList(_) => "task-list",
            RenderPlan::TextBlock(_) => "text-block",
            RenderPlan::RawJson(_) => "raw-json",
            RenderPlan::ItemList(_) => "item-list",
            RenderPlan::PlainValue(_) => "plain-value",
        }
    }

    pub fn blocks(&self) -> &[Block] {
        match self {
            RenderPlan::TaskList(blocks) | RenderPlan::ItemList(blocks) => blocks,
            _ => &[],
        }
    }
}

/// Pick a display strategy for a webhook result.
///
/// Rules are checked in order and the first match wins:
/// a mapping with `tasks` (or else `items`), a mapping with `text` (or else
/// `content`), any other mapping, a sequence, and finally any scalar.
pub fn classify(value: &Value) -> RenderPlan {
    match value {
        Value::Object(map) => classify_mapping(value, map),
        Value::Array(elements) => RenderPlan::ItemList(blocks("Element", elements)),
        scalar => RenderPlan::PlainValue(plain_text(scalar)),
    }
}

fn classify_mapping(value: &Value, map: &Map<String, Value>) -> RenderPlan {
    if let Some(tasks) = map.get("tasks").or_else(|| map.get("items")) {
        return match tasks {
            Value::Array(elements) => RenderPlan::TaskList(blocks("Task", elements)),
            // the whole result, not just the malformed list
            _ => RenderPlan::RawJson(pretty(value)),
        };
    }

    if let Some(text) = map.get("text").or_else(|| map.get("content")) {
        let text = match text {
            Value::Null => String::new(),
            other => plain_text(other),
        };
        return RenderPlan::TextBlock(text);
    }

    RenderPlan::RawJson(pretty(value))
}

fn blocks(label: &str, elements: &[Value]) -> Vec<Block> {
    elements
        .iter()
        .enumerate()
        .map(|(idx, element)| Block {
            title: format!("{} {}", label, idx + 1),
            lines: element_lines(element),
            expanded: true,
        })
        .collect()
}

fn element_lines(element: &Value) -> Vec<Line> {
    match element {
        Value::Object(fields) => fields
            .iter()
            .map(|(key, value)| Line {
                key: Some(capitalize_key(key)),
                value: plain_text(value),
            })
            .collect(),
        other => vec![Line { key: None, value: plain_text(other) }],
    }
}

/// Uppercase the first character only; the rest of the key is untouched
pub fn capitalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strings without quotes, everything else as compact JSON
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    super::export::export_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(block: &Block) -> Vec<String> {
        block.lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn tasks_become_numbered_blocks_in_key_order() {
        let value = json!({
            "tasks": [
                {"title": "Read chapter 3", "due": "Monday", "points": 4},
                {"title": "Exercise 2b", "due": "Friday", "points": 2}
            ]
        });
        let plan = classify(&value);
        assert_eq!(plan.kind(), "task-list");

        let blocks = plan.blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "Task 1");
        assert_eq!(blocks[1].title, "Task 2");
        assert_eq!(texts(&blocks[0]), vec!["Title: Read chapter 3", "Due: Monday", "Points: 4"]);
        assert!(blocks.iter().all(|b| b.expanded));
    }

    #[test]
    fn tasks_win_over_items() {
        let value = json!({"items": [1, 2, 3], "tasks": ["only"]});
        let plan = classify(&value);
        assert_eq!(plan.blocks().len(), 1);
        assert_eq!(texts(&plan.blocks()[0]), vec!["only"]);
    }

    #[test]
    fn items_alone_still_render_as_task_list() {
        let value = json!({"items": [{"step": "cut", "duration": 5}]});
        let plan = classify(&value);
        assert_eq!(
            plan,
            RenderPlan::TaskList(vec![Block {
                title: "Task 1".to_string(),
                lines: vec![
                    Line { key: Some("Step".to_string()), value: "cut".to_string() },
                    Line { key: Some("Duration".to_string()), value: "5".to_string() },
                ],
                expanded: true,
            }])
        );
    }

    #[test]
    fn non_list_tasks_fall_back_to_whole_value_as_json() {
        let value = json!({"tasks": "none today", "text": "ignored"});
        match classify(&value) {
            RenderPlan::RawJson(json) => {
                assert!(json.contains("\"tasks\": \"none today\""));
                assert!(json.contains("\"text\": \"ignored\""));
            }
            other => panic!("expected raw json, got {:?}", other),
        }
    }

    #[test]
    fn tasks_present_but_null_does_not_fall_through_to_items() {
        let value = json!({"tasks": null, "items": [1]});
        assert_eq!(classify(&value).kind(), "raw-json");
    }

    #[test]
    fn text_is_shown_verbatim() {
        assert_eq!(classify(&json!({"text": "hello"})), RenderPlan::TextBlock("hello".to_string()));
        assert_eq!(
            classify(&json!({"content": "from content"})),
            RenderPlan::TextBlock("from content".to_string())
        );
        assert_eq!(
            classify(&json!({"content": "second", "text": "first"})),
            RenderPlan::TextBlock("first".to_string())
        );
        assert_eq!(classify(&json!({"text": null})), RenderPlan::TextBlock(String::new()));
    }

    #[test]
    fn key_lookup_is_case_sensitive() {
        assert_eq!(classify(&json!({"Tasks": [1]})).kind(), "raw-json");
        assert_eq!(classify(&json!({"TEXT": "x"})).kind(), "raw-json");
    }

    #[test]
    fn other_mappings_render_as_raw_json() {
        let plan = classify(&json!({"status": "ok"}));
        assert_eq!(plan, RenderPlan::RawJson("{\n  \"status\": \"ok\"\n}".to_string()));
    }

    #[test]
    fn top_level_sequences_become_elements() {
        let plan = classify(&json!([{"name": "x"}, "plain", 7]));
        assert_eq!(plan.kind(), "item-list");
        let titles: Vec<&str> = plan.blocks().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Element 1", "Element 2", "Element 3"]);
        assert_eq!(texts(&plan.blocks()[0]), vec!["Name: x"]);
        assert_eq!(texts(&plan.blocks()[1]), vec!["plain"]);
        assert_eq!(texts(&plan.blocks()[2]), vec!["7"]);
    }

    #[test]
    fn empty_sequences_render_zero_blocks() {
        assert_eq!(classify(&json!([])), RenderPlan::ItemList(Vec::new()));
        assert_eq!(classify(&json!({"tasks": []})), RenderPlan::TaskList(Vec::new()));
    }

    #[test]
    fn scalars_render_as_plain_values() {
        assert_eq!(classify(&json!(42)), RenderPlan::PlainValue("42".to_string()));
        assert_eq!(classify(&json!("done")), RenderPlan::PlainValue("done".to_string()));
        assert_eq!(classify(&json!(true)), RenderPlan::PlainValue("true".to_string()));
        assert_eq!(classify(&Value::Null), RenderPlan::PlainValue("null".to_string()));
    }

    #[test]
    fn capitalize_only_touches_first_character() {
        assert_eq!(capitalize_key("dueDate"), "DueDate");
        assert_eq!(capitalize_key("ABC"), "ABC");
        assert_eq!(capitalize_key("über"), "Über");
        assert_eq!(capitalize_key("1st"), "1st");
        assert_eq!(capitalize_key(""), "");
    }

    #[test]
    fn nested_values_are_shown_as_compact_json() {
        let plan = classify(&json!([{"tags": ["a", "b"], "meta": {"x": 1}}]));
        assert_eq!(texts(&plan.blocks()[0]), vec![r#"Tags: ["a","b"]"#, r#"Meta: {"x":1}"#]);
    }

    #[test]
    fn colon_text_stays_a_single_unkeyed_value() {
        let plan = classify(&json!(["Deadline: Friday", {"note: extra": "a: b"}]));
        assert_eq!(
            plan.blocks()[0].lines,
            vec![Line { key: None, value: "Deadline: Friday".to_string() }]
        );
        assert_eq!(
            plan.blocks()[1].lines,
            vec![Line { key: Some("Note: extra".to_string()), value: "a: b".to_string() }]
        );
    }
}
