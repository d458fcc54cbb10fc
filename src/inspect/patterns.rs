//! Heuristic recognition of AI workflow metadata in extracted payloads.
//!
//! JSON payloads are matched by shape (node graphs, link lists, prompt maps);
//! text payloads by a case-insensitive token vocabulary. The first payload to
//! match decides the tool.

use crate::core::inspect::{AIPatternResult, PayloadContent, PayloadRecord};
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

pub const TOOL_COMFYUI: &str = "ComfyUI";
pub const TOOL_AUTOMATIC1111: &str = "Automatic1111";
pub const TOOL_INVOKEAI: &str = "InvokeAI";
pub const TOOL_NOVELAI: &str = "NovelAI";
pub const TOOL_FOOOCUS: &str = "Fooocus";
pub const TOOL_MIDJOURNEY: &str = "Midjourney";
pub const TOOL_UNKNOWN_WORKFLOW: &str = "Unknown Workflow Tool";

/// Shape of a JSON value that looks like a workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphShape {
    /// Non-empty `nodes`, a `workflow` object or a node-id keyed prompt map.
    NodeGraph,
    /// Only a `links` key.
    LinksOnly,
}

// Index order matters: see `scan_tool`.
const TOKENS: [&str; 11] = [
    "comfy",
    "cliptextencode",
    "ksampler",
    "workflow",
    "negative prompt:",
    "sampler:",
    "cfg scale:",
    "invokeai",
    "novelai",
    "fooocus",
    "midjourney",
];

static VOCABULARY: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(TOKENS)
        .expect("valid token vocabulary")
});

// Dynamic-Prompts wildcard `__name__` or variant group `{a|b}`
static RE_WILDCARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"__[A-Za-z0-9][A-Za-z0-9_\-/]*__|\{[^{}|]*\|[^{}]*\}"#)
        .expect("valid wildcard regex")
});

/// Keys are node ids (`"3"`, `"12:4"`) and every value is an object.
pub fn is_node_id_map(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.iter().all(|(k, v)| {
            !k.is_empty() && k.chars().all(|c| c.is_ascii_digit() || c == ':') && v.is_object()
        })
}

/// Classify the graph shape of a JSON value, if any.
pub fn graph_shape(value: &Value) -> Option<GraphShape> {
    let obj = value.as_object()?;
    let nodes_present = match obj.get("nodes") {
        Some(Value::Object(m)) => !m.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        _ => false,
    };
    let workflow_object = obj.get("workflow").is_some_and(Value::is_object);
    let prompt_map = obj
        .get("prompt")
        .and_then(Value::as_object)
        .is_some_and(is_node_id_map);

    if nodes_present || workflow_object || prompt_map {
        Some(GraphShape::NodeGraph)
    } else if obj.contains_key("links") {
        Some(GraphShape::LinksOnly)
    } else {
        None
    }
}

/// Shape of a payload value, allowing for a `prompt` keyword whose value is
/// the node map itself.
pub fn payload_shape(keyword: Option<&str>, value: &Value) -> Option<GraphShape> {
    graph_shape(value).or_else(|| {
        let is_prompt_keyword = keyword.is_some_and(|k| k.eq_ignore_ascii_case("prompt"));
        match value {
            Value::Object(m) if is_prompt_keyword && is_node_id_map(m) => {
                Some(GraphShape::NodeGraph)
            }
            _ => None,
        }
    })
}

/// Tool named by the token vocabulary, in fixed priority order.
pub fn scan_tool(text: &str) -> Option<&'static str> {
    let mut seen = [false; TOKENS.len()];
    for m in VOCABULARY.find_overlapping_iter(text) {
        seen[m.pattern().as_usize()] = true;
    }
    if seen[0..4].iter().any(|&s| s) {
        Some(TOOL_COMFYUI)
    } else if seen[4] || (seen[5] && seen[6]) {
        Some(TOOL_AUTOMATIC1111)
    } else if seen[7] {
        Some(TOOL_INVOKEAI)
    } else if seen[8] {
        Some(TOOL_NOVELAI)
    } else if seen[9] {
        Some(TOOL_FOOOCUS)
    } else if seen[10] {
        Some(TOOL_MIDJOURNEY)
    } else {
        None
    }
}

pub fn has_wildcards(text: &str) -> bool {
    RE_WILDCARD.is_match(text)
}

/// A node map with at least one node whose `inputs.text` is a string.
fn has_resolved_text(nodes: &Map<String, Value>) -> bool {
    nodes
        .values()
        .any(|node| node.pointer("/inputs/text").is_some_and(Value::is_string))
}

fn json_has_resolved_prompt(keyword: Option<&str>, value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if let Some(prompt) = obj.get("prompt").and_then(Value::as_object) {
        if has_resolved_text(prompt) {
            return true;
        }
    }
    keyword.is_some_and(|k| k.eq_ignore_ascii_case("prompt"))
        && is_node_id_map(obj)
        && has_resolved_text(obj)
}

/// Automatic1111 `parameters`: prompt text before `Negative prompt:` or `Steps:`.
fn a1111_has_resolved_prompt(keyword: Option<&str>, text: &str) -> bool {
    if !keyword.is_some_and(|k| k.eq_ignore_ascii_case("parameters")) {
        return false;
    }
    let lower = text.to_ascii_lowercase();
    ["negative prompt:", "steps:"]
        .iter()
        .filter_map(|marker| lower.find(marker))
        .min()
        .is_some_and(|idx| !text[..idx].trim().is_empty())
}

/// Every string inside a JSON value, depth first.
fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Accumulates findings across payloads in discovery order.
#[derive(Default)]
struct Recognizer {
    result: AIPatternResult,
}

impl Recognizer {
    fn set_tool(&mut self, tool: &str) {
        if self.result.tool.is_none() {
            debug!(tool, "AI tool recognised");
            self.result.tool = Some(tool.to_string());
        }
    }

    fn apply_shape(&mut self, shape: Option<GraphShape>) {
        match shape {
            Some(GraphShape::NodeGraph) => {
                self.result.graph_detected = true;
                self.set_tool(TOOL_COMFYUI);
            }
            Some(GraphShape::LinksOnly) => {
                self.result.graph_detected = true;
                self.set_tool(TOOL_UNKNOWN_WORKFLOW);
            }
            None => {}
        }
    }

    fn scan_text(&mut self, text: &str) {
        if let Some(tool) = scan_tool(text) {
            self.result.graph_detected = true;
            self.set_tool(tool);
        }
        if has_wildcards(text) {
            self.result.wildcards_present = true;
        }
    }

    fn json(&mut self, keyword: Option<&str>, value: &Value) {
        self.apply_shape(payload_shape(keyword, value));
        if json_has_resolved_prompt(keyword, value) {
            self.result.resolved_prompt_available = true;
        }

        let mut strings = Vec::new();
        collect_strings(value, &mut strings);
        for s in strings {
            if has_wildcards(s) {
                self.result.wildcards_present = true;
            }
            // JSON encoded as a string value
            if let Ok(nested @ Value::Object(_)) = serde_json::from_str::<Value>(s) {
                self.apply_shape(graph_shape(&nested));
                if json_has_resolved_prompt(None, &nested) {
                    self.result.resolved_prompt_available = true;
                }
                self.scan_text(s);
            }
        }
    }

    fn text(&mut self, keyword: Option<&str>, text: &str) {
        self.scan_text(text);
        if a1111_has_resolved_prompt(keyword, text) {
            self.result.resolved_prompt_available = true;
        }
    }
}

/// Scan classified payloads for known workflow signatures.
pub fn recognize(payloads: &[PayloadRecord]) -> AIPatternResult {
    let mut r = Recognizer::default();
    for p in payloads {
        let keyword = p.keyword.as_deref();
        match &p.content {
            PayloadContent::Json { content } => r.json(keyword, content),
            PayloadContent::Text { content } => r.text(keyword, content),
            PayloadContent::Binary { .. } => {}
        }
    }
    r.result
}
