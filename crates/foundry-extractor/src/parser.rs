//! Parsing of free-form model replies into use-case candidates
//!
//! Models answer in several conventions even when asked for one: label lines
//! (`Title: ...`), a JSON object (bare or inside a Markdown fence), or a JSON
//! array of objects. The reply is first classified into a [`ReplyShape`], then
//! each shape is mapped onto [`UseCaseCandidate`] values.
//!
//! Parsing is total: any input yields either candidates or nothing, never a
//! panic. Every returned candidate satisfies [`UseCaseCandidate::is_valid`].

use crate::text::truncate_chars;
use foundry_domain::keywords;
use foundry_domain::UseCaseCandidate;
use serde_json::{Map, Value};

/// Solution text used when neither the reply nor its problem names a technique
pub const UNSPECIFIED_SOLUTION: &str = "unspecified";

/// Classified form of a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyShape {
    /// The model declined, or the reply is empty
    Skip,
    /// A JSON array, possibly fenced
    JsonArray(Vec<Value>),
    /// A bare JSON object
    JsonObject(Map<String, Value>),
    /// A JSON object inside a Markdown code fence
    FencedJsonObject(Map<String, Value>),
    /// Anything else, read line by line
    LabelLines,
}

/// Classify a raw reply
///
/// JSON is looked for in a Markdown fence, then at the start of the reply,
/// then anywhere inside surrounding prose. A payload that looks like JSON but
/// does not parse falls back to [`ReplyShape::LabelLines`].
pub fn classify(raw: &str) -> ReplyShape {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ReplyShape::Skip;
    }

    let (payload, fenced) = match json_fence(trimmed) {
        Some(body) => (body, true),
        None if trimmed.starts_with('{') || trimmed.starts_with('[') => (trimmed, false),
        None if label_skip(trimmed) => return ReplyShape::Skip,
        None => {
            return match embedded_json(trimmed) {
                Some(value) => shape_of(value, false),
                None => ReplyShape::LabelLines,
            };
        }
    };

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => shape_of(value, fenced),
        Err(_) => ReplyShape::LabelLines,
    }
}

fn shape_of(value: Value, fenced: bool) -> ReplyShape {
    match value {
        Value::Array(items) if items.is_empty() => ReplyShape::Skip,
        Value::Array(items) => ReplyShape::JsonArray(items),
        Value::Object(map) if is_skip_object(&map) => ReplyShape::Skip,
        Value::Object(mut map) => match take_nested_list(&mut map) {
            Some(items) if items.is_empty() => ReplyShape::Skip,
            Some(items) => ReplyShape::JsonArray(items),
            None if fenced => ReplyShape::FencedJsonObject(map),
            None => ReplyShape::JsonObject(map),
        },
        _ => ReplyShape::LabelLines,
    }
}

/// Parse a reply using the default title length limit
pub fn parse_reply(raw: &str) -> Vec<UseCaseCandidate> {
    ReplyParser::default().parse_reply(raw)
}

/// First valid candidate of a reply, using the default title length limit
pub fn parse(raw: &str) -> Option<UseCaseCandidate> {
    ReplyParser::default().parse(raw)
}

/// Reply parser with configurable limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyParser {
    inferred_title_max_chars: usize,
}

impl Default for ReplyParser {
    fn default() -> Self {
        Self::new(120)
    }
}

impl ReplyParser {
    /// Create a parser that truncates inferred titles to `inferred_title_max_chars`
    pub fn new(inferred_title_max_chars: usize) -> Self {
        Self {
            inferred_title_max_chars,
        }
    }

    /// Parse every valid candidate in a reply, in reply order
    pub fn parse_reply(&self, raw: &str) -> Vec<UseCaseCandidate> {
        match classify(raw) {
            ReplyShape::Skip => Vec::new(),
            ReplyShape::JsonArray(items) => items
                .iter()
                .filter_map(Value::as_object)
                .filter(|map| !is_skip_object(map))
                .filter_map(|map| finish(from_json(map)))
                .collect(),
            ReplyShape::JsonObject(map) | ReplyShape::FencedJsonObject(map) => {
                finish(from_json(&map)).into_iter().collect()
            }
            ReplyShape::LabelLines => finish(self.from_labels(raw)).into_iter().collect(),
        }
    }

    /// First valid candidate of a reply
    pub fn parse(&self, raw: &str) -> Option<UseCaseCandidate> {
        self.parse_reply(raw).into_iter().next()
    }

    fn from_labels(&self, raw: &str) -> Fields {
        let cleaned = strip_markup(raw);
        let lines: Vec<&str> = cleaned
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut fields = Fields::default();
        for line in &lines {
            let Some((label, value)) = split_label(line) else {
                continue;
            };
            // first occurrence of each label wins
            match label {
                Label::Title => set_once(&mut fields.title, value),
                Label::Problem => set_once(&mut fields.problem, value),
                Label::Solution => set_once(&mut fields.ai_solution, value),
                Label::Category if fields.category.is_empty() => {
                    fields.category = split_tags(value);
                }
                Label::Industry if fields.industry.is_empty() => {
                    fields.industry = split_tags(value);
                }
                Label::Note => set_once(&mut fields.note, value),
                _ => {}
            }
        }

        if fields.title.is_empty() {
            if let Some(line) = lines
                .iter()
                .find(|line| !line.contains(':') && line.chars().count() > 10)
            {
                fields.title = truncate_chars(line, self.inferred_title_max_chars)
                    .trim()
                    .to_string();
            }
        }

        fields
    }
}

/// Fields collected from one reply before validation
#[derive(Debug, Default)]
struct Fields {
    title: String,
    problem: String,
    ai_solution: String,
    category: Vec<String>,
    industry: Vec<String>,
    note: String,
}

/// Backfill the solution and apply the validity gate
fn finish(mut fields: Fields) -> Option<UseCaseCandidate> {
    if fields.ai_solution.is_empty() && !fields.problem.is_empty() {
        fields.ai_solution = keywords::first_match(&fields.problem)
            .unwrap_or(UNSPECIFIED_SOLUTION)
            .to_string();
    }

    let candidate = UseCaseCandidate {
        title: fields.title,
        problem: fields.problem,
        ai_solution: fields.ai_solution,
        category: fields.category,
        industry: fields.industry,
        note: (!fields.note.is_empty()).then_some(fields.note),
        ..UseCaseCandidate::new("", "")
    };
    candidate.is_valid().then_some(candidate)
}

fn set_once(slot: &mut String, value: &str) {
    if slot.is_empty() {
        *slot = value.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Title,
    Problem,
    Solution,
    Category,
    Industry,
    Note,
    Skip,
}

impl Label {
    fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "title" => Some(Self::Title),
            "problem" => Some(Self::Problem),
            "ai solution" | "ai solutions" | "solution" => Some(Self::Solution),
            "category" | "categories" => Some(Self::Category),
            "industry" | "industries" => Some(Self::Industry),
            "note" | "notes" => Some(Self::Note),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Split `Label: value` into a known label and a non-empty value
fn split_label(line: &str) -> Option<(Label, &str)> {
    let line = line.trim_start_matches(['-', '*', '#', '>', ' ', '\t']);
    let (name, value) = line.split_once(':')?;
    let label = Label::from_name(name)?;
    let value = value.trim();
    (!value.is_empty()).then_some((label, value))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

/// A label-format reply whose only content is a skip marker
fn label_skip(text: &str) -> bool {
    let first = text.lines().map(str::trim).find(|line| !line.is_empty());
    match first {
        Some(line) if line.trim_matches('*').eq_ignore_ascii_case("skip") => true,
        Some(line) => matches!(split_label(line), Some((Label::Skip, value)) if is_truthy(value)),
        None => true,
    }
}

/// Remove bold/bracket markup and fenced blocks that hold no label lines
fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find("```") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 3..];
        let (block, tail) = match after.find("```") {
            Some(close) => (&after[..close], &after[close + 3..]),
            None => (after, ""),
        };
        // drop the info string on the opening fence line
        let body = block.split_once('\n').map(|(_, body)| body).unwrap_or("");
        if body.lines().any(|line| split_label(line.trim()).is_some()) {
            out.push_str(body);
            out.push('\n');
        }
        rest = tail;
    }
    out.push_str(rest);
    out.replace("**", "").replace(['[', ']'], "")
}

/// Body of the first fenced block whose content starts like JSON
///
/// The body may follow the opening fence on the same line, as in
/// ```` ```json {"title": "..."} ``` ````.
fn json_fence(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let line_end = after.find('\n').unwrap_or(after.len());
        let opening = &after[..line_end];
        let inline = strip_json_tag(opening).trim_start();
        let (info, body_and_tail) = if inline.starts_with('{') || inline.starts_with('[') {
            ("", &after[line_end - inline.len()..])
        } else {
            (opening.trim(), after.get(line_end + 1..).unwrap_or(""))
        };
        let (body, tail) = match body_and_tail.find("```") {
            Some(close) => (&body_and_tail[..close], &body_and_tail[close + 3..]),
            None => (body_and_tail, ""),
        };
        let body = body.trim();
        let looks_json = body.starts_with('{') || body.starts_with('[');
        if looks_json && (info.is_empty() || info.eq_ignore_ascii_case("json")) {
            return Some(body);
        }
        rest = tail;
    }
    None
}

fn strip_json_tag(line: &str) -> &str {
    let line = line.trim_start();
    match line.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &line[4..],
        _ => line,
    }
}

/// A JSON object, or a non-empty array of objects, wrapped in prose
fn embedded_json(text: &str) -> Option<Value> {
    let start = text.find(['{', '['])?;
    let end = text.rfind(['}', ']'])?;
    let value = serde_json::from_str::<Value>(text.get(start..=end)?).ok()?;
    match &value {
        Value::Object(_) => Some(value),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            Some(value)
        }
        _ => None,
    }
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_skip_object(map: &Map<String, Value>) -> bool {
    map.iter()
        .filter(|(key, _)| normalize_key(key) == "skip")
        .any(|(_, value)| match value {
            Value::Bool(flag) => *flag,
            Value::String(s) => is_truthy(s),
            Value::Number(n) => n.as_i64() == Some(1),
            _ => false,
        })
}

/// `{"use_cases": [...]}` style wrappers
fn take_nested_list(map: &mut Map<String, Value>) -> Option<Vec<Value>> {
    let key = map
        .iter()
        .find(|(key, value)| {
            matches!(normalize_key(key).as_str(), "usecases" | "candidates") && value.is_array()
        })
        .map(|(key, _)| key.clone())?;
    match map.remove(&key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn from_json(map: &Map<String, Value>) -> Fields {
    let mut fields = Fields::default();
    for (key, value) in map {
        match normalize_key(key).as_str() {
            "title" => set_once(&mut fields.title, &json_text(value)),
            "problem" => set_once(&mut fields.problem, &json_text(value)),
            "aisolution" | "solution" => set_once(&mut fields.ai_solution, &json_text(value)),
            "category" | "categories" if fields.category.is_empty() => {
                fields.category = json_tags(value)
            }
            "industry" | "industries" if fields.industry.is_empty() => {
                fields.industry = json_tags(value)
            }
            "note" | "notes" => set_once(&mut fields.note, &json_text(value)),
            _ => {}
        }
    }
    fields
}

/// String view of a scalar or list field
fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(json_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null | Value::Object(_) => String::new(),
    }
}

/// Tag list from a string or an array of strings
fn json_tags(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_tags(s),
        Value::Array(items) => {
            let mut tags = Vec::new();
            for item in items {
                for tag in split_tags(&json_text(item)) {
                    push_unique(&mut tags, tag);
                }
            }
            tags
        }
        _ => Vec::new(),
    }
}

/// Split `A | B, C` into distinct trimmed tags
fn split_tags(value: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for tag in value.split(['|', ',', ';']) {
        let tag = tag.trim().trim_matches('"').trim();
        if !tag.is_empty() {
            push_unique(&mut tags, tag.to_string());
        }
    }
    tags
}

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
        tags.push(tag);
    }
}
