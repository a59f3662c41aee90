//! HTML post-processing for chat delivery.
//!
//! The remote service answers in HTML, chat surfaces want plain text. The
//! conversion runs as ordered regex passes over the document: structural
//! elements first (tables, lists, headings), then a generic tag strip and
//! entity decode, then whitespace normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::MenuDocument;

/// Patterns are stored as Option so a pattern that fails to compile skips
/// its pass instead of panicking.
static SCRIPT_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<script(?:\s[^>]*)?>.*?</script>").ok());

static STYLE_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<style(?:\s[^>]*)?>.*?</style>").ok());

static TABLE_ROW: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<tr(?:\s[^>]*)?>(.*?)</tr>").ok());

static TABLE_CELL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<t[hd](?:\s[^>]*)?>(.*?)</t[hd]>").ok());

static TABLE_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)</?table(?:\s[^>]*)?>").ok());

static LIST_ITEM_OPEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<li(?:\s[^>]*)?>").ok());

static LIST_ITEM_CLOSE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)</li>").ok());

static LIST_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)</?[uo]l(?:\s[^>]*)?>").ok());

static HEADING_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)</?h[1-6](?:\s[^>]*)?>").ok());

static PARAGRAPH_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)</?p(?:\s[^>]*)?>").ok());

static LINE_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").ok());

static ANY_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]+>").ok());

static BLANK_RUN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\n\s*\n").ok());

static SPACE_RUN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[ \t]+").ok());

fn pass(text: String, pattern: &LazyLock<Option<Regex>>, replacement: &str) -> String {
    match pattern.as_ref() {
        Some(re) => re.replace_all(&text, replacement).into_owned(),
        None => text,
    }
}

/// Flattens one inline HTML fragment: tags stripped, entities decoded,
/// whitespace collapsed to single spaces.
pub(crate) fn fragment_text(fragment: &str) -> String {
    let stripped = match ANY_TAG.as_ref() {
        Some(re) => re.replace_all(fragment, "").into_owned(),
        None => fragment.to_string(),
    };
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    // `&amp;` goes last so double-escaped entities stay literal.
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn flatten_table_rows(text: String) -> String {
    let (Some(row_re), Some(cell_re)) = (TABLE_ROW.as_ref(), TABLE_CELL.as_ref()) else {
        return text;
    };
    row_re
        .replace_all(&text, |caps: &regex::Captures<'_>| {
            let cells: Vec<String> = cell_re
                .captures_iter(&caps[1])
                .filter_map(|c| c.get(1))
                .map(|cell| fragment_text(cell.as_str()))
                .collect();
            format!("{}\n", cells.join(" | "))
        })
        .into_owned()
}

/// Converts service HTML to readable plain text. Table rows become
/// `cell | cell` lines, list items become `• ` bullets, headings and
/// paragraphs keep their block separation, everything else is stripped.
pub fn html_to_text(html: &str) -> String {
    let text = pass(html.to_string(), &SCRIPT_BLOCK, "");
    let text = pass(text, &STYLE_BLOCK, "");
    let text = flatten_table_rows(text);
    let text = pass(text, &TABLE_TAG, "\n\n");
    let text = pass(text, &LIST_ITEM_OPEN, "• ");
    let text = pass(text, &LIST_ITEM_CLOSE, "\n");
    let text = pass(text, &LIST_TAG, "\n");
    let text = pass(text, &HEADING_TAG, "\n\n");
    let text = pass(text, &PARAGRAPH_TAG, "\n");
    let text = pass(text, &LINE_BREAK, "\n");
    let text = pass(text, &ANY_TAG, "");
    let text = decode_entities(&text);
    let text = pass(text, &BLANK_RUN, "\n\n");
    let text = pass(text, &SPACE_RUN, " ");
    text.trim().to_string()
}

/// Renders a document for chat delivery: provenance marker, blank line,
/// converted text. The marker is the user-visible record of whether the
/// menu came from GigaChat or the local template.
pub fn render_text(doc: &MenuDocument) -> String {
    format!("{}\n\n{}", doc.source.marker(), html_to_text(&doc.html))
}
