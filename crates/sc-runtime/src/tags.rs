//! Upper-case tag names that `stylize` turns into new elements.
//!
//! `stylize("DIV")` creates a `<div>`; `stylize("div")` selects existing
//! ones. Document metadata and sectioning roots can never be created.

/// Tags refused outright.
const METADATA: &[&str] = &[
    "HTML", "BASE", "HEAD", "LINK", "META", "STYLE", "TITLE", "BODY", "SHADOW",
];

/// Tags `stylize` may create.
const CREATABLE: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "FOOTER", "HEADER", "H1", "H2", "H3", "H4", "H5", "H6",
    "HGROUP", "MAIN", "NAV", "SECTION", "SEARCH", "BLOCKQUOTE", "DD", "DIV", "DL", "DT",
    "FIGCAPTION", "FIGURE", "HR", "LI", "MENU", "OL", "P", "PRE", "UL", "A", "ABBR", "B", "BDI",
    "BDO", "BR", "CITE", "CODE", "DATA", "DFN", "EM", "I", "KBD", "MARK", "Q", "RP", "RT", "RUBY",
    "S", "SAMP", "SMALL", "SPAN", "STRONG", "SUB", "SUP", "TIME", "U", "VAR", "WBR", "AREA",
    "AUDIO", "IMG", "MAP", "TRACK", "VIDEO", "EMBED", "IFRAME", "OBJECT", "PICTURE", "PORTAL",
    "SOURCE", "SVG", "MATH", "CANVAS", "NOSCRIPT", "SCRIPT", "DEL", "INS", "CAPTION", "COL",
    "COLGROUP", "TABLE", "TBODY", "TD", "TFOOT", "TH", "THEAD", "TR", "BUTTON", "DATALIST",
    "FIELDSET", "FORM", "INPUT", "LABEL", "LEGEND", "METER", "OPTGROUP", "OPTION", "OUTPUT",
    "PROGRESS", "SELECT", "TEXTAREA", "DETAILS", "DIALOG", "SUMMARY", "SLOT", "TEMPLATE",
    "ACRONYM", "BIG", "CENTER", "CONTENT", "DIR", "FONT", "FRAME", "FRAMESET", "IMAGE", "MARQUEE",
    "MENUITEM", "NOBR", "NOEMBED", "NOFRAMES", "PARAM", "PLAINTEXT", "RB", "RTC", "STRIKE", "TT",
    "XMP",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagRequest {
    /// Create an element with this lower-case tag.
    Create(&'static str),
    /// A metadata tag written in upper case.
    Refused,
    /// Not a creation request; treat as a selector.
    Select,
}

pub(crate) fn classify(selector: &str) -> TagRequest {
    let shouting = !selector.is_empty()
        && selector.chars().any(|c| c.is_ascii_uppercase())
        && selector
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !shouting {
        return TagRequest::Select;
    }
    if METADATA.iter().any(|tag| *tag == selector) {
        return TagRequest::Refused;
    }
    match CREATABLE.iter().position(|tag| *tag == selector) {
        Some(index) => TagRequest::Create(LOWER[index]),
        None => TagRequest::Select,
    }
}

/// Lower-case twins of [`CREATABLE`], index for index.
const LOWER: &[&str] = &[
    "address", "article", "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6",
    "hgroup", "main", "nav", "section", "search", "blockquote", "dd", "div", "dl", "dt",
    "figcaption", "figure", "hr", "li", "menu", "ol", "p", "pre", "ul", "a", "abbr", "b", "bdi",
    "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q", "rp", "rt", "ruby",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr", "area",
    "audio", "img", "map", "track", "video", "embed", "iframe", "object", "picture", "portal",
    "source", "svg", "math", "canvas", "noscript", "script", "del", "ins", "caption", "col",
    "colgroup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "button", "datalist",
    "fieldset", "form", "input", "label", "legend", "meter", "optgroup", "option", "output",
    "progress", "select", "textarea", "details", "dialog", "summary", "slot", "template",
    "acronym", "big", "center", "content", "dir", "font", "frame", "frameset", "image", "marquee",
    "menuitem", "nobr", "noembed", "noframes", "param", "plaintext", "rb", "rtc", "strike", "tt",
    "xmp",
];
