//! Prompt text and the HTML surgery on model output.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::CountRange;

pub const OUTLINE_SYSTEM: &str = "You are a content outliner. Always respond with clean HTML without any markdown formatting or code blocks. Never include ```html tags in your response.";
pub const SUBSECTIONS_SYSTEM: &str =
    "You are a content organizer. Return only subsection titles, one per line.";
pub const WRITER_SYSTEM: &str =
    "You are an expert content writer creating detailed, engaging subsection content.";

static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```html\s*").expect("valid regex"));
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\s*").expect("valid regex"));
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h1>(.*?)</h1>").expect("valid regex"));
static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h2>(.*?)</h2>").expect("valid regex"));

pub fn outline_prompt(keywords: &[String], sections: CountRange, subsections: CountRange) -> String {
    format!(
        "Create a detailed outline for a comprehensive blog post about {topics}.

Requirements:
1. Include a main title
2. Create a detailed table of contents with {smin}-{smax} major sections
3. Each major section should have {ssmin}-{ssmax} subsections
4. Include placeholders for:
   - Did You Know sections
   - Pro Tips
   - Common Questions
   - Quick Reference Guides
   - Further Reading

IMPORTANT: Do not include any markdown formatting or ```html tags.
Format the output directly in HTML using:
- <h1> for main title
- <h2> for major sections
- <h3> for subsections
- <ul> and <li> for table of contents",
        topics = keywords.join(", "),
        smin = sections.min,
        smax = sections.max,
        ssmin = subsections.min,
        ssmax = subsections.max,
    )
}

pub fn subsections_prompt(section: &str, keywords: &[String], subsections: CountRange) -> String {
    format!(
        "Create {}-{} detailed subsection titles for the section \"{}\" about {}.\nReturn only the subsection titles, one per line.",
        subsections.min,
        subsections.max,
        section,
        keywords.join(", ")
    )
}

/// Prompt for one subsection's body. `references` is the scraped excerpt
/// text; `tenant` and `sites` are woven into the copy.
pub fn subsection_prompt(
    subsection: &str,
    section: &str,
    keywords: &[String],
    references: &[String],
    tenant: &str,
    sites: &[String],
) -> String {
    format!(
        "Write detailed content for the subsection \"{subsection}\" within the main section \"{section}\" about {topics}.
Use this related content as context: {context}

Requirements:
- Begin with core concepts
- Provide detailed explanations
- Include specific examples
- Add practical applications
- Address common questions

Format Requirements:
- Use ONLY HTML tags
- Use <h3> for the subsection title
- Use <p> for paragraphs
- Use appropriate HTML elements for structure
- Include at least one special element (pro-tip, case study, or key insight)

Integration Requirements:
- Reference {tenant} naturally where relevant
- Mention {sites} when discussing specific products
- Include data-backed claims",
        topics = keywords.join(", "),
        context = references.join("\n\n"),
        sites = sites.join(", "),
    )
}

/// Strip markdown code fences the model adds despite being told not to.
pub fn clean_outline(raw: &str) -> String {
    let without_open = FENCE_OPEN_RE.replace_all(raw, "");
    FENCE_RE.replace_all(&without_open, "").trim().to_string()
}

/// `<h2>` texts in document order.
pub fn section_titles(outline: &str) -> Vec<String> {
    H2_RE
        .captures_iter(outline)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The first `<h1>` text, else `"{first keyword} Guide"`.
pub fn post_title(outline: &str, keywords: &[String]) -> String {
    H1_RE
        .captures(outline)
        .map(|c| c[1].trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("{} Guide", first_keyword(keywords)))
}

/// Non-blank lines of a subsection-title reply.
pub fn subsection_titles(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn section_html(section: &str, subsections: &[String]) -> String {
    format!("<h2>{}</h2>\n{}", section, subsections.join("\n\n"))
}

/// Outline, expanded sections, then a "Key Takeaways" list of the keywords.
pub fn assemble_post(outline: &str, sections: &[String], keywords: &[String]) -> String {
    let takeaways: Vec<String> = keywords
        .iter()
        .map(|kw| format!("<li>Key insights about {kw}</li>"))
        .collect();
    format!(
        "{}\n{}\n<h2>Key Takeaways</h2>\n<ul>\n{}\n</ul>",
        outline,
        sections.join("\n\n"),
        takeaways.join("\n")
    )
}

/// `{first keyword, lowercased, spaces to dashes}-guide-{millis}`.
pub fn slug_for(keywords: &[String], millis: i64) -> String {
    let stem = first_keyword(keywords)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{stem}-guide-{millis}")
}

fn first_keyword(keywords: &[String]) -> &str {
    keywords.first().map(String::as_str).unwrap_or("post")
}
