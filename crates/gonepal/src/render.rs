//! Terminal rendering of assistant replies.
//!
//! Replies are markdown with inline and display LaTeX. The renderer turns
//! them into text for a terminal line by line, and never touches the stored
//! reply: it only produces a new string for display.

use std::borrow::Cow;
use std::sync::LazyLock;

use owo_colors::OwoColorize;
use regex::Regex;

const RULE_WIDTH: usize = 40;
const CODE_INDENT: &str = "    ";
const MATH_INDENT: &str = "  ";

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("invalid pattern"));
    };
}

pattern!(HEADING, r"^\s{0,3}(#{1,6})\s+(.*?)(?:\s+#+)?\s*$");
pattern!(RULE, r"^\s{0,3}(?:-{3,}|\*{3,}|_{3,})\s*$");
pattern!(BULLET, r"^(\s*)[-*+]\s+(.*)$");
pattern!(ORDERED, r"^(\s*)(\d+)[.)]\s+(.*)$");
pattern!(QUOTE, r"^\s{0,3}>\s?(.*)$");
pattern!(FENCE, r"^\s{0,3}(?:```|~~~)");
pattern!(TABLE_ROW, r"^\s{0,3}\|.*\|\s*$");
pattern!(TABLE_SEPARATOR, r"^\s{0,3}\|[\s:|-]*-[\s:|-]*$");
pattern!(INLINE_CODE, r"`([^`]+)`");
pattern!(MATH, r"\$\$(.+?)\$\$|\$([^\s$](?:[^$\n]*?[^\s$])?)\$");
pattern!(BOLD, r"\*\*([^*]+?)\*\*|__([^_]+?)__");
pattern!(ITALIC, r"\*([^*\s](?:[^*]*?[^*\s])?)\*");

#[derive(Clone, Copy)]
enum Style {
    Heading,
    Bold,
    Italic,
    Code,
    CodeBlock,
    Math,
    Bullet,
    Muted,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Text,
    Code,
    Math,
}

/// Renders markdown replies for a terminal.
///
/// A styled renderer highlights with ANSI escapes, a plain one emits the
/// same layout as bare text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderer {
    styled: bool,
}

impl Renderer {
    /// Creates a renderer that styles its output with ANSI escapes.
    #[inline]
    pub fn styled() -> Self {
        Self { styled: true }
    }

    /// Creates a renderer that never emits escapes.
    #[inline]
    pub fn plain() -> Self {
        Self { styled: false }
    }

    /// Returns `true` if the output carries ANSI escapes.
    #[inline]
    pub fn is_styled(&self) -> bool {
        self.styled
    }

    /// Renders `markdown` for display.
    ///
    /// Control characters in `markdown` are dropped first, see [`sanitize`].
    pub fn render(&self, markdown: &str) -> String {
        let text = sanitize(markdown);
        let mut lines = Vec::new();
        let mut block = Block::Text;
        let mut table = Vec::new();

        for line in text.lines() {
            if block == Block::Text && TABLE_ROW.is_match(line) {
                table.push(line);
                continue;
            }
            if !table.is_empty() {
                lines.extend(self.render_table(&table));
                table.clear();
            }
            match block {
                Block::Code => {
                    if FENCE.is_match(line) {
                        block = Block::Text;
                    } else {
                        lines.push(format!(
                            "{CODE_INDENT}{}",
                            self.paint(Style::CodeBlock, line)
                        ));
                    }
                }
                Block::Math => {
                    if line.trim() == "$$" {
                        block = Block::Text;
                    } else {
                        lines.push(format!(
                            "{MATH_INDENT}{}",
                            self.paint(Style::Math, line.trim())
                        ));
                    }
                }
                Block::Text => {
                    if FENCE.is_match(line) {
                        block = Block::Code;
                    } else if line.trim() == "$$" {
                        block = Block::Math;
                    } else {
                        lines.push(self.render_line(line));
                    }
                }
            }
        }
        if !table.is_empty() {
            lines.extend(self.render_table(&table));
        }

        lines.join("\n")
    }

    /// Lines up the columns of a pipe table. The delimiter row under the
    /// header becomes a rule.
    fn render_table(&self, rows: &[&str]) -> Vec<String> {
        let header_rows =
            rows.iter().position(|row| TABLE_SEPARATOR.is_match(row));
        let cells: Vec<Vec<(String, usize)>> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !TABLE_SEPARATOR.is_match(row))
            .map(|(idx, row)| {
                let is_header = header_rows.is_some_and(|count| idx < count);
                split_cells(row)
                    .map(|cell| {
                        // Widths are measured without escapes.
                        let text = Renderer::plain().render_inline(cell);
                        let width = text.chars().count();
                        let text = if is_header {
                            self.paint(Style::Bold, &text)
                        } else {
                            self.render_inline(cell)
                        };
                        (text, width)
                    })
                    .collect()
            })
            .collect();

        let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &cells {
            for (idx, (_, width)) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(*width);
            }
        }

        let mut out = Vec::with_capacity(cells.len() + 1);
        for (idx, row) in cells.iter().enumerate() {
            if header_rows == Some(idx) && idx > 0 {
                let rule: Vec<_> = widths.iter().map(|w| "─".repeat(*w)).collect();
                out.push(self.paint(Style::Muted, &rule.join("─┼─")));
            }
            let padded: Vec<_> = widths
                .iter()
                .enumerate()
                .map(|(col, width)| match row.get(col) {
                    Some((text, w)) => format!("{text}{}", " ".repeat(width - w)),
                    None => " ".repeat(*width),
                })
                .collect();
            out.push(padded.join(" │ ").trim_end().to_owned());
        }
        out
    }

    fn render_line(&self, line: &str) -> String {
        if RULE.is_match(line) {
            return self.paint(Style::Muted, &"─".repeat(RULE_WIDTH));
        }
        if let Some(caps) = HEADING.captures(line) {
            // Nested escapes would end the heading style early.
            let text = Renderer::plain().render_inline(&caps[2]);
            return self.paint(Style::Heading, &text);
        }
        if let Some(caps) = BULLET.captures(line) {
            return format!(
                "{}{} {}",
                &caps[1],
                self.paint(Style::Bullet, "•"),
                self.render_inline(&caps[2])
            );
        }
        if let Some(caps) = ORDERED.captures(line) {
            return format!(
                "{}{}. {}",
                &caps[1],
                &caps[2],
                self.render_inline(&caps[3])
            );
        }
        if let Some(caps) = QUOTE.captures(line) {
            return format!(
                "{} {}",
                self.paint(Style::Muted, "│"),
                self.render_inline(&caps[1])
            );
        }
        self.render_inline(line)
    }

    /// Renders a line's inline markup. Code spans are taken verbatim.
    fn render_inline(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in INLINE_CODE.find_iter(text) {
            out.push_str(&self.render_math(&text[last..m.start()]));
            let code = &m.as_str()[1..m.len() - 1];
            out.push_str(&self.paint(Style::Code, code));
            last = m.end();
        }
        out.push_str(&self.render_math(&text[last..]));
        out
    }

    fn render_math(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in MATH.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            // `$5 and $10` is money, not math.
            let followed_by_digit = text[whole.end()..]
                .starts_with(|c: char| c.is_ascii_digit());
            let Some(math) = caps.get(1).or(caps.get(2)) else {
                continue;
            };
            if caps.get(2).is_some() && followed_by_digit {
                continue;
            }
            out.push_str(&self.render_emphasis(&text[last..whole.start()]));
            out.push_str(&self.paint(Style::Math, math.as_str().trim()));
            last = whole.end();
        }
        out.push_str(&self.render_emphasis(&text[last..]));
        out
    }

    fn render_emphasis(&self, text: &str) -> String {
        let bold = BOLD.replace_all(text, |caps: &regex::Captures<'_>| {
            let inner = caps.get(1).or(caps.get(2)).map_or("", |m| m.as_str());
            self.paint(Style::Bold, inner)
        });
        ITALIC
            .replace_all(&bold, |caps: &regex::Captures<'_>| {
                self.paint(Style::Italic, &caps[1])
            })
            .into_owned()
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if !self.styled {
            return text.to_owned();
        }
        match style {
            Style::Heading => text.bold().bright_white().to_string(),
            Style::Bold => text.bold().to_string(),
            Style::Italic => text.italic().to_string(),
            Style::Code => text.bright_yellow().to_string(),
            Style::CodeBlock | Style::Muted => text.dimmed().to_string(),
            Style::Math => text.bright_magenta().to_string(),
            Style::Bullet => text.bright_cyan().to_string(),
        }
    }
}

impl Default for Renderer {
    #[inline]
    fn default() -> Self {
        Self::styled()
    }
}

fn split_cells(row: &str) -> impl Iterator<Item = &str> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(str::trim)
}

/// Drops every control character except newline and tab, so a reply cannot
/// move the cursor, recolor or retitle the terminal.
///
/// Returns `text` itself when there is nothing to drop.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_stripped) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().filter(|c| !is_stripped(*c)).collect())
}

#[inline]
fn is_stripped(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(markdown: &str) -> String {
        Renderer::plain().render(markdown)
    }

    #[test]
    fn test_blocks() {
        let itinerary = "# Day 1: Kathmandu\n\n\
                         - Visit **Swayambhunath** at sunrise\n  \
                         * Stay in *Thamel*\n\
                         2. Fly to Pokhara\n\
                         > Carry cash\n\
                         ---\n\
                         ## Tips ##";
        assert_eq!(
            plain(itinerary),
            format!(
                "Day 1: Kathmandu\n\n\
                 • Visit Swayambhunath at sunrise\n  \
                 • Stay in Thamel\n\
                 2. Fly to Pokhara\n\
                 │ Carry cash\n\
                 {}\n\
                 Tips",
                "─".repeat(RULE_WIDTH)
            )
        );
    }

    #[test]
    fn test_code() {
        let text = "Book with:\n```sh\ncurl **not bold**\n```\nthen run `gonepal *plan*`";
        assert_eq!(
            plain(text),
            "Book with:\n    curl **not bold**\nthen run gonepal *plan*"
        );
    }

    #[test]
    fn test_table() {
        let table = "Costs:\n\
                     | Day | Place |\n\
                     |-----|:-----:|\n\
                     | 1 | **Kathmandu** |\n\
                     | 2 | Pokhara |\n\
                     Enjoy!";
        assert_eq!(
            plain(table),
            format!(
                "Costs:\n\
                 Day │ Place\n\
                 {}─┼─{}\n\
                 1   │ Kathmandu\n\
                 2   │ Pokhara\n\
                 Enjoy!",
                "─".repeat(3),
                "─".repeat(9)
            )
        );

        // Rows without a delimiter are still aligned.
        assert_eq!(plain("| a | bb |\n| ccc | d |"), "a   │ bb\nccc │ d");
    }

    #[test]
    fn test_math() {
        assert_eq!(
            plain("Budget: $\\approx 40$ USD"),
            "Budget: \\approx 40 USD"
        );
        assert_eq!(plain("Total $$ 3 \\times 40 $$ USD"), "Total 3 \\times 40 USD");
        assert_eq!(plain("$$\nx^2 + y^2\n$$\ndone"), "  x^2 + y^2\ndone");
        assert_eq!(plain("costs $40 and $50 a night"), "costs $40 and $50 a night");
        assert_eq!(plain("a * b * c"), "a * b * c");
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let reply = "\u{1b}[2J\u{1b}]0;pwned\u{7}Hi\r\n\tthere\u{0}";
        assert_eq!(sanitize(reply), "[2J]0;pwnedHi\n\tthere");
        assert_eq!(plain(reply), "[2J]0;pwnedHi\n\tthere");
        assert!(!Renderer::styled().render(reply).contains("\u{1b}]"));

        assert!(matches!(sanitize("plain\ttext\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_styled() {
        let rendered = Renderer::styled().render("Visit **Boudha**");
        assert!(rendered.contains("\u{1b}["));
        assert!(rendered.contains("Boudha"));
        assert!(!rendered.contains("**"));

        assert!(!plain("# Visit **Boudha**").contains('\u{1b}'));
    }

    #[test]
    fn test_payload_is_untouched() {
        let reply = String::from("# Day 1\n- **Patan**");
        let _ = Renderer::styled().render(&reply);
        assert_eq!(reply, "# Day 1\n- **Patan**");
    }
}
