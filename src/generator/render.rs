//! SVG overlay: the template image with outlined Impact-style top and bottom text.

const CANVAS: u32 = 1000;
const MARGIN: u32 = 24;

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Greedy word wrap at `width` characters; a longer word gets its own line.
pub(crate) fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Vertical room for one text block; top and bottom each get half the canvas.
const MAX_BLOCK_HEIGHT: u32 = (CANVAS - 2 * MARGIN) / 2;

const MIN_FONT_SIZE: u32 = 44;
const MIN_WRAP_WIDTH: usize = 36;

fn line_height(size: u32) -> u32 {
    size + size / 8
}

/// Font size and wrap width: shrink until the block fits in three lines, then
/// cut at the smallest size so the block stays inside its half of the canvas.
fn layout(text: &str) -> (u32, Vec<String>) {
    for (size, width) in [(88, 18), (72, 22), (56, 28)] {
        let lines = wrap_words(text, width);
        if lines.len() <= 3 {
            return (size, lines);
        }
    }
    let mut lines = wrap_words(text, MIN_WRAP_WIDTH);
    let max_lines = (MAX_BLOCK_HEIGHT / line_height(MIN_FONT_SIZE)) as usize;
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let kept: String = last.chars().take(MIN_WRAP_WIDTH - 1).collect();
            *last = format!("{}\u{2026}", kept.trim_end());
        }
    }
    (MIN_FONT_SIZE, lines)
}

fn text_block(text: &str, anchor_top: bool) -> String {
    let upper = text.trim().to_uppercase();
    if upper.is_empty() {
        return String::new();
    }
    let (size, lines) = layout(&upper);
    let step = line_height(size);
    let block_height = (step * lines.len() as u32).min(CANVAS - 2 * MARGIN);
    let first_baseline = if anchor_top {
        MARGIN + size
    } else {
        CANVAS.saturating_sub(MARGIN + block_height) + size
    };

    let mut out = format!(
        "  <text x=\"{}\" text-anchor=\"middle\" font-family=\"Impact, 'Anton', 'Arial Black', sans-serif\" font-size=\"{size}\" fill=\"#ffffff\" stroke=\"#000000\" stroke-width=\"{}\" paint-order=\"stroke\">\n",
        CANVAS / 2,
        (size / 14).max(2)
    );
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!(
            "    <tspan x=\"{}\" y=\"{}\">{}</tspan>\n",
            CANVAS / 2,
            first_baseline + step * i as u32,
            escape_xml(line)
        ));
    }
    out.push_str("  </text>\n");
    out
}

/// Renders the overlay document.
pub fn render_svg(image_href: &str, top: &str, bottom: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{c}\" height=\"{c}\" viewBox=\"0 0 {c} {c}\">\n  <image href=\"{href}\" xlink:href=\"{href}\" x=\"0\" y=\"0\" width=\"{c}\" height=\"{c}\" preserveAspectRatio=\"xMidYMid slice\"/>\n{top}{bottom}</svg>\n",
        c = CANVAS,
        href = escape_xml(image_href),
        top = text_block(top, true),
        bottom = text_block(bottom, false),
    )
}
