//! Status badge styling rules.
//!
//! Maps a free-text journal status (plus the optional hint colours supplied by
//! the store) to a display style. Matching is case-insensitive and substring
//! based; the keyword table is scanned in a fixed order and the first hit wins.

/// Convention colour used by the spreadsheet to mark accepted/near-final rows.
pub const GREEN: &str = "#00B050";
pub const NEON_GREEN: &str = "#00ff9d";
pub const DEFAULT_CYAN: &str = "#00f2ff";

const GLOW_TERMS: [&str; 4] = [
    "de recommendation",
    "eic decision",
    "awaiting approval decision",
    "almost published",
];

// Order matters: "indian journal - rej" must resolve to red, not salmon.
const KEYWORD_COLORS: [(&str, &str); 7] = [
    ("european spine journal", "#3182ce"),
    ("indian journal", "#e53e3e"),
    ("gs journal", "#38a169"),
    ("asian spine journal", "#805ad5"),
    ("rej", "#f56565"),
    ("awaiting", "#ecc94b"),
    ("yet to start", "#a0aec0"),
];

// Only this keyword also pins the text colour.
const PINNED_TEXT_KEYWORD: &str = "european spine journal";

const BACKGROUND_ALPHA: &str = "33";
const BORDER_ALPHA: &str = "aa";
const BOX_SHADOW_ALPHA: &str = "44";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDescriptor {
    pub base_color: String,
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    pub glow: bool,
}

impl StyleDescriptor {
    /// Text and border shadows are applied exactly when the badge glows.
    pub fn shadow(&self) -> bool {
        self.glow
    }

    pub fn border(&self) -> String {
        format!("1px solid {}", self.border_color)
    }

    pub fn box_shadow(&self) -> Option<String> {
        self.glow
            .then(|| format!("0 0 15px {}{}", self.base_color, BOX_SHADOW_ALPHA))
    }

    pub fn text_shadow(&self) -> Option<String> {
        self.glow.then(|| format!("0 0 8px {}", self.text_color))
    }

    pub fn animation(&self) -> Option<&'static str> {
        self.glow.then_some("pulse-glow 2s infinite")
    }

    /// Render as inline CSS declarations, e.g. for an HTML export of the table.
    pub fn css_declarations(&self) -> String {
        format!(
            "background: {}; color: {}; border: {}; box-shadow: {}; text-shadow: {}; animation: {};",
            self.background_color,
            self.text_color,
            self.border(),
            self.box_shadow().as_deref().unwrap_or("none"),
            self.text_shadow().as_deref().unwrap_or("none"),
            self.animation().unwrap_or("none"),
        )
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

fn is_green(v: Option<&str>) -> bool {
    v == Some(GREEN)
}

pub fn should_glow(status_lower: &str) -> bool {
    GLOW_TERMS.iter().any(|t| status_lower.contains(t))
}

/// Compute the badge style for a status. Pure and total.
pub fn compute_style(
    status: &str,
    external_color: Option<&str>,
    external_font_color: Option<&str>,
) -> StyleDescriptor {
    let s = status.to_lowercase();
    let external_color = non_blank(external_color);
    let external_font_color = non_blank(external_font_color);

    let glow = should_glow(&s);
    let forced_green = is_green(external_color) || is_green(external_font_color);

    let mut color = external_color.map(str::to_string);
    let mut text_color = external_font_color.map(str::to_string);

    if forced_green || glow {
        color = Some(GREEN.to_string());
        text_color = Some(if glow { NEON_GREEN } else { GREEN }.to_string());
    }

    let base = match color {
        Some(c) => c,
        None => {
            let hit = KEYWORD_COLORS.iter().find(|(kw, _)| s.contains(kw));
            match hit {
                Some((kw, c)) => {
                    if *kw == PINNED_TEXT_KEYWORD {
                        text_color = Some((*c).to_string());
                    }
                    (*c).to_string()
                }
                None => DEFAULT_CYAN.to_string(),
            }
        }
    };

    let text_color = text_color.unwrap_or_else(|| base.clone());

    StyleDescriptor {
        background_color: format!("{base}{BACKGROUND_ALPHA}"),
        border_color: format!("{base}{BORDER_ALPHA}"),
        text_color,
        base_color: base,
        glow,
    }
}

/// Parse `#rrggbb` (alpha suffix ignored) into RGB components.
pub fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let h = hex.trim().strip_prefix('#')?;
    if h.len() < 6 || !h.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&h[0..2], 16).ok()?;
    let g = u8::from_str_radix(&h[2..4], 16).ok()?;
    let b = u8::from_str_radix(&h[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Blend `rgb` over black at `alpha` (0.0..=1.0); terminals have no translucency.
pub fn tint(rgb: (u8, u8, u8), alpha: f64) -> (u8, u8, u8) {
    let a = alpha.clamp(0.0, 1.0);
    let ch = |c: u8| (c as f64 * a).round() as u8;
    (ch(rgb.0), ch(rgb.1), ch(rgb.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eic_decision_glows_green_over_other_keywords() {
        for status in [
            "EIC Decision",
            "Indian Journal - eic decision pending",
            "rej? awaiting EIC DECISION",
        ] {
            let st = compute_style(status, None, None);
            assert!(st.glow, "{status}");
            assert!(st.shadow());
            assert_eq!(st.base_color, GREEN);
            assert_eq!(st.text_color, NEON_GREEN);
        }
    }

    #[test]
    fn external_green_forces_base_and_text() {
        let st = compute_style("Indian Journal - Rej", Some(GREEN), None);
        assert_eq!(st.base_color, GREEN);
        assert_eq!(st.text_color, GREEN);
        assert!(!st.glow);

        let via_font = compute_style("Yet to start", None, Some(GREEN));
        assert_eq!(via_font.base_color, GREEN);
        assert_eq!(via_font.text_color, GREEN);
    }

    #[test]
    fn external_green_with_glow_uses_neon_text() {
        let st = compute_style("Almost published", Some(GREEN), None);
        assert_eq!(st.base_color, GREEN);
        assert_eq!(st.text_color, NEON_GREEN);
        assert!(st.glow);
    }

    #[test]
    fn unknown_and_empty_status_default_to_cyan() {
        for status in ["", "Submitted", "under review"] {
            let st = compute_style(status, None, None);
            assert_eq!(st.base_color, DEFAULT_CYAN);
            assert_eq!(st.text_color, DEFAULT_CYAN);
            assert!(!st.glow);
        }
    }

    #[test]
    fn keyword_order_is_first_match_wins() {
        assert_eq!(
            compute_style("Indian Journal - Rej", None, None).base_color,
            "#e53e3e"
        );
        assert_eq!(
            compute_style("Rejected - awaiting resubmission", None, None).base_color,
            "#f56565"
        );
        assert_eq!(
            compute_style("GS Journal", None, None).base_color,
            "#38a169"
        );
        assert_eq!(
            compute_style("Asian Spine Journal", None, None).base_color,
            "#805ad5"
        );
        assert_eq!(
            compute_style("Awaiting reviewer", None, None).base_color,
            "#ecc94b"
        );
        assert_eq!(
            compute_style("Yet to Start", None, None).base_color,
            "#a0aec0"
        );
    }

    #[test]
    fn european_spine_journal_pins_text_over_font_hint() {
        let st = compute_style("European Spine Journal", None, Some("#111111"));
        assert_eq!(st.base_color, "#3182ce");
        assert_eq!(st.text_color, "#3182ce");

        // Other keywords keep the store's font colour.
        let other = compute_style("GS Journal", None, Some("#111111"));
        assert_eq!(other.text_color, "#111111");
    }

    #[test]
    fn non_green_external_color_becomes_base() {
        let st = compute_style("Indian Journal", Some("#FF0000"), None);
        assert_eq!(st.base_color, "#FF0000");
        assert_eq!(st.text_color, "#FF0000");
        assert_eq!(st.background_color, "#FF000033");
        assert_eq!(st.border_color, "#FF0000aa");
    }

    #[test]
    fn blank_external_color_is_ignored() {
        let st = compute_style("gs journal", Some("  "), Some(""));
        assert_eq!(st.base_color, "#38a169");
    }

    #[test]
    fn derived_tints_and_css() {
        let st = compute_style("de recommendation", None, None);
        assert_eq!(st.background_color, "#00B05033");
        assert_eq!(st.border(), "1px solid #00B050aa");
        assert_eq!(st.box_shadow().as_deref(), Some("0 0 15px #00B05044"));
        assert_eq!(st.text_shadow().as_deref(), Some("0 0 8px #00ff9d"));
        assert!(st.css_declarations().contains("animation: pulse-glow 2s infinite;"));

        let calm = compute_style("yet to start", None, None);
        assert!(calm.css_declarations().ends_with("animation: none;"));
    }

    #[test]
    fn compute_style_is_deterministic() {
        let a = compute_style("Awaiting approval decision", Some("#abcdef"), None);
        let b = compute_style("Awaiting approval decision", Some("#abcdef"), None);
        assert_eq!(a, b);
    }

    #[test]
    fn approval_decision_glows_instead_of_awaiting_yellow() {
        let st = compute_style("Awaiting approval decision", None, None);
        assert!(st.glow);
        assert_eq!(st.base_color, GREEN);
        assert_eq!(st.text_color, NEON_GREEN);

        let plain = compute_style("Awaiting reviewer", None, None);
        assert!(!plain.glow);
        assert_eq!(plain.base_color, "#ecc94b");
    }

    #[test]
    fn green_convention_matches_exact_hex_only() {
        let st = compute_style("Submitted", Some("#00b050"), Some("#123456"));
        assert_eq!(st.base_color, "#00b050");
        assert_eq!(st.text_color, "#123456");

        let exact = compute_style("Submitted", Some(GREEN), Some("#123456"));
        assert_eq!(exact.base_color, GREEN);
        assert_eq!(exact.text_color, GREEN);
    }

    #[test]
    fn parses_hex_and_tints() {
        assert_eq!(parse_hex_rgb("#00B050"), Some((0x00, 0xB0, 0x50)));
        assert_eq!(parse_hex_rgb("#00B05033"), Some((0x00, 0xB0, 0x50)));
        assert_eq!(parse_hex_rgb("rgb(1,2,3)"), None);
        assert_eq!(tint((200, 100, 50), 0.2), (40, 20, 10));
    }
}
