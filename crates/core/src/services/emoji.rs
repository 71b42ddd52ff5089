//! Emoji name parsing and validation.

use fanout_common::{AppError, AppResult};
use fanout_db::entities::custom_emoji;

/// A reaction name split into shortcode and custom emoji domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiName {
    /// Shortcode without colons, or the literal unicode emoji.
    pub shortcode: String,
    /// `None` for local emoji and unicode emoji.
    pub domain: Option<String>,
}

impl EmojiName {
    /// Parse `shortcode[@domain]`.
    ///
    /// Surrounding colons are stripped. An empty domain, or one equal to
    /// `local_domain` (case-insensitive), is treated as local.
    #[must_use]
    pub fn parse(name: &str, local_domain: &str) -> Self {
        let name = name.trim().trim_matches(':');

        let (shortcode, domain) = match name.split_once('@') {
            Some((shortcode, domain)) => (shortcode, Some(domain.trim())),
            None => (name, None),
        };

        let domain = domain
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case(local_domain))
            .map(str::to_lowercase);

        Self {
            shortcode: shortcode.to_string(),
            domain,
        }
    }

    /// Whether the name points into a remote custom emoji namespace.
    #[must_use]
    pub const fn is_foreign(&self) -> bool {
        self.domain.is_some()
    }
}

/// Check a reaction before it is persisted.
///
/// Without a custom emoji the name must be a unicode emoji; a custom emoji
/// must not be disabled.
pub fn validate_reaction(name: &str, emoji: Option<&custom_emoji::Model>) -> AppResult<()> {
    match emoji {
        None if !is_unicode_emoji(name) => Err(AppError::UnrecognizedEmoji(name.to_string())),
        Some(emoji) if emoji.disabled => Err(AppError::UnrecognizedEmoji(name.to_string())),
        _ => Ok(()),
    }
}

/// Whether `name` is a single unicode emoji, possibly a ZWJ or keycap sequence.
#[must_use]
pub fn is_unicode_emoji(name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    if chars.is_empty() || chars.len() > 16 {
        return false;
    }

    // Keycaps: [0-9#*] FE0F? 20E3
    if is_keycap_base(chars[0]) {
        let rest = &chars[1..];
        return matches!(rest, ['\u{20E3}'] | ['\u{FE0F}', '\u{20E3}']);
    }

    // Flags are exactly two regional indicators.
    if is_regional_indicator(chars[0]) {
        return chars.len() == 2 && is_regional_indicator(chars[1]);
    }

    let mut expect_base = true;
    for &c in &chars {
        if expect_base {
            if !is_pictographic(c) {
                return false;
            }
            expect_base = false;
        } else if c == '\u{200D}' {
            expect_base = true;
        } else if !is_modifier(c) {
            return false;
        }
    }

    !expect_base
}

const fn is_keycap_base(c: char) -> bool {
    matches!(c, '0'..='9' | '#' | '*')
}

const fn is_regional_indicator(c: char) -> bool {
    matches!(c, '\u{1F1E6}'..='\u{1F1FF}')
}

/// Variation selectors, skin tones, tag characters and the keycap mark.
const fn is_modifier(c: char) -> bool {
    matches!(
        c,
        '\u{FE0E}' | '\u{FE0F}' | '\u{20E3}' | '\u{1F3FB}'..='\u{1F3FF}' | '\u{E0020}'..='\u{E007F}'
    )
}

const fn is_pictographic(c: char) -> bool {
    matches!(
        c,
        '\u{00A9}'
            | '\u{00AE}'
            | '\u{203C}'
            | '\u{2049}'
            | '\u{2122}'
            | '\u{2139}'
            | '\u{2194}'..='\u{21AA}'
            | '\u{231A}'..='\u{23FF}'
            | '\u{24C2}'
            | '\u{25AA}'..='\u{25FE}'
            | '\u{2600}'..='\u{27BF}'
            | '\u{2934}'
            | '\u{2935}'
            | '\u{2B05}'..='\u{2B55}'
            | '\u{3030}'
            | '\u{303D}'
            | '\u{3297}'
            | '\u{3299}'
            | '\u{1F000}'..='\u{1F0FF}'
            | '\u{1F10D}'..='\u{1F1AD}'
            | '\u{1F200}'..='\u{1F2FF}'
            | '\u{1F300}'..='\u{1F3FA}'
            | '\u{1F400}'..='\u{1FAFF}'
    )
}
