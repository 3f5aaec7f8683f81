//! Plural variant selection for pipe-delimited messages
//!
//! A message such as `"{0} No apples|{1} One apple|[2,*] :count apples"` carries
//! its variants separated by `|`. Each variant may start with an inline
//! condition. When no condition matches the count, the variant is picked by
//! the plural rules of the active language.
//!
//! # Example
//!
//! ```
//! use kiwi_i18n::pluralization::choose;
//!
//! assert_eq!(choose("{0} none|{1} one|[2,*] many", 5.0, "en"), "many");
//! assert_eq!(choose("apple|apples", 1.0, "en"), "apple");
//! assert_eq!(choose("apple|apples", 0.0, "fr"), "apple");
//! ```

use icu_locale::Locale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};
use regex::Regex;
use std::sync::LazyLock;

static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^[\{\[]([^\[\]\{\}]*)[\}\]](.*)").expect("condition pattern is valid")
});

static CONDITION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\{\[]([^\[\]\{\}]*)[\}\]]").expect("condition prefix pattern is valid")
});

/// Select the variant of `message` that fits `count` in language `tag`.
pub fn choose(message: &str, count: f64, tag: &str) -> String {
    let segments: Vec<&str> = message.split('|').collect();

    if let Some(line) = extract(&segments, count) {
        return line.trim().to_string();
    }

    let segments = strip_conditions(&segments);
    let index = plural_index(tag, count);

    match segments.get(index) {
        Some(segment) if segments.len() > 1 && !segment.is_empty() => segment.to_string(),
        _ => segments[0].to_string(),
    }
}

/// First segment whose inline condition matches `count`.
fn extract<'a>(segments: &[&'a str], count: f64) -> Option<&'a str> {
    segments
        .iter()
        .find_map(|segment| extract_from_segment(*segment, count))
}

fn extract_from_segment(segment: &str, count: f64) -> Option<&str> {
    let captures = CONDITION.captures(segment)?;
    let condition = captures.get(1)?.as_str();
    let value = captures.get(2).map_or("", |m| m.as_str());

    condition_matches(condition, count).then_some(value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Unbounded,
    At(f64),
    Invalid,
}

impl Bound {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "*" {
            return Bound::Unbounded;
        }
        raw.parse::<f64>().map_or(Bound::Invalid, Bound::At)
    }
}

fn condition_matches(condition: &str, count: f64) -> bool {
    let Some((from, rest)) = condition.split_once(',') else {
        return condition.trim().parse::<f64>().is_ok_and(|n| n == count);
    };
    // Only the first two bounds take part: `{1,2,3}` behaves like `{1,2}`.
    let to = rest.split(',').next().unwrap_or(rest);

    match (Bound::parse(from), Bound::parse(to)) {
        (Bound::Invalid, _) | (_, Bound::Invalid) => false,
        (Bound::Unbounded, Bound::Unbounded) => true,
        (Bound::At(from), Bound::Unbounded) => count >= from,
        (Bound::Unbounded, Bound::At(to)) => count <= to,
        (Bound::At(from), Bound::At(to)) => count >= from && count <= to,
    }
}

fn strip_conditions<'a>(segments: &[&'a str]) -> Vec<std::borrow::Cow<'a, str>> {
    segments
        .iter()
        .map(|segment| CONDITION_PREFIX.replace(*segment, ""))
        .collect()
}

/// Plural families, grouped by shared selection formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralFamily {
    /// Languages without grammatical number (ja, ko, zh, tr, ...)
    Invariant,
    /// `1` is singular, everything else plural (en, de, es, ...)
    OneOther,
    /// `0` and `1` are singular (fr, hi, pt_BR, ...)
    ZeroOneOther,
    /// ru, uk, be, bs, hr, sr, sh
    EastSlavic,
    /// cs, sk
    Czech,
    Irish,
    Lithuanian,
    Slovenian,
    Macedonian,
    Maltese,
    Latvian,
    Polish,
    Welsh,
    Romanian,
    Arabic,
}

impl PluralFamily {
    /// Look up the family of a language tag such as `en`, `pt_BR` or `sr-Latn`.
    pub fn for_tag(tag: &str) -> Option<Self> {
        let tag = tag.replace('-', "_");
        if tag == "pt_BR" {
            return Some(PluralFamily::ZeroOneOther);
        }
        let language = tag.split('_').next().unwrap_or(&tag);
        Self::for_language(language)
    }

    fn for_language(language: &str) -> Option<Self> {
        let family = match language {
            "az" | "bo" | "dz" | "id" | "ja" | "jv" | "ka" | "km" | "kn" | "ko" | "ms" | "th"
            | "tr" | "vi" | "zh" => PluralFamily::Invariant,
            "af" | "bn" | "bg" | "ca" | "da" | "de" | "el" | "en" | "eo" | "es" | "et" | "eu"
            | "fa" | "fi" | "fo" | "fur" | "fy" | "gl" | "gu" | "ha" | "he" | "hu" | "is"
            | "it" | "ku" | "lb" | "ml" | "mn" | "mr" | "nah" | "nb" | "ne" | "nl" | "nn"
            | "no" | "oc" | "om" | "or" | "pa" | "pap" | "ps" | "pt" | "so" | "sq" | "sv"
            | "sw" | "ta" | "te" | "tk" | "ur" | "zu" => PluralFamily::OneOther,
            "am" | "bh" | "fil" | "fr" | "gun" | "hi" | "hy" | "ln" | "mg" | "nso" | "ti"
            | "wa" | "xbr" => PluralFamily::ZeroOneOther,
            "be" | "bs" | "hr" | "ru" | "sh" | "sr" | "uk" => PluralFamily::EastSlavic,
            "cs" | "sk" => PluralFamily::Czech,
            "ga" => PluralFamily::Irish,
            "lt" => PluralFamily::Lithuanian,
            "sl" => PluralFamily::Slovenian,
            "mk" => PluralFamily::Macedonian,
            "mt" => PluralFamily::Maltese,
            "lv" => PluralFamily::Latvian,
            "pl" => PluralFamily::Polish,
            "cy" => PluralFamily::Welsh,
            "ro" => PluralFamily::Romanian,
            "ar" => PluralFamily::Arabic,
            _ => return None,
        };
        Some(family)
    }

    /// Zero-based variant index for `n`.
    pub fn index(self, n: f64) -> usize {
        let mod10 = n % 10.0;
        let mod100 = n % 100.0;
        match self {
            PluralFamily::Invariant => 0,
            PluralFamily::OneOther => usize::from(n != 1.0),
            PluralFamily::ZeroOneOther => usize::from(n != 0.0 && n != 1.0),
            PluralFamily::EastSlavic => {
                if mod10 == 1.0 && mod100 != 11.0 {
                    0
                } else if (2.0..=4.0).contains(&mod10) && !(10.0..20.0).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Czech => {
                if n == 1.0 {
                    0
                } else if (2.0..=4.0).contains(&n) {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Irish => {
                if n == 1.0 {
                    0
                } else if n == 2.0 {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Lithuanian => {
                if mod10 == 1.0 && mod100 != 11.0 {
                    0
                } else if mod10 >= 2.0 && !(10.0..20.0).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Slovenian => {
                if mod100 == 1.0 {
                    0
                } else if mod100 == 2.0 {
                    1
                } else if mod100 == 3.0 || mod100 == 4.0 {
                    2
                } else {
                    3
                }
            }
            PluralFamily::Macedonian => usize::from(mod10 != 1.0),
            PluralFamily::Maltese => {
                if n == 1.0 {
                    0
                } else if n == 0.0 || (mod100 > 1.0 && mod100 < 11.0) {
                    1
                } else if mod100 > 10.0 && mod100 < 20.0 {
                    2
                } else {
                    3
                }
            }
            PluralFamily::Latvian => {
                if n == 0.0 {
                    0
                } else if mod10 == 1.0 && mod100 != 11.0 {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Polish => {
                if n == 1.0 {
                    0
                } else if (2.0..=4.0).contains(&mod10) && (mod100 < 12.0 || mod100 > 14.0) {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Welsh => {
                if n == 1.0 {
                    0
                } else if n == 2.0 {
                    1
                } else if n == 8.0 || n == 11.0 {
                    2
                } else {
                    3
                }
            }
            PluralFamily::Romanian => {
                if n == 1.0 {
                    0
                } else if n == 0.0 || (mod100 > 0.0 && mod100 < 20.0) {
                    1
                } else {
                    2
                }
            }
            PluralFamily::Arabic => {
                if n == 0.0 {
                    0
                } else if n == 1.0 {
                    1
                } else if n == 2.0 {
                    2
                } else if (3.0..=10.0).contains(&mod100) {
                    3
                } else if (11.0..=99.0).contains(&mod100) {
                    4
                } else {
                    5
                }
            }
        }
    }
}

/// Zero-based plural variant index for `count` in language `tag`.
///
/// Languages outside the built-in families fall back to CLDR cardinal rules:
/// the index is the position of the count's category among the categories the
/// language uses. Unknown tags select the first variant.
pub fn plural_index(tag: &str, count: f64) -> usize {
    match PluralFamily::for_tag(tag) {
        Some(family) => family.index(count),
        None => cldr_index(tag, count).unwrap_or(0),
    }
}

/// Categories in the order their variants are written in a message.
const CATEGORY_ORDER: [PluralCategory; 6] = [
    PluralCategory::Zero,
    PluralCategory::One,
    PluralCategory::Two,
    PluralCategory::Few,
    PluralCategory::Many,
    PluralCategory::Other,
];

fn cldr_index(tag: &str, count: f64) -> Option<usize> {
    let locale: Locale = tag.replace('_', "-").parse().ok()?;
    let rules = PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()).ok()?;

    let used = used_categories(&rules);
    let magnitude = count.abs();
    let category = if magnitude.fract() == 0.0 && magnitude <= usize::MAX as f64 {
        rules.category_for(magnitude as usize)
    } else {
        PluralCategory::Other
    };

    used.iter().position(|c| *c == category)
}

/// Probe representative numbers to find which categories a language uses.
fn used_categories(rules: &PluralRules) -> Vec<PluralCategory> {
    let samples: [usize; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 11, 21, 22, 23, 25, 100, 101, 1000];
    let mut found: Vec<PluralCategory> = samples.iter().map(|n| rules.category_for(*n)).collect();
    found.push(PluralCategory::Other);

    CATEGORY_ORDER
        .iter()
        .copied()
        .filter(|category| found.contains(category))
        .collect()
}
