//! Property tests for variant selection, placeholders and key resolution.

use kiwi_i18n::pluralization::{choose, plural_index};
use kiwi_i18n::resolver::{Resolved, resolve};
use kiwi_i18n::{MessageSet, Replacements, apply_replacements};
use proptest::prelude::*;

const RANGED: &str = "{0} none|{1} one|[2,*] many";

fn language() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("en"),
        Just("fr"),
        Just("ru"),
        Just("pl"),
        Just("ar"),
        Just("cy"),
        Just("ja"),
        Just("pt_BR"),
        Just("kk"),
    ]
}

proptest! {
    #[test]
    fn ranged_conditions_follow_count(n in 0u32..10_000, lang in language()) {
        let expected = match n {
            0 => "none",
            1 => "one",
            _ => "many",
        };
        prop_assert_eq!(choose(RANGED, n as f64, lang), expected);
    }

    #[test]
    fn fractional_counts_above_two_are_many(n in 2.0f64..10_000.0, lang in language()) {
        prop_assert_eq!(choose(RANGED, n, lang), "many");
    }

    #[test]
    fn single_segment_is_returned_unchanged(
        message in "[a-zA-Z0-9 :.,!?]{0,40}",
        n in -100.0f64..100_000.0,
        lang in language(),
    ) {
        prop_assert_eq!(choose(&message, n, lang), message);
    }

    #[test]
    fn plural_index_stays_within_six_forms(n in 0u32..100_000, lang in language()) {
        prop_assert!(plural_index(lang, n as f64) < 6);
    }

    #[test]
    fn placeholder_case_variants(name in "[a-z]{2,8}", value in "[a-z]{2,8}") {
        let template = format!(
            "Hello :{}, :{}, :{}",
            name,
            name.to_uppercase(),
            format!("{}{}", name[..1].to_uppercase(), &name[1..])
        );
        let replacements = Replacements::from([(name.as_str(), value.as_str())]);
        let expected = format!(
            "Hello {}, {}, {}{}",
            value,
            value.to_uppercase(),
            value[..1].to_uppercase(),
            &value[1..]
        );
        prop_assert_eq!(apply_replacements(&template, &replacements), expected);
    }

    #[test]
    fn unknown_keys_resolve_to_themselves(
        key in "[a-z]{1,8}(\\.[a-z]{1,8}){0,3}",
        prefix in "[a-z]{1,6}\\.",
    ) {
        let mut messages = MessageSet::new();
        prop_assert_eq!(
            resolve(&key, &mut messages, None),
            Resolved::Text(key.clone())
        );

        let prefixed = format!("{}{}", prefix, key);
        let mut messages = MessageSet::new();
        prop_assert_eq!(
            resolve(&prefixed, &mut messages, Some(&prefix)),
            Resolved::Text(key)
        );
    }
}

#[test]
fn documented_placeholder_example() {
    let replacements = Replacements::from([("name", "bob")]);
    assert_eq!(
        apply_replacements("Hello :name, :NAME, :Name", &replacements),
        "Hello bob, BOB, Bob"
    );
}
