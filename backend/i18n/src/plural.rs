//! Lithuanian plural selection.
//!
//! Lithuanian nouns take one of three forms after a number, chosen by the last
//! two decimal digits of its absolute value:
//!
//! | last digits            | category | example          |
//! |------------------------|----------|------------------|
//! | 11..=19                | many     | 11 peržiūrų      |
//! | x1 (not 11)            | one      | 21 peržiūra      |
//! | x2..=x9 (not 12..=19)  | few      | 22 peržiūros     |
//! | x0, 10..=20            | many     | 20 peržiūrų      |

use std::fmt;

use readerstats_core::PluralForms;

/// Which of the three forms a count takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    One,
    Few,
    Many,
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluralCategory::One => "one",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
        };
        f.write_str(s)
    }
}

/// Plural category for `count`. Total over all integers.
pub fn plural_category(count: i64) -> PluralCategory {
    let n = count.unsigned_abs();
    let last_two = n % 100;
    let last = n % 10;

    if (11..=19).contains(&last_two) {
        PluralCategory::Many
    } else if last == 1 {
        PluralCategory::One
    } else if (2..=9).contains(&last) {
        PluralCategory::Few
    } else {
        PluralCategory::Many
    }
}

/// Pick the form of `forms` that agrees with `count`.
pub fn pluralize(count: i64, forms: &PluralForms) -> &str {
    match plural_category(count) {
        PluralCategory::One => &forms.one,
        PluralCategory::Few => &forms.few,
        PluralCategory::Many => &forms.many,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views() -> PluralForms {
        PluralForms::new("peržiūra", "peržiūros", "peržiūrų")
    }

    #[test]
    fn test_edge_cases() {
        let f = views();
        let cases = [
            (0, "peržiūrų"),
            (1, "peržiūra"),
            (2, "peržiūros"),
            (9, "peržiūros"),
            (10, "peržiūrų"),
            (11, "peržiūrų"),
            (19, "peržiūrų"),
            (20, "peržiūrų"),
            (21, "peržiūra"),
            (22, "peržiūros"),
            (73, "peržiūros"),
            (100, "peržiūrų"),
            (101, "peržiūra"),
            (111, "peržiūrų"),
        ];
        for (n, expected) in cases {
            assert_eq!(pluralize(n, &f), expected, "count {n}");
        }
    }

    #[test]
    fn test_teens_in_higher_hundreds() {
        assert_eq!(plural_category(1012), PluralCategory::Many);
        assert_eq!(plural_category(1_000_001), PluralCategory::One);
        assert_eq!(plural_category(312), PluralCategory::Many);
        assert_eq!(plural_category(322), PluralCategory::Few);
    }

    #[test]
    fn test_negative_counts_use_absolute_value() {
        assert_eq!(plural_category(-1), PluralCategory::One);
        assert_eq!(plural_category(-11), PluralCategory::Many);
        assert_eq!(plural_category(-24), PluralCategory::Few);
        assert_eq!(plural_category(i64::MIN), plural_category(8));
    }

    #[test]
    fn test_choice_depends_only_on_last_two_digits() {
        let f = views();
        for n in 0..1000_i64 {
            let got = pluralize(n, &f);
            assert!(got == f.one || got == f.few || got == f.many);
            assert_eq!(plural_category(n), plural_category(n % 100), "count {n}");
        }
    }
}
