//! Lithuanian count rendering: plural agreement and `lt-LT` number grouping.

pub mod forms;
pub mod number;
pub mod plural;

pub use number::format_grouped;
pub use plural::{PluralCategory, plural_category, pluralize};

use readerstats_core::PluralForms;

/// Render `count` as `"<grouped count> <agreeing form>"`, e.g. `"21 peržiūra"`.
pub fn format_count(count: i64, forms: &PluralForms) -> String {
    format!("{} {}", format_grouped(count), pluralize(count, forms))
}
