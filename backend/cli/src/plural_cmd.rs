//! `readerstats plural`: print a count with its agreeing Lithuanian form.

use anyhow::{Result, bail};

use readerstats_core::PluralForms;
use readerstats_i18n::{format_count, forms, plural_category};

use crate::output::dim;

/// Pick the forms to use: a stock noun, or three explicit forms.
pub fn resolve_forms(
    noun: Option<&str>,
    one: Option<String>,
    few: Option<String>,
    many: Option<String>,
) -> Result<PluralForms> {
    match (noun, one, few, many) {
        (Some(_), Some(_), _, _) | (Some(_), _, Some(_), _) | (Some(_), _, _, Some(_)) => {
            bail!("use either --noun or --one/--few/--many, not both")
        }
        (Some(name), None, None, None) => match forms::by_name(name) {
            Some(f) => Ok(f),
            None => bail!(
                "unknown noun '{name}'; expected one of: {}",
                forms::NOUNS.join(", ")
            ),
        },
        (None, Some(one), Some(few), Some(many)) => Ok(PluralForms::new(one, few, many)),
        (None, None, None, None) => Ok(forms::views()),
        _ => bail!("--one, --few and --many must be given together"),
    }
}

pub fn run(count: i64, forms: &PluralForms) -> Result<()> {
    println!(
        "{} {}",
        format_count(count, forms),
        dim(&format!("({})", plural_category(count)))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_views() {
        let f = resolve_forms(None, None, None, None).unwrap();
        assert_eq!(f.one, "peržiūra");
    }

    #[test]
    fn test_stock_noun() {
        let f = resolve_forms(Some("readers"), None, None, None).unwrap();
        assert_eq!(format_count(21, &f), "21 skaitytojas");
    }

    #[test]
    fn test_explicit_forms() {
        let f = resolve_forms(
            None,
            Some("obuolys".into()),
            Some("obuoliai".into()),
            Some("obuolių".into()),
        )
        .unwrap();
        assert_eq!(format_count(12, &f), "12 obuolių");
    }

    #[test]
    fn test_rejects_partial_or_mixed() {
        assert!(resolve_forms(None, Some("a".into()), None, None).is_err());
        assert!(resolve_forms(Some("views"), Some("a".into()), None, None).is_err());
        let err = resolve_forms(Some("apples"), None, None, None).unwrap_err();
        assert!(err.to_string().contains("views"));
    }
}
