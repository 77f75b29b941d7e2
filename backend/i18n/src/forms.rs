//! Stock noun forms used on the site.

use readerstats_core::PluralForms;

/// Names accepted by [`by_name`], in display order.
pub const NOUNS: &[&str] = &[
    "views", "readers", "articles", "minutes", "courses", "lessons", "students", "tools",
];

pub fn views() -> PluralForms {
    PluralForms::new("peržiūra", "peržiūros", "peržiūrų")
}

pub fn readers() -> PluralForms {
    PluralForms::new("skaitytojas", "skaitytojai", "skaitytojų")
}

pub fn articles() -> PluralForms {
    PluralForms::new("straipsnis", "straipsniai", "straipsnių")
}

pub fn minutes() -> PluralForms {
    PluralForms::new("minutė", "minutės", "minučių")
}

pub fn courses() -> PluralForms {
    PluralForms::new("kursas", "kursai", "kursų")
}

pub fn lessons() -> PluralForms {
    PluralForms::new("pamoka", "pamokos", "pamokų")
}

pub fn students() -> PluralForms {
    PluralForms::new("studentas", "studentai", "studentų")
}

pub fn tools() -> PluralForms {
    PluralForms::new("įrankis", "įrankiai", "įrankių")
}

/// Look up stock forms by English name (see [`NOUNS`]).
pub fn by_name(name: &str) -> Option<PluralForms> {
    let forms = match name {
        "views" => views(),
        "readers" => readers(),
        "articles" => articles(),
        "minutes" => minutes(),
        "courses" => courses(),
        "lessons" => lessons(),
        "students" => students(),
        "tools" => tools(),
        _ => return None,
    };
    Some(forms)
}
