//! Name inflection for entity names: plural/singular forms of table names and PascalCase type names.

use convert_case::{Case, Casing};

/// (singular, plural), lowercase.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("leaf", "leaves"),
];

/// Plurals of words ending in "ie", which the "ies" -> "y" rule would mangle.
const IE_PLURALS: &[&str] = &[
    "movies", "cookies", "pies", "ties", "lies", "dies", "calories", "rookies", "zombies", "genies", "hippies",
    "selfies", "prairies", "brownies", "smoothies", "newbies", "freebies", "hoodies", "pixies", "sorties",
    "goalies", "collies", "aunties", "bookies", "budgies", "magpies",
];

/// Stems of Greek "-sis" nouns whose plural ends in "ses".
const SIS_STEMS: &[&str] = &[
    "analy", "diagno", "parenthe", "progno", "synop", "the", "cri", "empha", "oa", "ellip", "neuro",
];

const UNCOUNTABLE: &[&str] = &[
    "sheep", "fish", "series", "species", "news", "equipment", "information", "rice", "money", "data",
];

/// Plural form; words that already look plural are returned unchanged.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, p)| *s == lower || *p == lower) {
        return restore_case(word, plural);
    }
    let singular = singular_form(&lower);
    if singular != lower && plural_form(&singular) == lower {
        return word.to_string();
    }
    restore_case(word, &plural_form(&lower))
}

/// Singular form; words that already look singular are returned unchanged.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(s, p)| *s == lower || *p == lower) {
        return restore_case(word, singular);
    }
    restore_case(word, &singular_form(&lower))
}

/// PascalCase type name, e.g. "tyre_brand" -> "TyreBrand".
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

fn plural_form(lower: &str) -> String {
    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{}ies", stem);
        }
    }
    if let Some(stem) = lower.strip_suffix("lf") {
        return format!("{}lves", stem);
    }
    if let Some(stem) = lower.strip_suffix("is") {
        return format!("{}es", stem);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", lower);
    }
    format!("{}s", lower)
}

fn singular_form(lower: &str) -> String {
    // short plurals only match whole words: "ties" must not catch "activities"
    if IE_PLURALS.iter().any(|plural| lower == *plural || (plural.len() > 4 && lower.ends_with(plural))) {
        return lower[..lower.len() - 1].to_string();
    }
    if let Some(prefix) = lower.strip_suffix("ses").filter(|p| SIS_STEMS.iter().any(|stem| p.ends_with(stem))) {
        return format!("{}sis", prefix);
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    if let Some(stem) = lower.strip_suffix("lves") {
        return format!("{}lf", stem);
    }
    if lower.ends_with("ouses") {
        return lower[..lower.len() - 1].to_string();
    }
    for suffix in ["uses", "sses", "xes", "zes", "ches", "shes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if ["us", "ss", "is"].iter().any(|suffix| lower.ends_with(suffix)) {
        return lower.to_string();
    }
    match lower.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => lower.to_string(),
    }
}

/// Re-apply the capitalization of `original` onto the lowercase `inflected`.
fn restore_case(original: &str, inflected: &str) -> String {
    if original.len() > 1 && !original.chars().any(char::is_lowercase) {
        return inflected.to_uppercase();
    }
    let lower = original.to_lowercase();
    if lower.len() != original.len() {
        return capitalize_like(original, inflected.to_string());
    }
    // Keep inner capitals (e.g. "TyreBrand") for the part the inflection did not touch.
    let common = common_prefix_len(&lower, inflected);
    let mut out = original[..common].to_string();
    out.push_str(&inflected[common..]);
    capitalize_like(original, out)
}

fn capitalize_like(original: &str, word: String) -> String {
    if !original.chars().next().is_some_and(char::is_uppercase) {
        return word;
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => word,
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map(|((i, x), _)| i + x.len_utf8())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_regular_and_irregular_words() {
        assert_eq!(pluralize("Car"), "Cars");
        assert_eq!(pluralize("City"), "Cities");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Status"), "Statuses");
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("sheep"), "sheep");
    }

    #[test]
    fn plural_words_stay_plural() {
        assert_eq!(pluralize("Cars"), "Cars");
        assert_eq!(pluralize("People"), "People");
        assert_eq!(pluralize("Cities"), "Cities");
    }

    #[test]
    fn singularizes() {
        assert_eq!(singularize("Cars"), "Car");
        assert_eq!(singularize("Cities"), "City");
        assert_eq!(singularize("People"), "Person");
        assert_eq!(singularize("Tyres"), "Tyre");
        assert_eq!(singularize("Statuses"), "Status");
        assert_eq!(singularize("Houses"), "House");
        assert_eq!(singularize("Car"), "Car");
        assert_eq!(singularize("Status"), "Status");
    }

    #[test]
    fn ie_and_sis_words() {
        assert_eq!(singularize("Movies"), "Movie");
        assert_eq!(singularize("Cookies"), "Cookie");
        assert_eq!(singularize("Analyses"), "Analysis");
        assert_eq!(singularize("Diagnoses"), "Diagnosis");
        assert_eq!(singularize("Activities"), "Activity");
        assert_eq!(singularize("Databases"), "Database");
        assert_eq!(singularize("Analysis"), "Analysis");
        assert_eq!(pluralize("Movie"), "Movies");
        assert_eq!(pluralize("Movies"), "Movies");
        assert_eq!(pluralize("Analysis"), "Analyses");
        assert_eq!(pluralize("Analyses"), "Analyses");
    }

    #[test]
    fn keeps_inner_capitals() {
        assert_eq!(pluralize("TyreBrand"), "TyreBrands");
        assert_eq!(singularize("TyreBrands"), "TyreBrand");
    }

    #[test]
    fn pascal_case() {
        assert_eq!(to_pascal_case("tyre_brand"), "TyreBrand");
        assert_eq!(to_pascal_case("car"), "Car");
    }
}
