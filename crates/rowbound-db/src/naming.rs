//! Naming conventions mapping entity type names to table names.
//!
//! A type name is split at its camel-case boundaries into lower-cased,
//! underscore-joined segments, and the final segment is pluralized:
//! `UserProfile` becomes `user_profiles`, `Category` becomes `categories`.
//! Everything here is pure; the same input always yields the same output.

/// Words whose plural is the word itself.
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "news",
    "series",
    "sheep",
    "species",
];

/// Whole-word irregular plurals.
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("mouse", "mice"),
    ("person", "people"),
    ("shelf", "shelves"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// Suffixes that take `es` rather than `s`.
const SIBILANT_SUFFIXES: &[&str] = &["s", "x", "z", "ch", "sh"];

/// Derive the table name for an entity type name.
///
/// Only the simple name is used, so `app::models::OrderItem` and
/// `OrderItem` both map to `order_items`.
///
/// # Examples
///
/// ```
/// use rowbound_db::naming::derive_table_name;
///
/// assert_eq!(derive_table_name("UserProfile"), "user_profiles");
/// assert_eq!(derive_table_name("Category"), "categories");
/// assert_eq!(derive_table_name("Box"), "boxes");
/// ```
pub fn derive_table_name(type_name: &str) -> String {
    let snake = split_camel_case(type_name);
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralize(last)),
        None => pluralize(&snake),
    }
}

/// Split a camel-case name into lower-cased segments joined by `_`.
///
/// A run of capitals stays in one segment until the capital that starts a
/// lower-case word (`HTTPRequest` becomes `http_request`). Digits stay with
/// the segment before them.
pub fn split_camel_case(name: &str) -> String {
    let simple = name.rsplit("::").next().unwrap_or(name).trim();
    let chars: Vec<char> = simple.chars().collect();
    let mut out = String::with_capacity(simple.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_uppercase() {
            out.push(c);
            continue;
        }

        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        let boundary = match prev {
            None | Some('_') => false,
            Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
            Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
            Some(_) => false,
        };

        if boundary {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Pluralize a single lower-case English word.
///
/// Rules, in order: uncountable words, whole-word irregulars, consonant + `y`
/// to `ies`, sibilant endings to `es`, otherwise append `s`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }

    if SIBILANT_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }

    format!("{word}s")
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        assert_eq!(derive_table_name("UserProfile"), "user_profiles");
        assert_eq!(derive_table_name("Category"), "categories");
        assert_eq!(derive_table_name("Box"), "boxes");
        assert_eq!(derive_table_name("OrderItem"), "order_items");
        assert_eq!(derive_table_name("Book"), "books");
    }

    #[test]
    fn test_deterministic() {
        for name in ["UserProfile", "Category", "Box", "HTTPRequest", "Person"] {
            assert_eq!(derive_table_name(name), derive_table_name(name));
        }
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("OrderItem"), "order_item");
        assert_eq!(split_camel_case("User"), "user");
        assert_eq!(split_camel_case("HTTPRequest"), "http_request");
        assert_eq!(split_camel_case("ApiV2Key"), "api_v2_key");
        assert_eq!(split_camel_case("Mp4File"), "mp4_file");
        assert_eq!(split_camel_case("already_snake"), "already_snake");
        assert_eq!(split_camel_case("Shop_Order"), "shop_order");
        assert_eq!(split_camel_case("app::models::UserProfile"), "user_profile");
        assert_eq!(split_camel_case(""), "");
    }

    #[test]
    fn test_pluralize_suffix_rules() {
        assert_eq!(pluralize("city"), "cities");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("toy"), "toys");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("tax"), "taxes");
        assert_eq!(pluralize("quiz"), "quizes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("wish"), "wishes");
        assert_eq!(pluralize("book"), "books");
        assert_eq!(pluralize("y"), "ys");
    }

    #[test]
    fn test_pluralize_irregular_and_uncountable() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("shelf"), "shelves");
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("news"), "news");
        // Irregulars match whole words only.
        assert_eq!(pluralize("human"), "humans");
    }

    #[test]
    fn test_only_last_segment_pluralized() {
        assert_eq!(derive_table_name("PersonAddress"), "person_addresses");
        assert_eq!(derive_table_name("SalesPerson"), "sales_people");
        assert_eq!(derive_table_name("CompanyPolicy"), "company_policies");
        assert_eq!(derive_table_name("NewsItem"), "news_items");
    }
}
