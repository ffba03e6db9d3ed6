//! Naming Utilities
//!
//! Identifier conversions shared by every mapper.

use convert_case::{Case, Casing};

/// Identifiers that cannot be used verbatim as member or parameter names.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

/// Method parameter names that shadow fields of the generated client.
const RESERVED_CLIENT_METHOD_PARAMETER_NAMES: &[&str] = &["service", "client"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

pub fn to_camel_case(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    name.to_case(Case::Camel)
}

pub fn to_pascal_case(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    name.to_case(Case::Pascal)
}

pub fn get_plural(name: &str) -> String {
    if name.is_empty() || name.ends_with('s') || name.ends_with('S') {
        name.to_string()
    } else {
        format!("{name}s")
    }
}

/// Keep only characters legal in an identifier, turning separators into spaces
/// so case conversion still sees word boundaries.
pub fn remove_invalid_characters(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn get_property_name(name: &str) -> String {
    let camel = to_camel_case(&remove_invalid_characters(name));
    if is_reserved(&camel) {
        format!("{camel}Property")
    } else {
        camel
    }
}

pub fn get_enum_member_name(value: &str) -> String {
    let cleaned = remove_invalid_characters(value);
    if cleaned.is_empty() {
        return "EMPTY".to_string();
    }
    let member = cleaned.to_case(Case::UpperSnake);
    if member.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{member}")
    } else {
        member
    }
}

pub fn get_escaped_reserved_client_method_parameter_name(name: &str) -> String {
    if RESERVED_CLIENT_METHOD_PARAMETER_NAMES.contains(&name) {
        format!("{name}Param")
    } else {
        name.to_string()
    }
}

/// Type names: Pascal case with invalid characters stripped.
pub fn get_type_name(name: &str) -> String {
    to_pascal_case(&remove_invalid_characters(name))
}

/// First sentence of `text`, trimmed, trailing period dropped, first letter lowercased.
pub fn to_description_fragment(text: &str) -> String {
    let trimmed = text.trim();
    let sentence = match trimmed.find(". ") {
        Some(end) => &trimmed[..end],
        None => trimmed,
    };
    let sentence = sentence.strip_suffix('.').unwrap_or(sentence);
    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(get_plural("Pet"), "Pets");
        assert_eq!(get_plural("Pets"), "Pets");
        assert_eq!(get_plural("STATUS"), "STATUS");
        assert_eq!(get_plural(""), "");
    }

    #[test]
    fn test_property_name_escapes_reserved_words() {
        assert_eq!(get_property_name("class"), "classProperty");
        assert_eq!(get_property_name("x-ms-client-id"), "xMsClientId");
        assert_eq!(get_property_name("display_name"), "displayName");
    }

    #[test]
    fn test_enum_member_name() {
        assert_eq!(get_enum_member_name("Standard_LRS"), "STANDARD_LRS");
        assert_eq!(get_enum_member_name("application/json"), "APPLICATION_JSON");
        assert_eq!(get_enum_member_name("2021"), "_2021");
        assert_eq!(get_enum_member_name(""), "EMPTY");
    }

    #[test]
    fn test_reserved_client_method_parameter_name() {
        assert_eq!(get_escaped_reserved_client_method_parameter_name("service"), "serviceParam");
        assert_eq!(get_escaped_reserved_client_method_parameter_name("client"), "clientParam");
        assert_eq!(get_escaped_reserved_client_method_parameter_name("name"), "name");
    }

    #[test]
    fn test_description_fragment() {
        assert_eq!(to_description_fragment("The pet. Extra text."), "the pet");
        assert_eq!(to_description_fragment("  Some value.  "), "some value");
        assert_eq!(to_description_fragment(""), "");
    }
}
