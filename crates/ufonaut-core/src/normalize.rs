//! Endpoint name normalization and small string helpers.
//!
//! Two stripping variants exist and they are not interchangeable:
//! [`letters_only_with_dash`] derives endpoint identifiers (script file
//! names), while [`letters_numbers_with_dash`] slugs free-form names such as
//! set output files.

/// Token substituted for a missing request path.
pub const UNDEFINED_PATH: &str = "undefined";

/// Derive the normalized endpoint name from an HTTP method and resource path.
///
/// `normalized_endpoint_name("GET", Some("store/order"))` → `"get-storeorder"`.
/// A missing path normalizes as the literal `"undefined"`.
pub fn normalized_endpoint_name(method: &str, path: Option<&str>) -> String {
    let path = path.unwrap_or(UNDEFINED_PATH);
    format!("{}-{}", method, letters_only_with_dash(path)).to_lowercase()
}

/// Remove every character except ASCII letters and `-`.
pub fn letters_only_with_dash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '-')
        .collect()
}

/// Remove every character except ASCII letters, digits and `-`.
pub fn letters_numbers_with_dash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_and_path_case_insensitive() {
        assert_eq!(
            normalized_endpoint_name("GET", Some("Store")),
            normalized_endpoint_name("get", Some("store"))
        );
        assert_eq!(normalized_endpoint_name("GET", Some("Store")), "get-store");
    }

    #[test]
    fn test_strips_slashes_params_and_digits() {
        assert_eq!(
            normalized_endpoint_name("delete", Some("store/order/:orderId")),
            "delete-storeorderorderid"
        );
        assert_eq!(normalized_endpoint_name("get", Some("v2/pet")), "get-vpet");
    }

    #[test]
    fn test_missing_path_uses_undefined_token() {
        assert_eq!(normalized_endpoint_name("POST", None), "post-undefined");
    }

    #[test]
    fn test_dash_is_kept() {
        assert_eq!(
            normalized_endpoint_name("put", Some("user-profile/{id}")),
            "put-user-profileid"
        );
    }

    #[test]
    fn test_letters_numbers_keeps_digits() {
        assert_eq!(letters_numbers_with_dash("Set #1 - smoke!"), "Set1-smoke");
        assert_eq!(letters_only_with_dash("Set #1 - smoke!"), "Set-smoke");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("id"), "Id");
        assert_eq!(capitalize("0"), "0");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("photoUrls"), "PhotoUrls");
    }
}
