/// Pick the install language for a release.
///
/// Walks `preferred` in order and stops at the first locale that is a prefix
/// of any available language; the first available language carrying that
/// prefix wins. Without a match the first available language is used, and an
/// empty `available` list yields `None`.
pub fn resolve_install_language<S, P>(available: &[S], preferred: &[P]) -> Option<String>
where
    S: AsRef<str>,
    P: AsRef<str>,
{
    let matched = preferred.iter().map(AsRef::as_ref).find_map(|pref| {
        available
            .iter()
            .map(AsRef::as_ref)
            .find(|lang| lang.starts_with(pref))
    });

    matched
        .or_else(|| available.first().map(AsRef::as_ref))
        .map(str::to_string)
}

/// Preferred UI locales for the current user, most preferred first.
pub fn preferred_locales() -> Vec<String> {
    for var in ["LC_ALL", "LC_MESSAGES", "LANGUAGE", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            let locales = locales_from_env_value(&value);
            if !locales.is_empty() {
                return locales;
            }
        }
    }

    vec!["en".to_string()]
}

/// Expand a POSIX locale variable (`de_DE.UTF-8:fr`) into tags with their
/// base language as fallback, ending with `en`.
pub fn locales_from_env_value(value: &str) -> Vec<String> {
    let mut locales: Vec<String> = Vec::new();

    for token in value.split(':') {
        let Some(tag) = normalize_locale_token(token) else {
            continue;
        };
        let base = tag.split('-').next().unwrap_or(&tag).to_string();

        for candidate in [tag.clone(), base] {
            if !locales.contains(&candidate) {
                locales.push(candidate);
            }
        }
    }

    if !locales.is_empty() && !locales.iter().any(|l| l == "en") {
        locales.push("en".to_string());
    }
    locales
}

fn normalize_locale_token(token: &str) -> Option<String> {
    let stripped = token
        .split(|c| matches!(c, '.' | '@'))
        .next()
        .unwrap_or(token)
        .trim();

    if stripped.is_empty() || stripped == "C" || stripped == "POSIX" {
        return None;
    }

    let mut parts = stripped.split(['_', '-']);
    let language = parts.next()?.to_ascii_lowercase();
    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some(match parts.next() {
        Some(region) if !region.is_empty() => {
            format!("{}-{}", language, region.to_ascii_uppercase())
        }
        _ => language,
    })
}

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("hu", "Hungarian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("zh", "Chinese"),
];

const REGION_NAMES: &[(&str, &str)] = &[
    ("AR", "Argentina"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CN", "China"),
    ("DE", "Germany"),
    ("ES", "Spain"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("MX", "Mexico"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RU", "Russia"),
    ("TW", "Taiwan"),
    ("US", "United States"),
];

/// Human readable name for a language tag, e.g. `de_DE` -> `German (Germany)`.
///
/// Unknown tags are returned unchanged.
pub fn language_display_name(tag: &str) -> String {
    let normalized = tag.replace('_', "-");
    let mut parts = normalized.split('-');
    let language = parts.next().unwrap_or_default().to_ascii_lowercase();

    let Some((_, name)) = LANGUAGE_NAMES.iter().find(|(code, _)| *code == language) else {
        return tag.to_string();
    };

    match parts.next() {
        None => name.to_string(),
        Some(region) => match REGION_NAMES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(region))
        {
            Some((_, region_name)) => format!("{} ({})", name, region_name),
            None => format!("{} ({})", name, region.to_ascii_uppercase()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_prefix_picks_regional_variant() {
        let lang = resolve_install_language(&["en-US", "de-DE"], &["de"]);
        assert_eq!(lang.as_deref(), Some("de-DE"));
    }

    #[test]
    fn test_no_match_falls_back_to_first_available() {
        let lang = resolve_install_language(&["fr-FR"], &["de", "en"]);
        assert_eq!(lang.as_deref(), Some("fr-FR"));
    }

    #[test]
    fn test_empty_available_yields_none() {
        let available: [&str; 0] = [];
        assert_eq!(resolve_install_language(&available, &["en"]), None);
    }

    #[test]
    fn test_first_available_match_wins() {
        let lang = resolve_install_language(&["pt-PT", "pt-BR", "en"], &["pt"]);
        assert_eq!(lang.as_deref(), Some("pt-PT"));
    }

    #[test]
    fn test_earlier_preference_beats_available_order() {
        let lang = resolve_install_language(&["en", "de"], &["de", "en"]);
        assert_eq!(lang.as_deref(), Some("de"));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let lang = resolve_install_language(&["EN", "fr"], &["en", "fr"]);
        assert_eq!(lang.as_deref(), Some("fr"));
    }

    #[test]
    fn test_result_is_always_available() {
        let available = ["ja", "ko-KR", "zh-Hans"];
        let preferences: [&[&str]; 5] = [
            &[],
            &["de"],
            &["zh"],
            &["ko-KR", "ja"],
            &["", "x"],
        ];

        for preferred in preferences {
            let lang = resolve_install_language(&available, preferred).unwrap();
            assert!(available.contains(&lang.as_str()), "{} not available", lang);
        }
    }

    #[test]
    fn test_env_value_expansion() {
        assert_eq!(
            locales_from_env_value("de_DE.UTF-8"),
            vec!["de-DE", "de", "en"]
        );
        assert_eq!(
            locales_from_env_value("pt_BR:fr:en_GB"),
            vec!["pt-BR", "pt", "fr", "en-GB", "en"]
        );
        assert!(locales_from_env_value("C.UTF-8").is_empty());
        assert!(locales_from_env_value("").is_empty());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(language_display_name("de_DE"), "German (Germany)");
        assert_eq!(language_display_name("en-US"), "English (United States)");
        assert_eq!(language_display_name("fr"), "French");
        assert_eq!(language_display_name("es-XY"), "Spanish (XY)");
    }

    #[test]
    fn test_unknown_display_name_falls_back_to_tag() {
        assert_eq!(language_display_name("tlh"), "tlh");
        assert_eq!(language_display_name(""), "");
    }
}
