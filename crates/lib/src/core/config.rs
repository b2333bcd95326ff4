use std::str::FromStr;

use ahash::AHashMap;

/// Case applied to inserted keywords on top of the syntax manager's policy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum InsertCase {
    #[default]
    Upper,
    Lower,
    AsTyped,
}

/// Whether table proposals get a generated alias appended, and how.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum AliasMode {
    #[default]
    None,
    Plain,
    /// With the `AS` keyword.
    Extended,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub insert_case: InsertCase,
    pub use_fq_names: bool,
    pub use_short_names: bool,
    pub sort_alphabetically: bool,
    /// Substring (fuzzy) search instead of prefix search.
    pub search_inside_names: bool,
    pub search_globally: bool,
    pub search_procedures: bool,
    pub show_values: bool,
    pub hide_duplicates: bool,
    /// Disables expensive lookups and scoring.
    pub simple_mode: bool,
    pub alias_mode: AliasMode,
    pub experimental_reference_analyzer: bool,
    pub hippie_enabled: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        CompletionConfig {
            insert_case: InsertCase::Upper,
            use_fq_names: false,
            use_short_names: false,
            sort_alphabetically: false,
            search_inside_names: false,
            search_globally: false,
            search_procedures: false,
            show_values: true,
            hide_duplicates: false,
            simple_mode: false,
            alias_mode: AliasMode::None,
            experimental_reference_analyzer: false,
            hippie_enabled: false,
        }
    }
}

impl CompletionConfig {
    /// Builds a config from the flat string-keyed record the host passes in.
    /// Unknown keys and unparsable values are ignored.
    pub fn from_map(map: &AHashMap<String, String>) -> Self {
        let mut config = CompletionConfig::default();

        for (key, value) in map {
            match key.as_str() {
                "insert-case" => {
                    if let Ok(case) = InsertCase::from_str(value) {
                        config.insert_case = case;
                    }
                }
                "alias-insert-mode" => {
                    if let Ok(mode) = AliasMode::from_str(value) {
                        config.alias_mode = mode;
                    }
                }
                "use-fq-names" => set_bool(&mut config.use_fq_names, value),
                "use-short-names" => set_bool(&mut config.use_short_names, value),
                "sort-alphabetically" => set_bool(&mut config.sort_alphabetically, value),
                "search-inside-names" => set_bool(&mut config.search_inside_names, value),
                "search-globally" => set_bool(&mut config.search_globally, value),
                "search-procedures" => set_bool(&mut config.search_procedures, value),
                "show-values" => set_bool(&mut config.show_values, value),
                "hide-duplicates" => set_bool(&mut config.hide_duplicates, value),
                "simple-mode" => set_bool(&mut config.simple_mode, value),
                "experimental-reference-analyzer" => {
                    set_bool(&mut config.experimental_reference_analyzer, value)
                }
                "hippie-enabled" => set_bool(&mut config.hippie_enabled, value),
                _ => {}
            }
        }

        config
    }
}

fn set_bool(target: &mut bool, value: &str) {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => *target = true,
        "false" | "0" | "no" | "off" => *target = false,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_map_parses_known_keys_and_ignores_the_rest() {
        let map: AHashMap<String, String> = [
            ("insert-case", "as-typed"),
            ("alias-insert-mode", "extended"),
            ("search-inside-names", "true"),
            ("show-values", "off"),
            ("no-such-key", "whatever"),
            ("simple-mode", "not-a-bool"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = CompletionConfig::from_map(&map);
        assert_eq!(config.insert_case, InsertCase::AsTyped);
        assert_eq!(config.alias_mode, AliasMode::Extended);
        assert!(config.search_inside_names);
        assert!(!config.show_values);
        assert!(!config.simple_mode);
    }
}
