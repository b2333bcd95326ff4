use squill_lib_core::dialects::Dialect;

/// Builds the `%`-wildcard mask handed to the structure assistant from
/// whatever the user typed, which may be dotted and may be quoted.
pub fn object_name_mask(prefix: &str, dialect: &Dialect, search_inside: bool) -> String {
    let separator = dialect.struct_separator();

    let core = if prefix.contains(separator) {
        if prefix.ends_with(separator) {
            String::new()
        } else {
            let last = prefix.rsplit(separator).next().unwrap_or_default();
            dialect.unquote(last).to_string()
        }
    } else {
        dialect.unquote(prefix).to_string()
    };

    if search_inside {
        if core.is_empty() {
            "%".to_string()
        } else {
            format!("%{core}%")
        }
    } else {
        format!("{core}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefix_mode_appends_a_wildcard() {
        let d = Dialect::new();
        assert_eq!(object_name_mask("us", &d, false), "us%");
        assert_eq!(object_name_mask("", &d, false), "%");
    }

    #[test]
    fn inside_mode_wraps_both_sides() {
        let d = Dialect::new();
        assert_eq!(object_name_mask("us", &d, true), "%us%");
        assert_eq!(object_name_mask("", &d, true), "%");
    }

    #[test]
    fn dotted_prefixes_keep_only_the_last_segment() {
        let d = Dialect::new();
        assert_eq!(object_name_mask("public.us", &d, false), "us%");
        assert_eq!(object_name_mask("public.", &d, false), "%");
        assert_eq!(object_name_mask("public.\"Us\"", &d, false), "Us%");
    }
}
