use squill_helpers::Config;
use squill_lib_core::dialects::Dialect;
use squill_lib_core::dialects::init::DialectKind;
use squill_lib_core::dialects::syntax::LetterCase;

pub fn dialect() -> Dialect {
    super::ansi::raw_dialect().config(|postgres| {
        postgres.name = DialectKind::Postgres;
        postgres.set_stores_unquoted_case(LetterCase::Lower);
        postgres.set_supports_alias_in_update(true);

        postgres.add_keyword_to_set("reserved_keywords", "ILIKE");
        postgres.add_keyword_to_set("attribute_query_words", "ILIKE");
        postgres.add_keyword_to_set("value_trigger_words", "ILIKE");
        postgres
            .sets_mut("unreserved_keywords")
            .extend(["ANALYZE", "CONFLICT", "CONCURRENTLY", "EXTENSION", "VACUUM"]);
        postgres.sets_mut("functions").extend([
            "ARRAY_AGG",
            "GENERATE_SERIES",
            "JSONB_BUILD_OBJECT",
            "NOW",
            "STRING_AGG",
            "TO_CHAR",
        ]);
        postgres
            .sets_mut("type_keywords")
            .extend(["BYTEA", "JSON", "JSONB", "SERIAL", "UUID"]);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_folds_identifiers_to_lower() {
        let d = dialect();
        assert_eq!(d.storage_fold("Users"), "users");
        assert!(d.is_reserved_keyword("ilike"));
        assert!(d.supports_alias_in_update());
    }
}
