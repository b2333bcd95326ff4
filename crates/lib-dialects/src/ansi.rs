use squill_lib_core::dialects::Dialect;

use super::ansi_keywords::{
    ANSI_FUNCTIONS, ANSI_RESERVED_KEYWORDS, ANSI_TYPE_KEYWORDS, ANSI_UNRESERVED_KEYWORDS,
};

pub fn dialect() -> Dialect {
    raw_dialect()
}

pub fn raw_dialect() -> Dialect {
    let mut ansi_dialect = Dialect::new();

    ansi_dialect
        .update_keywords_set_from_multiline_string("reserved_keywords", ANSI_RESERVED_KEYWORDS);
    ansi_dialect.update_keywords_set_from_multiline_string(
        "unreserved_keywords",
        ANSI_UNRESERVED_KEYWORDS,
    );
    ansi_dialect.update_keywords_set_from_multiline_string("type_keywords", ANSI_TYPE_KEYWORDS);
    ansi_dialect.update_keywords_set_from_multiline_string("functions", ANSI_FUNCTIONS);

    // Keywords that introduce an entity reference (tables, views).
    ansi_dialect.sets_mut("entity_query_words").extend([
        "FROM", "UPDATE", "TABLE", "INTO", "DELETE", "INSERT", "JOIN", "VIEW", "TRUNCATE",
    ]);

    // Keywords whose right-hand side is an attribute expression.
    ansi_dialect.sets_mut("attribute_query_words").extend([
        "SELECT", "WHERE", "SET", "ON", "BY", "HAVING", "AND", "OR", "DISTINCT", "LIKE",
    ]);

    ansi_dialect
        .sets_mut("exec_query_words")
        .extend(["CALL", "EXEC", "EXECUTE"]);

    ansi_dialect.sets_mut("query_leads").extend(["SELECT", "WITH"]);
    ansi_dialect
        .sets_mut("dml_leads")
        .extend(["INSERT", "UPDATE", "DELETE", "MERGE"]);
    ansi_dialect
        .sets_mut("ddl_leads")
        .extend(["CREATE", "ALTER", "DROP", "TRUNCATE"]);
    ansi_dialect
        .sets_mut("execute_leads")
        .extend(["CALL", "EXEC", "EXECUTE"]);

    // Operators that put the cursor in a value position.
    ansi_dialect.sets_mut("value_trigger_words").extend(["LIKE"]);

    ansi_dialect
}

#[cfg(test)]
mod tests {
    use super::*;
    use squill_lib_core::dialects::syntax::KeywordKind;

    #[test]
    fn classifies_context_words() {
        let d = dialect();
        assert!(d.is_entity_query_word("from"));
        assert!(d.is_entity_query_word("JOIN"));
        assert!(d.is_attribute_query_word("where"));
        assert!(d.is_exec_query_word("call"));
        assert!(!d.is_entity_query_word("select"));
    }

    #[test]
    fn keyword_kinds_are_split_by_set() {
        let d = dialect();
        assert_eq!(d.keyword_kind("SELECT"), Some(KeywordKind::Keyword));
        assert_eq!(d.keyword_kind("count"), Some(KeywordKind::Function));
        assert_eq!(d.keyword_kind("varchar"), Some(KeywordKind::Type));
        assert_eq!(d.keyword_kind("procedure"), Some(KeywordKind::Other));
    }

    #[test]
    fn routine_leads_are_not_reserved() {
        // PROCEDURE and FUNCTION must stay out of the reserved set so the
        // word detector leaves them in prev_words for routine declarations.
        let d = dialect();
        assert!(!d.is_reserved_keyword("PROCEDURE"));
        assert!(!d.is_reserved_keyword("FUNCTION"));
    }
}
