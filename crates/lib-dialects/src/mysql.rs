use squill_helpers::Config;
use squill_lib_core::dialects::Dialect;
use squill_lib_core::dialects::init::DialectKind;
use squill_lib_core::dialects::syntax::LetterCase;

pub fn dialect() -> Dialect {
    super::ansi::raw_dialect().config(|mysql| {
        mysql.name = DialectKind::Mysql;
        mysql.set_identifier_quote_pairs(vec![("`", "`"), ("\"", "\"")]);
        mysql.set_stores_unquoted_case(LetterCase::Mixed);
        mysql.set_supports_alias_in_update(false);

        mysql
            .sets_mut("reserved_keywords")
            .extend(["DATABASES", "REGEXP", "RLIKE", "STRAIGHT_JOIN"]);
        mysql.add_keyword_to_set("value_trigger_words", "RLIKE");
        mysql
            .sets_mut("unreserved_keywords")
            .extend(["ENGINE", "CHARSET", "AUTO_INCREMENT"]);
        mysql.sets_mut("functions").extend([
            "DATE_FORMAT",
            "GROUP_CONCAT",
            "IFNULL",
            "LAST_INSERT_ID",
            "NOW",
        ]);
        mysql
            .sets_mut("type_keywords")
            .extend(["DATETIME", "ENUM", "LONGTEXT", "MEDIUMINT", "TINYINT"]);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_quotes_with_backticks_first() {
        let d = dialect();
        assert_eq!(d.quote("order"), "`order`");
        assert_eq!(d.unquote("`order`"), "order");
        assert_eq!(d.unquote("\"order\""), "order");
        assert!(!d.supports_alias_in_update());
    }
}
