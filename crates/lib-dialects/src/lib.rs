use squill_lib_core::dialects::Dialect;
use squill_lib_core::dialects::init::DialectKind;

pub mod ansi;
mod ansi_keywords;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;

pub fn kind_to_dialect(kind: &DialectKind) -> Option<Dialect> {
    #[allow(unreachable_patterns)]
    Some(match kind {
        DialectKind::Ansi => ansi::dialect(),
        #[cfg(feature = "mysql")]
        DialectKind::Mysql => mysql::dialect(),
        #[cfg(feature = "postgres")]
        DialectKind::Postgres => postgres::dialect(),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_default_dialect_resolves() {
        for kind in DialectKind::iter() {
            assert!(kind_to_dialect(&kind).is_some(), "missing {kind:?}");
        }
    }
}
