use smol_str::SmolStr;

/// The category a dialect assigns to a completable keyword.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum_macros::IntoStaticStr,
    strum_macros::EnumString,
    Hash,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "snake_case")]
pub enum KeywordKind {
    Keyword,
    Function,
    Type,
    Other,
}

/// How a dialect stores unquoted identifiers.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Default,
    strum_macros::IntoStaticStr,
    strum_macros::EnumString,
    Hash,
)]
#[strum(serialize_all = "snake_case")]
pub enum LetterCase {
    Upper,
    Lower,
    /// Stored exactly as written.
    #[default]
    Mixed,
}

impl LetterCase {
    pub fn apply(&self, s: &str) -> SmolStr {
        match self {
            LetterCase::Upper => SmolStr::new(s.to_uppercase()),
            LetterCase::Lower => SmolStr::new(s.to_lowercase()),
            LetterCase::Mixed => SmolStr::new(s),
        }
    }
}
