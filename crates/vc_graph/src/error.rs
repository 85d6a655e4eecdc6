use thiserror::Error;

// -----------------------------------------------------------------------------
// GraphError

/// Unrecoverable errors.
///
/// These describe schema-authoring defects, not bad data: a type that
/// declares a previous version without providing the step that upgrades it,
/// or a migration step registered with the wrong shapes. Problems caused by
/// the data itself are reported through [`Outcome`](crate::Outcome) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("`{ty}` declares `{from}` as a previous version but has no migration step for it")]
    MissingMigration {
        ty: &'static str,
        from: &'static str,
    },

    #[error("migration step of `{ty}` expected `{expect}`, found `{actual}`")]
    MigrationMismatch {
        ty: &'static str,
        expect: &'static str,
        actual: &'static str,
    },

    #[error("`{ty}` forwards to `{target}` but the target could not be resolved")]
    ForwardTarget {
        ty: &'static str,
        target: &'static str,
    },

    #[error("cannot construct an instance of `{0}`")]
    CannotConstruct(&'static str),
}
