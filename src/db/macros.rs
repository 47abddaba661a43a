//! Database dispatch macro.
//!
//! Generates the `match` over `DbPool` variants so each call site reads as a
//! flat list of per-backend expressions.

/// Macro for generating database dispatch match arms.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(pool, {
///     Remote(db) => remote::fetch_rows(db, sql, params).await,
///     SQLite(p) => sqlite::fetch_rows(p, sql, params).await,
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, { $($variant:ident($p:ident) => $body:expr),+ $(,)? }) => {
        match $pool {
            $(
                $crate::db::pool::DbPool::$variant($p) => $body,
            )+
        }
    };
}
