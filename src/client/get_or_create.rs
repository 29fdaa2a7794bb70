use crate::error::SqlHelperDbError;
use crate::results::CustomDbRow;
use crate::types::RowValues;

use super::DbClient;

/// Fetch the row keyed by `params[0]` or insert it with all of `params`, tolerating a
/// concurrent writer inserting the same key first.
///
/// The select is always bound to `params[0]` alone; the insert receives the full list. The
/// steps run at most once each:
///
/// 1. fetch; a hit is returned, a failure other than [`SqlHelperDbError::NoRows`] is returned
///    verbatim
/// 2. insert; success or a duplicate key (per [`DbClient::is_duplicate_key`]) moves on, any
///    other failure is returned verbatim. On clients that report no insert identity
///    ([`DbClient::reports_insert_id`]) the resulting `IdentityRetrieval` counts as success
/// 3. fetch again and return whatever that yields
///
/// A row inserted and deleted by someone else between steps 2 and 3 surfaces as `NoRows`.
///
/// # Errors
/// [`SqlHelperDbError::NoArguments`] for an empty `params`, otherwise the failing step's
/// error.
pub async fn get_or_create<C>(
    client: &C,
    select_query: &str,
    insert_query: &str,
    params: &[RowValues],
) -> Result<CustomDbRow, SqlHelperDbError>
where
    C: DbClient + ?Sized,
{
    let Some(key) = params.get(..1) else {
        return Err(SqlHelperDbError::NoArguments);
    };

    match client.get(select_query, key).await {
        Ok(row) => return Ok(row),
        Err(e) if e.is_no_rows() => {}
        Err(e) => return Err(e),
    }

    match client.insert(insert_query, params).await {
        Ok(_) => {}
        // the row was written; this driver never hands back an id
        Err(e)
            if !client.reports_insert_id()
                && matches!(e.root(), SqlHelperDbError::IdentityRetrieval(_)) => {}
        Err(e) if client.is_duplicate_key(&e) => {
            tracing::debug!(error = %e, "get_or_create lost the insert race; refetching");
        }
        Err(e) => return Err(e),
    }

    client.get(select_query, key).await
}
