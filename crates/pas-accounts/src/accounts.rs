//! The accounts lookup operation.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result, Warning};
use crate::normalize::{legacy_record, modern_record, modern_records};
use crate::paging::{ModernPage, walk_pages};
use crate::query::{AccountQuery, encode_query};
use crate::record::AccountRecord;
use crate::session::Session;
use crate::version::{self, MINIMUM_MODERN_VERSION, SEARCH_TYPE_VERSION};

pub const ACCOUNTS_PATH: &str = "api/Accounts";
pub const LEGACY_ACCOUNTS_PATH: &str = "WebServices/PIMServices.svc/Accounts";

/// Records returned by [`get_accounts`] together with any non-fatal warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountsOutcome {
    pub records: Vec<AccountRecord>,
    pub warnings: Vec<Warning>,
}

/// Retrieves account records using the mode selected by `query`.
///
/// The modern query follows every continuation link before returning. The
/// legacy search returns at most one record and reports a warning when the
/// server matched more. `timeout` overrides the transport default for each
/// request of the call.
pub fn get_accounts(
    session: &Session,
    query: &AccountQuery,
    timeout: Option<Duration>,
) -> Result<AccountsOutcome> {
    query.validate()?;
    check_version(session, query)?;

    let url = request_url(session, query)?;
    tracing::debug!(mode = mode_name(query), %url, "fetching accounts");
    let body = session.transport().get_json(&url, timeout)?;

    let outcome = match query {
        AccountQuery::ById(_) => AccountsOutcome {
            records: body.map(modern_record).transpose()?.into_iter().collect(),
            warnings: Vec::new(),
        },
        AccountQuery::Modern(_) => {
            let records = match body {
                Some(body) => {
                    let first = ModernPage::from_value(body)?;
                    modern_records(walk_pages(session, first, timeout)?)?
                }
                None => Vec::new(),
            };
            AccountsOutcome {
                records,
                warnings: Vec::new(),
            }
        }
        AccountQuery::Legacy(_) => {
            let legacy = legacy_record(body)?;
            AccountsOutcome {
                records: legacy.record.into_iter().collect(),
                warnings: legacy.warning.into_iter().collect(),
            }
        }
    };
    tracing::debug!(records = outcome.records.len(), "accounts fetched");
    Ok(outcome)
}

fn check_version(session: &Session, query: &AccountQuery) -> Result<()> {
    match query {
        AccountQuery::ById(_) => {
            version::require(session.server_version(), &MINIMUM_MODERN_VERSION)
        }
        AccountQuery::Modern(modern) => {
            version::require(session.server_version(), &MINIMUM_MODERN_VERSION)?;
            if modern.search_type.is_some() {
                version::require(session.server_version(), &SEARCH_TYPE_VERSION)?;
            }
            Ok(())
        }
        AccountQuery::Legacy(_) => Ok(()),
    }
}

/// Builds the first request URL for `query`.
pub fn request_url(session: &Session, query: &AccountQuery) -> Result<Url> {
    let mut url = match query {
        AccountQuery::ById(id) => {
            let mut url = session.endpoint(ACCOUNTS_PATH)?;
            url.path_segments_mut()
                .map_err(|_| {
                    Error::InvalidUrl(format!("{} cannot take path segments", session.base_uri()))
                })?
                .push(id.trim());
            url
        }
        AccountQuery::Modern(_) => session.endpoint(ACCOUNTS_PATH)?,
        AccountQuery::Legacy(_) => session.endpoint(LEGACY_ACCOUNTS_PATH)?,
    };
    let query_string = encode_query(&query.query_pairs());
    if !query_string.is_empty() {
        url.set_query(Some(&query_string));
    }
    Ok(url)
}

fn mode_name(query: &AccountQuery) -> &'static str {
    match query {
        AccountQuery::ById(_) => "by-id",
        AccountQuery::Modern(_) => "modern",
        AccountQuery::Legacy(_) => "legacy",
    }
}
