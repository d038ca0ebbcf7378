//! Privileged-account lookups against a credential vault REST API.
//!
//! A single operation, [`get_accounts`], retrieves account records through one
//! of three modes: lookup by ID, the paginated modern query API, or the legacy
//! keyword search. Responses from both API generations are normalised into
//! [`AccountRecord`] values tagged with the generation that produced them.

pub mod accounts;
pub mod config;
pub mod error;
pub mod format;
pub mod normalize;
pub mod paging;
pub mod query;
pub mod record;
pub mod session;
pub mod transport;
pub mod version;

pub use accounts::{AccountsOutcome, get_accounts};
pub use config::{SessionConfig, SessionConfigLayer};
pub use error::{Error, Result, Warning};
pub use query::{AccountQuery, LegacyQuery, ModernQuery, SearchType, SortSpec};
pub use record::{AccountRecord, RecordKind};
pub use session::Session;
pub use transport::{HttpTransport, Transport};
pub use version::ServerVersion;
