//! Price history fetching, reshaping, export and read-back

pub mod export;
pub mod frame;
pub mod provider;
pub mod reader;
pub mod request;
pub mod synthetic;
pub mod yahoo;

pub use export::{delete_export, export_filename, export_history, ExportSummary};
pub use frame::{history_frame, reshape_for_export, EXPORT_COLUMNS, PROVIDER_COLUMNS};
pub use provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
pub use reader::{load_export, PriceHistory, PriceRow};
pub use request::{HistoryRequest, Period, Window};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
