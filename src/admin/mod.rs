//! Admin product management client
//!
//! The logic behind the admin product list: an HTTP client for the admin API,
//! list/filter/selection state, search debouncing and the delete-all
//! confirmation. The `sawavo-admin` binary drives these from the terminal.

pub mod client;
pub mod confirm;
pub mod debounce;
pub mod list_state;

pub use client::{ApiClient, ClientError};
pub use confirm::{ConfirmationError, DeleteAllConfirmation};
pub use debounce::{SearchDebouncer, DEFAULT_DELAY};
pub use list_state::{main_image_url, ProductFilter, ProductListState, DEFAULT_PAGE_SIZE};
