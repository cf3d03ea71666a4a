//! Pure extraction over raw markup. Nothing here touches the network; every
//! function degrades to an empty result when the expected markup is absent.

pub mod content;
pub mod listing;
pub mod menus;
pub mod pagination;
pub mod selectors;
pub mod themes;

pub use content::extract_content;
pub use listing::extract_stubs;
pub use menus::extract_menus;
pub use pagination::extract_next_page;
pub use selectors::Selectors;
pub use themes::extract_themes;
