// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod health;
mod metrics;
mod root;
mod shared_types;
mod sites;
mod tabs;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// Site and session handlers
pub use sites::{create_site, login, session_info};

// Tab handlers
pub use tabs::{create_tab, delete_tab, list_tabs, rename_tab, save_tab_content};
