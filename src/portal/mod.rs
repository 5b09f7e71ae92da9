mod client;
mod session;

pub mod consumption;
pub mod helper;
pub mod scrape;

pub use client::{
    PortalClient, DAY_DATA_PATH, HISTORY_PAGE_PATH, LOGIN_PATH, MONTH_DATA_PATH, SESSION_COOKIE,
};
pub use session::{HttpSession, PortalResponse};
