//! Client for the toutsurmoneau.fr water consumption portal.
//!
//! The portal has no public API. This crate logs in through its HTML login
//! form, keeps the `eZSESSID` session cookie and reads the JSON series the
//! consumption charts are drawn from, so callers such as home-automation
//! integrations only see plain figures in liters.
//!
//! # Example
//!
//! ```no_run
//! use suez_water_client::{PortalClient, PortalConfig};
//!
//! let config = PortalConfig::new("me@example.com", "secret", None);
//! let mut client = PortalClient::new(config)?;
//! if let Some(attributes) = client.update()? {
//!     println!("yesterday: {} L", client.state());
//!     println!("this year: {} L", attributes.this_year_over_all);
//! }
//! client.close_session();
//! # Ok::<(), suez_water_client::Error>(())
//! ```
//!
//! # Logging
//!
//! Every protocol step is reported through `tracing`; the library installs
//! no subscriber.

pub mod config;
pub mod error;
pub mod model;
pub mod portal;


pub use config::{load_portal_config, PortalConfig};
pub use error::{ConfigError, Error, ParseError, Result, TransportError};
pub use model::{Attributes, FetchStage};
pub use portal::PortalClient;
