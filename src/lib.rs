// Library root
// -----------
// The binary (`main.rs`) wires these modules into the interactive client.
//
// Module responsibilities:
// - `config`: Loads `ApiSettings` from a file and the environment and
//   refuses to continue when a required value is missing.
// - `api`: HTTP interactions with the backend (auth, RLE encode) and the
//   authenticated `Session`.
// - `ui`: The numbered console menu and the login-then-menu flow.
// - `error`: Error types for each stage.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

pub use api::{ApiClient, Session};
pub use config::ApiSettings;
pub use error::{AuthError, ClientError, ConfigError, EncodeError};
