pub mod types;
pub mod loader;
pub mod validator;
pub mod templates;

pub use types::{
    BodyEncoding, Config, DiffViewerConfig, PostProcessConfig, QueryConfig, Request, MODE_DISABLED,
    MODE_XML,
};
pub use loader::{ConfigLoader, DefaultConfigLoader};
pub use templates::{ensure_config_file_exists, generate_default_config_template};
