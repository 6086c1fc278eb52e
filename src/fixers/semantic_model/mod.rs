pub mod default_datasource_version;

pub use default_datasource_version::{
    fix_default_datasource_version, reconcile_data_source_version, Reconciliation,
    REQUIRED_DATA_SOURCE_VERSION,
};
