pub mod client;
pub mod errors;
pub mod resolve;
pub mod types;

pub use client::{FabricClient, FabricOps};
pub use errors::FabricError;
pub use resolve::{find_report, resolve_workspace};
pub use types::{
    Dataset, DefinitionPart, EmbedToken, ItemDefinition, Report, ReportFormat, Workspace,
};
