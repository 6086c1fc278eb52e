use std::future::Future;
use std::io::Write;

use anyhow::Result;

use crate::config::FixerConfig;
use crate::fabric::FabricClient;

pub mod datasource_version;
pub mod init_config;
pub mod upgrade;

#[allow(async_fn_in_trait)]
pub trait Command {
    /// Runs the fixer. `Ok(false)` means the fixer reported a failure on stdout.
    async fn execute(&self) -> Result<bool>;
}

pub async fn with_fabric_client<F, Fut, R>(config: &FixerConfig, f: F) -> Result<R>
where
    F: FnOnce(FabricClient) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    print!("🔄 Connecting to Fabric... ");
    std::io::stdout().flush()?;

    match FabricClient::from_config(config) {
        Ok(client) => {
            println!("✅");
            f(client).await
        }
        Err(e) => {
            println!("❌ {e}");
            Err(e.into())
        }
    }
}

pub async fn show_how_to_use() -> Result<()> {
    println!("🛠️  pbi-fixer - Power BI / Fabric fixers");
    println!();
    println!("Report fixers:");
    println!("  📄 pbi-fixer upgrade-to-pbir <REPORT> -w <WORKSPACE>              # PBIRLegacy -> PBIR");
    println!("  📄 pbi-fixer upgrade-to-pbir <REPORT> -w <WORKSPACE> --via embed  # upgrade through an embedded save");
    println!();
    println!("Semantic model fixers:");
    println!("  🧮 pbi-fixer default-datasource-version <REPORT> -w <WORKSPACE>   # set PowerBI_V3");
    println!();
    println!("Setup:");
    println!("  ⚙️  pbi-fixer init-config                                          # write pbi-fixer.toml");
    println!();
    println!("Authentication:");
    println!("  🔑 export PBI_FIXER_ACCESS_TOKEN=<bearer token>   (or FABRIC_ACCESS_TOKEN)");
    println!();
    println!("💡 Add --scan-only to any fixer to see what it would change first.");
    Ok(())
}
