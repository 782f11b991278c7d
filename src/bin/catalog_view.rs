use clap::Parser;
use tracing::info;

use northwind_catalog::app_system::setup_tracing;
use northwind_catalog::view::CatalogView;

#[derive(Debug, Parser)]
#[command(name = "catalog_view", about = "Show the Northwind product list.")]
struct Args {
    /// Base URL of the catalog API
    #[arg(long, default_value = "http://localhost:5161")]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing("warn");

    let mut view = CatalogView::default();
    print!("{view}");

    let client = reqwest::Client::new();
    view.load(&client, &args.url).await;
    if let CatalogView::Loaded(products) = &view {
        info!(count = products.len(), "Products loaded");
        print!("{view}");
    }
    Ok(())
}
