use clap::{Parser, Subcommand};
use herb_core::{
    load_catalog, load_remedy_records, match_remedies, resolve_dataset_dir, CatalogKind,
    SymptomQuery,
};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "herb")]
#[command(about = "Herbal remedy and storefront dataset CLI")]
struct Cli {
    /// Dataset directory override (defaults to searching for datasets/)
    #[arg(long)]
    dataset_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match symptoms against the remedy dataset
    Match {
        /// Symptom phrases (comma-separated)
        symptoms: String,
    },
    /// List all remedy records
    Remedies,
    /// List a product catalog
    Catalog {
        /// Catalog kind: plants or products
        kind: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dataset_dir = resolve_dataset_dir(cli.dataset_dir)?;

    match cli.command {
        Some(Commands::Match { symptoms }) => {
            let phrases: Vec<String> = symptoms
                .split(',')
                .map(|s| s.trim().to_string())
                .collect();
            let query = SymptomQuery::new(&phrases)?;
            let records =
                load_remedy_records(&dataset_dir.join(herb_core::config::REMEDY_DATASET_FILE))?;
            let results = match_remedies(&records, &query);
            if results.is_empty() {
                println!("No remedies matched.");
            } else {
                for result in results {
                    println!(
                        "{} ({}%): {} - {} | Dosage: {}",
                        result.record.disease_label,
                        result.match_percentage,
                        result.record.herbal_plant,
                        result.record.preparation_method,
                        result.record.dosage
                    );
                }
            }
        }
        Some(Commands::Remedies) => {
            let records =
                load_remedy_records(&dataset_dir.join(herb_core::config::REMEDY_DATASET_FILE))?;
            for record in records {
                println!(
                    "ID: {}, Disease: {}, Plant: {}",
                    record.id, record.disease_label, record.herbal_plant
                );
            }
        }
        Some(Commands::Catalog { kind }) => {
            let kind = CatalogKind::from_str(&kind)?;
            let file = match kind {
                CatalogKind::Plants => herb_core::config::PLANT_CATALOG_FILE,
                CatalogKind::Products => herb_core::config::PRODUCT_CATALOG_FILE,
            };
            let catalog = load_catalog(&dataset_dir.join(file), kind)?;
            for product in catalog.products() {
                println!(
                    "ID: {}, Name: {}, Price: {}, Stock: {}",
                    product.id,
                    product.name,
                    product.price.round_dp(2),
                    product.stock
                );
            }
        }
        None => {
            println!("Use 'herb --help' for commands");
        }
    }

    Ok(())
}
