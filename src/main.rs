//! # Invoicer CLI
//!
//! Usage:
//!   invoicer -o invoice.pdf
//!   invoicer --data invoice.json --logo ./logo.png -o out.pdf
//!   invoicer --example > invoice.json

use clap::Parser;
use invoicer::model::sample::{sample_invoice, sample_invoice_json};
use invoicer::{DocumentComposer, Invoice, InvoiceError, RenderConfig, StyleSheet};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "invoicer", version, about = "Render a PDF invoice")]
struct Args {
    /// Output PDF path [default: invoice.pdf]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Invoice JSON file. The built-in sample is used when omitted.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Banner image (PNG or JPEG). Overrides the config file.
    #[arg(short, long)]
    logo: Option<PathBuf>,

    /// Render configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stylesheet JSON file replacing the default theme
    #[arg(long)]
    styles: Option<PathBuf>,

    /// Print the sample invoice JSON and exit
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("invoicer=info"))
        .init();

    let args = Args::parse();

    if args.example {
        match sample_invoice_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("✗ {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    match run(args) {
        Ok((bytes, path)) => {
            eprintln!("✓ Written {} bytes to {}", bytes, path.display());
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<(u64, PathBuf), InvoiceError> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };
    if let Some(logo) = args.logo {
        config.logo = Some(logo);
    }

    let styles = match &args.styles {
        Some(path) => StyleSheet::from_file(path)?,
        None => StyleSheet::invoice_default(),
    };

    let invoice = match &args.data {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| InvoiceError::Io {
                path: path.clone(),
                source: e,
            })?;
            Invoice::from_json(&json)?
        }
        None => sample_invoice(),
    };
    log::info!(
        "rendering {} line item(s), total {}",
        invoice.line_items().len(),
        invoice.grand_total()
    );

    let output = args.output.unwrap_or_else(|| config.output_path());
    let composer = DocumentComposer::new(config, styles)?;
    composer.write_to_path(&invoice, &output)?;

    let bytes = std::fs::metadata(&output)
        .map(|m| m.len())
        .map_err(|e| InvoiceError::Io {
            path: output.clone(),
            source: e,
        })?;
    Ok((bytes, output))
}
