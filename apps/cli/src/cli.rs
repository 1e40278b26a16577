//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use facturador_core::{DocumentType, LineItem};

#[derive(Debug, Parser)]
#[command(name = "facturador", version, about = "Document numbering and IGV for SUNAT e-invoicing")]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Company to act for, overriding the configured one.
    #[arg(long, global = true)]
    pub company: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Allocate the next number for a document type.
    NextNumber {
        /// facturas, boletas, notasCredito, notasDebito or guiasRemision.
        #[arg(value_parser = parse_document_type)]
        document_type: DocumentType,
    },

    /// Ask the sequence service whether the company has sequences.
    Check,

    /// Show or change local series.
    #[command(subcommand)]
    Series(SeriesCommand),

    /// Show or change the tax configuration.
    #[command(subcommand)]
    Tax(TaxCommand),

    /// Compute document totals for line items.
    Totals(TotalsArgs),

    /// Manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write the effective configuration to the config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum SeriesCommand {
    /// List the local series and next fallback number of every type.
    List,

    /// Overwrite the local series and counter of one type.
    Set {
        #[arg(value_parser = parse_document_type)]
        document_type: DocumentType,
        series: String,
        counter: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaxCommand {
    /// Print the current tax configuration.
    Show,

    /// Set IGV as a percentage (18 = 18%).
    SetIgv { percent: f64 },

    /// IGV and total for a subtotal, unrounded.
    Compute { subtotal: f64 },
}

#[derive(Debug, Args)]
pub struct TotalsArgs {
    /// Line as QUANTITY:UNIT_PRICE[:DESCRIPTION]; repeatable.
    #[arg(long = "line", value_parser = parse_line, required = true)]
    pub lines: Vec<LineItem>,
}

fn parse_document_type(s: &str) -> Result<DocumentType, String> {
    s.parse().map_err(|e: facturador_core::CoreError| e.to_string())
}

fn parse_line(s: &str) -> Result<LineItem, String> {
    let mut parts = s.splitn(3, ':');
    let quantity = parts
        .next()
        .and_then(|q| q.trim().parse::<f64>().ok())
        .ok_or_else(|| format!("invalid quantity in '{s}'"))?;
    let unit_price = parts
        .next()
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(|| format!("invalid unit price in '{s}'"))?;
    let description = parts.next().unwrap_or_default();

    Ok(LineItem::new(description, quantity, unit_price))
}
