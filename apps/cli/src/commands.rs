//! Command handlers. Each one prints its result to stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use facturador_core::tax::percent_from_rate;
use facturador_core::{LineItem, TaxConfigUpdate};
use facturador_engine::{AppContext, FacturadorConfig};

use crate::cli::{Command, ConfigCommand, SeriesCommand, TaxCommand};

/// Writes `config` to `path` (or the default location). Needs no database.
pub fn init_config(config: &FacturadorConfig, path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = path
        .or_else(FacturadorConfig::default_config_path)
        .context("no config directory available, pass --config")?;

    if target.exists() && !force {
        bail!("{} already exists, use --force to overwrite", target.display());
    }

    let written = config.save(Some(target)).context("writing configuration")?;
    println!("{}", written.display());
    Ok(())
}

pub async fn handle(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::NextNumber { document_type } => {
            let number = ctx
                .next_number(document_type)
                .await
                .with_context(|| format!("could not number {}", document_type.display_name()))?;
            println!("{number}");
        }
        Command::Check => {
            let ok = ctx.check_sequences().await;
            println!("{}", if ok { "sequences configured" } else { "no sequences" });
        }
        Command::Series(SeriesCommand::List) => {
            for (doc_type, state) in ctx.allocator().local_states().await? {
                println!(
                    "{:<14} {} {:<4} next {:06}  ({})",
                    doc_type.key(),
                    doc_type.sunat_code(),
                    state.series,
                    state.counter,
                    doc_type.display_name()
                );
            }
        }
        Command::Series(SeriesCommand::Set {
            document_type,
            series,
            counter,
        }) => {
            let state = ctx
                .allocator()
                .update_series(document_type, &series, counter)
                .await?;
            println!("{} -> {} next {:06}", document_type, state.series, state.counter);
        }
        Command::Tax(TaxCommand::Show) => {
            let config = ctx.tax().tax_config();
            println!(
                "{} {}%  currency {} ({})",
                config.igv_label,
                percent_from_rate(config.igv_rate),
                config.currency,
                config.currency_symbol
            );
        }
        Command::Tax(TaxCommand::SetIgv { percent }) => {
            let config = ctx
                .tax()
                .update_tax_config(TaxConfigUpdate::rate(percent / 100.0))
                .await?;
            println!("{} set to {}%", config.igv_label, percent_from_rate(config.igv_rate));
        }
        Command::Tax(TaxCommand::Compute { subtotal }) => {
            let tax = ctx.tax();
            println!("igv   {}", tax.calculate_igv(subtotal));
            println!("total {}", tax.calculate_total(subtotal));
        }
        Command::Totals(args) => print_totals(ctx, &args.lines),
        Command::Config(ConfigCommand::Init { .. }) => {
            bail!("config init runs before the context is built")
        }
    }
    Ok(())
}

fn print_totals(ctx: &AppContext, lines: &[LineItem]) {
    let tax = ctx.tax();
    let config = tax.tax_config();
    let totals = tax.document_totals(lines);
    let symbol = config.currency_symbol.as_str();

    println!("{:<8} {}", "Gravado", totals.subtotal.format_with(symbol));
    println!(
        "{:<8} {}",
        format!("{} {}%", config.igv_label, percent_from_rate(config.igv_rate)),
        totals.igv.format_with(symbol)
    );
    println!("{:<8} {}", "Total", totals.total.format_with(symbol));
}
