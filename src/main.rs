//! # Recibo CLI
//!
//! Command-line companion to the printing library, for bench-testing
//! printers and exporting labels without a running POS client.
//!
//! ## Usage
//!
//! ```bash
//! # Export a 38x18mm category label as PNG
//! recibo label CF-98765 --title "Coffee Beans" --scale 10
//!
//! # Ask the backend whether a printer answers at an interface address
//! recibo probe tcp://192.168.1.87:9100
//!
//! # Print a demo receipt to the first USB printer
//! recibo receipt
//!
//! # Write the demo receipt's ESC/POS bytes to a file instead
//! recibo receipt --out receipt.bin
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recibo::{
    dispatch::{Dispatcher, Environment},
    document::{
        BarcodeLabel, BarcodeSpec, Footer, Header, LineItem, Meta, Payment, ReceiptDocument,
        Totals,
    },
    settings::Settings,
};

/// Recibo - receipt and label printing utility
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend printer endpoint for network probes
    #[arg(long, default_value = "http://localhost:4100/printer/check")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a barcode label as PNG
    Label {
        /// Value to encode (printable ASCII)
        value: String,

        /// Title line above the barcode
        #[arg(long)]
        title: Option<String>,

        /// Subtitle line under the title
        #[arg(long)]
        subtitle: Option<String>,

        /// Label stock size
        #[arg(long, default_value = "38x18", value_parser = ["38x18", "40x25"])]
        stock: String,

        /// Export resolution multiplier
        #[arg(long, default_value = "10.0")]
        scale: f32,

        /// Output file (defaults to the conventional label filename)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Probe a network printer through the backend
    Probe {
        /// Printer interface address (TCP socket spec or USB device path)
        interface: String,

        /// Persist the address on success
        #[arg(long)]
        save: bool,
    },

    /// Print a demo receipt
    Receipt {
        /// Write ESC/POS bytes to a file instead of a USB printer
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Lay out the kitchen-ticket variant instead of the invoice
        #[arg(long)]
        kot: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Label {
            value,
            title,
            subtitle,
            stock,
            scale,
            out,
        } => {
            let mut label = match stock.as_str() {
                "40x25" => BarcodeLabel::mm40x25(BarcodeSpec::new(&value)),
                _ => BarcodeLabel::mm38x18(BarcodeSpec::new(&value)),
            };
            if let Some(title) = title {
                label = label.title(title);
            }
            if let Some(subtitle) = subtitle {
                label = label.subtitle(subtitle);
            }

            let dispatcher = Dispatcher::new(Environment::default(), cli.endpoint);
            let export = dispatcher.export_label(&label, scale).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(&export.filename));
            std::fs::write(&path, &export.png)?;
            println!("Wrote {}", path.display());
        }

        Commands::Probe { interface, save } => {
            let dispatcher = Dispatcher::new(Environment::default(), cli.endpoint);
            let verdict = dispatcher.probe(&interface).await?;
            if verdict.connected {
                println!("Printer at {} is reachable", interface);
                if save {
                    let settings = Settings {
                        printer_interface: Some(interface),
                    };
                    settings.save()?;
                    println!("Saved printer interface");
                }
            } else {
                println!(
                    "Printer at {} is NOT reachable{}",
                    interface,
                    verdict
                        .error
                        .map(|e| format!(": {}", e))
                        .unwrap_or_default()
                );
                std::process::exit(1);
            }
        }

        Commands::Receipt { out, kot } => {
            let doc = demo_receipt();
            match out {
                Some(path) => {
                    let profile = recibo::PrinterProfile::default();
                    let instructions = if kot {
                        recibo::layout::layout_kitchen_ticket(&doc, profile.columns)
                    } else {
                        recibo::layout::layout_receipt(&doc, profile.columns)
                    };
                    let bytes = recibo::encoder::encode(&instructions, &profile);
                    std::fs::write(&path, &bytes)?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => {
                    let dispatcher = Dispatcher::new(
                        Environment {
                            host_shell: false,
                            usb_available: true,
                        },
                        cli.endpoint,
                    );
                    if kot {
                        dispatcher.print_kitchen_ticket(&doc).await?;
                    } else {
                        dispatcher.print_receipt(&doc).await?;
                    }
                    println!("Receipt sent");
                }
            }
        }
    }

    Ok(())
}

/// A receipt exercising every layout section.
fn demo_receipt() -> ReceiptDocument {
    ReceiptDocument {
        header: Header {
            title: "RECIBO CAFE".into(),
            address_lines: vec!["12 Market Lane".into(), "Tel: 555-0142".into()],
        },
        meta: Meta {
            invoice_number: "INV-1042".into(),
            timestamp: "2026-08-26 14:05".into(),
            customer_name: "Walk-in".into(),
            guest_count: Some(2),
            phone: None,
        },
        items: vec![
            LineItem {
                quantity: 2,
                description: "Flat White".into(),
                modifiers: vec!["Oat Milk +0.60".into()],
                line_total: "9.60".into(),
            },
            LineItem {
                quantity: 1,
                description: "Chicken Burger".into(),
                modifiers: vec!["Extra Cheese +2.00".into()],
                line_total: "24.00".into(),
            },
        ],
        totals: Totals {
            subtotal: "33.60".into(),
            discount: "0.00".into(),
            service_fee: "0.00".into(),
            tax: "0.00".into(),
            grand_total: "33.60".into(),
        },
        payment: Payment {
            method: "Card".into(),
            status: "PAID".into(),
            paid_amount: "33.60".into(),
        },
        footer: Footer {
            lines: vec!["Thank you!".into(), "See you soon".into()],
        },
    }
}
