use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use dashboard_core::{
    DashboardController, DashboardEvent, HttpInventoryGateway, Notice, Severity,
    SummaryProvenance, ViewState,
};
use shared::domain::{SortDirection, SortSpec};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

mod config;
mod file_input;

use config::{load_settings, load_settings_from};
use file_input::PathFileInput;

#[derive(Parser, Debug)]
#[command(about = "Inventory dashboard client")]
struct Cli {
    /// Base URL of the inventory API, e.g. http://localhost:8080/api
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the first page and the summary panel.
    Show,
    Page {
        index: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    Sort {
        field: String,
        #[arg(long, default_value = "asc")]
        dir: SortDirection,
    },
    /// Import an .xlsx/.xls spreadsheet, then refresh.
    Upload { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    if let Some(size) = cli.page_size.filter(|size| *size > 0) {
        settings.page_size = size;
    }

    let gateway = Arc::new(HttpInventoryGateway::new(settings.api_base_url.clone()));
    let controller = DashboardController::new(gateway, settings.dashboard_options());
    let mut events = controller.subscribe_events();
    controller.initialize().await;

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {}
        Command::Page { index, size } => {
            let size = match size {
                Some(size) => size,
                None => controller.view_state().await.page_size,
            };
            controller.change_page(index, size).await?;
        }
        Command::Sort { field, dir } => {
            controller.change_sort(SortSpec::new(field, dir)).await;
        }
        Command::Upload { path } => {
            let mut input = PathFileInput::open(&path).await?;
            controller.upload_selected(&mut input).await?;
        }
    }

    print_notices(&mut events);
    print_view(&controller.view_state().await);
    Ok(())
}

fn print_notices(events: &mut broadcast::Receiver<DashboardEvent>) {
    while let Ok(event) = events.try_recv() {
        let notice = match event {
            DashboardEvent::Notice(notice) => notice,
            DashboardEvent::UploadFinished(outcome) => outcome.notice(),
            _ => continue,
        };
        print_notice(&notice);
    }
}

fn print_notice(notice: &Notice) {
    let label = match notice.severity {
        Severity::Success => "ok",
        Severity::Error => "error",
    };
    eprintln!("[{label}] {}", notice.summary);
    for line in notice.detail.lines() {
        eprintln!("    {line}");
    }
}

fn print_view(view: &ViewState) {
    let marker = match view.summary_provenance {
        SummaryProvenance::Authoritative => "",
        SummaryProvenance::Approximated => " (approximate, current page only)",
        SummaryProvenance::Pending => " (unavailable)",
    };
    println!(
        "Products: {}  Inventory value: {:.2}  Avg stock age: {:.1} days{marker}",
        view.summary.total_products,
        view.summary.total_inventory_value,
        view.summary.average_stock_age
    );
    println!();
    println!(
        "{:<12} {:<28} {:<16} {:<10} {:>10} {:>6} {:>5}",
        "SKU", "NAME", "CATEGORY", "PURCHASED", "PRICE", "QTY", "AGE"
    );
    for record in view.records() {
        let age = record
            .stock_age_days
            .map(|age| age.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<28} {:<16} {:<10} {:>10.2} {:>6} {:>5}",
            record.sku,
            record.name,
            record.category,
            record.purchase_date,
            record.unit_price,
            record.quantity,
            age
        );
    }
    println!();
    let page_display = if view.total_pages() == 0 {
        0
    } else {
        view.page_index + 1
    };
    println!(
        "Page {page_display} of {} ({} records, sorted by {} {})",
        view.total_pages(),
        view.total_elements(),
        view.sort.field,
        view.sort.direction
    );
}
