//! Invoice command - create, edit, list and track invoices.

use clap::{Args, Subcommand, ValueEnum};
use console::style;
use tracing::{debug, info};

use papertrail_core::{
    Clock, ColorTheme, DashboardStats, EditingSession, FileStore, Invoice, InvoiceStatus,
    Repository, SavedClient, SortBy, format_currency, search, sort_invoices,
};

use super::{Context, parse_theme};

/// Arguments for the invoice command.
#[derive(Args)]
pub struct InvoiceArgs {
    #[command(subcommand)]
    command: InvoiceCommand,
}

#[derive(Subcommand)]
enum InvoiceCommand {
    /// Create an invoice with the next invoice number
    New(InvoiceFields),

    /// Change an existing invoice
    Edit(EditArgs),

    /// List invoices
    List(ListArgs),

    /// Show one invoice with its line items and totals
    Show {
        /// Invoice id
        id: String,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the status of an invoice
    Status {
        /// Invoice id
        id: String,

        /// New status (draft, sent, paid, overdue)
        status: String,
    },

    /// Copy an invoice into a new draft
    Duplicate {
        /// Invoice id
        id: String,

        /// Save the copy right away instead of parking it for the next `invoice new`
        #[arg(long)]
        save: bool,
    },

    /// Delete an invoice
    Delete {
        /// Invoice id
        id: String,
    },

    /// Show invoice count and outstanding amount
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Fields shared by `new` and `edit`.
#[derive(Args)]
struct InvoiceFields {
    /// Saved client to bill
    #[arg(long)]
    client: Option<String>,

    /// Currency code (e.g. EUR, BDT)
    #[arg(long)]
    currency: Option<String>,

    /// Tax rate in percent
    #[arg(long)]
    tax_rate: Option<f64>,

    /// Project title
    #[arg(long)]
    title: Option<String>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,

    /// Color theme preset for the branding
    #[arg(long)]
    theme: Option<String>,

    /// Line item as "description:quantity:unit_price" (repeatable)
    #[arg(long = "item", value_parser = parse_item)]
    items: Vec<ItemSpec>,
}

#[derive(Args)]
struct EditArgs {
    /// Invoice id
    id: String,

    #[command(flatten)]
    fields: InvoiceFields,

    /// Remove the line item with this id (repeatable)
    #[arg(long)]
    remove_item: Vec<String>,
}

#[derive(Args)]
struct ListArgs {
    /// Only invoices whose number or client name contains this text
    #[arg(long)]
    search: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value = "date")]
    sort: SortArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    /// Newest first
    Date,
    /// Largest total first
    Amount,
    /// By status name
    Status,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortBy::Date,
            SortArg::Amount => SortBy::Amount,
            SortArg::Status => SortBy::Status,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Aligned columns
    Table,
    /// JSON array of invoice records
    Json,
    /// CSV with one row per invoice
    Csv,
}

#[derive(Clone, Debug, PartialEq)]
struct ItemSpec {
    description: String,
    quantity: f64,
    unit_price: f64,
}

fn parse_item(s: &str) -> Result<ItemSpec, String> {
    // Description may itself contain colons.
    let mut parts = s.rsplitn(3, ':');
    let (Some(price), Some(qty), Some(description)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected \"description:quantity:unit_price\", got \"{}\"", s));
    };

    let quantity = qty
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid quantity \"{}\"", qty))?;
    let unit_price = price
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid unit price \"{}\"", price))?;

    Ok(ItemSpec {
        description: description.trim().to_string(),
        quantity,
        unit_price,
    })
}

pub fn run(args: InvoiceArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        InvoiceCommand::New(fields) => new_invoice(fields, ctx),
        InvoiceCommand::Edit(args) => edit_invoice(args, ctx),
        InvoiceCommand::List(args) => list_invoices(args, ctx),
        InvoiceCommand::Show { id, json } => show_invoice(&id, json, ctx),
        InvoiceCommand::Status { id, status } => set_status(&id, &status, ctx),
        InvoiceCommand::Duplicate { id, save } => duplicate_invoice(&id, save, ctx),
        InvoiceCommand::Delete { id } => delete_invoice(&id, ctx),
        InvoiceCommand::Stats { json } => show_stats(json, ctx),
    }
}

/// Field changes resolved against the store before the session starts.
struct Changes {
    fields: InvoiceFields,
    client: Option<SavedClient>,
    theme: Option<ColorTheme>,
}

impl Changes {
    fn resolve(fields: InvoiceFields, repo: &Repository<FileStore>) -> anyhow::Result<Self> {
        if let Some(rate) = fields.tax_rate {
            if !(0.0..=100.0).contains(&rate) {
                anyhow::bail!("Tax rate must be between 0 and 100, got {}", rate);
            }
        }

        let client = match &fields.client {
            Some(id) => Some(
                repo.find_client(id)?
                    .ok_or_else(|| anyhow::anyhow!("Client not found: {}", id))?,
            ),
            None => None,
        };
        let theme = fields.theme.as_deref().map(parse_theme).transpose()?;

        Ok(Self {
            fields,
            client,
            theme,
        })
    }

    fn apply(self, invoice: &mut Invoice) {
        if let Some(client) = &self.client {
            invoice.set_client(client);
        }
        if let Some(currency) = self.fields.currency {
            invoice.currency = currency.trim().to_uppercase();
        }
        if let Some(rate) = self.fields.tax_rate {
            invoice.tax_rate = rate;
        }
        if let Some(title) = self.fields.title {
            invoice.title = title;
        }
        if let Some(notes) = self.fields.notes {
            invoice.notes = notes;
        }
        if let Some(theme) = self.theme {
            invoice.apply_color_theme(theme);
        }

        let mut items = self.fields.items.into_iter();

        // A fresh draft starts with one blank row; fill it before appending.
        let blank_row = invoice
            .line_items()
            .first()
            .filter(|item| item.description.is_empty() && item.unit_price == 0.0)
            .map(|item| item.id.clone());
        if let Some(id) = blank_row {
            if let (Some(spec), Ok(item)) = (items.next(), invoice.line_item_mut(&id)) {
                fill_item(item, spec);
            }
        }

        for spec in items {
            fill_item(invoice.add_line_item(), spec);
        }
    }
}

fn fill_item(item: &mut papertrail_core::LineItem, spec: ItemSpec) {
    item.description = spec.description;
    item.quantity = spec.quantity;
    item.unit_price = spec.unit_price;
}

fn new_invoice(fields: InvoiceFields, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let repo = ctx.open_repository()?;
    let changes = Changes::resolve(fields, &repo)?;

    let mut session = EditingSession::open(repo, None)?.with_delay(config.autosave.delay());
    session.edit(|invoice| changes.apply(invoice));
    let invoice = session.save_now()?;

    println!(
        "{} Created invoice {} ({})",
        style("✓").green(),
        style(&invoice.number).bold(),
        invoice.id
    );
    println!(
        "  Total: {}",
        format_currency(invoice.totals().total, &invoice.currency)
    );

    Ok(())
}

fn edit_invoice(args: EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let repo = ctx.open_repository()?;
    let invoice = find_or_bail(&repo, &args.id)?;
    let changes = Changes::resolve(args.fields, &repo)?;

    let mut session =
        EditingSession::with_invoice(repo, invoice).with_delay(config.autosave.delay());

    for item_id in &args.remove_item {
        let removed = session.try_edit(|invoice| invoice.remove_line_item(item_id))?;
        debug!("Removed line item {} ({})", removed.id, removed.description);
    }
    session.edit(|invoice| changes.apply(invoice));

    let invoice = session.save_now()?;

    println!(
        "{} Updated invoice {}",
        style("✓").green(),
        style(&invoice.number).bold()
    );
    println!(
        "  Total: {}",
        format_currency(invoice.totals().total, &invoice.currency)
    );

    Ok(())
}

fn list_invoices(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let invoices = ctx.open_repository()?.invoices()?;

    let mut selected: Vec<&Invoice> = match &args.search {
        Some(query) => search(&invoices, query),
        None => invoices.iter().collect(),
    };
    sort_invoices(&mut selected, args.sort.into());

    let output = match args.format {
        OutputFormat::Table => format_table(&selected),
        OutputFormat::Json => serde_json::to_string_pretty(&selected)?,
        OutputFormat::Csv => format_csv(&selected)?,
    };
    print!("{}", output);

    Ok(())
}

fn format_table(invoices: &[&Invoice]) -> String {
    if invoices.is_empty() {
        return format!("{} No invoices found.\n", style("ℹ").blue());
    }

    let mut output = format!(
        "{:<16} {:<24} {:<10} {:<10} {:<8} {:>16}\n",
        "NUMBER", "CLIENT", "DATE", "DUE", "STATUS", "TOTAL"
    );
    for invoice in invoices {
        output.push_str(&format!(
            "{:<16} {:<24} {:<10} {:<10} {:<8} {:>16}\n",
            invoice.number,
            invoice.client_info.name,
            invoice.date.to_string(),
            invoice.due_date.to_string(),
            invoice.status.as_str(),
            format_currency(invoice.totals().total, &invoice.currency)
        ));
    }
    output
}

fn format_csv(invoices: &[&Invoice]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "number",
        "client_name",
        "date",
        "due_date",
        "status",
        "currency",
        "subtotal",
        "tax",
        "total",
    ])?;

    for invoice in invoices {
        let totals = invoice.totals();
        wtr.write_record([
            &invoice.id,
            &invoice.number,
            &invoice.client_info.name,
            &invoice.date.to_string(),
            &invoice.due_date.to_string(),
            invoice.status.as_str(),
            &invoice.currency,
            &totals.subtotal.to_string(),
            &totals.tax.to_string(),
            &totals.total.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn show_invoice(id: &str, json: bool, ctx: &Context) -> anyhow::Result<()> {
    let invoice = find_or_bail(&ctx.open_repository()?, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&invoice)?);
        return Ok(());
    }

    let money = |amount: f64| format_currency(amount, &invoice.currency);

    println!("Invoice: {}", style(&invoice.number).bold());
    if !invoice.title.is_empty() {
        println!("Title: {}", invoice.title);
    }
    println!("Status: {}", invoice.status);
    println!("Date: {}  Due: {}", invoice.date, invoice.due_date);
    if !invoice.client_info.name.is_empty() {
        println!(
            "Client: {} <{}>",
            invoice.client_info.name, invoice.client_info.email
        );
    }
    println!();

    for item in invoice.line_items() {
        println!(
            "  {:<32} {:>8} x {:>14} = {:>14}  {}",
            item.description,
            item.quantity,
            money(item.unit_price),
            money(item.total()),
            style(&item.id).dim()
        );
    }

    let totals = invoice.totals();
    println!();
    println!("Subtotal: {}", money(totals.subtotal));
    println!("Tax ({}%): {}", invoice.tax_rate, money(totals.tax));
    println!("Total: {}", style(money(totals.total)).bold());

    if !invoice.notes.is_empty() {
        println!();
        println!("{}", invoice.notes);
    }

    Ok(())
}

fn set_status(id: &str, status: &str, ctx: &Context) -> anyhow::Result<()> {
    let status: InvoiceStatus = status.parse()?;

    let mut repo = ctx.open_repository()?;
    let mut invoice = find_or_bail(&repo, id)?;
    invoice.status = status;
    let invoice = repo.save_invoice(&invoice)?;

    println!(
        "{} Invoice {} is now {}",
        style("✓").green(),
        invoice.number,
        invoice.status
    );
    Ok(())
}

fn duplicate_invoice(id: &str, save: bool, ctx: &Context) -> anyhow::Result<()> {
    let mut repo = ctx.open_repository()?;
    let copy = find_or_bail(&repo, id)?.duplicate();

    if save {
        let saved = repo.save_invoice(&copy)?;
        println!(
            "{} Saved copy {} ({})",
            style("✓").green(),
            saved.number,
            saved.id
        );
    } else {
        repo.stash_draft(&copy)?;
        info!("Parked draft {}", copy.id);
        println!(
            "{} Parked copy {} as a draft. Run 'papertrail invoice new' to finish it.",
            style("✓").green(),
            copy.number
        );
    }

    Ok(())
}

fn delete_invoice(id: &str, ctx: &Context) -> anyhow::Result<()> {
    let mut repo = ctx.open_repository()?;
    let invoice = find_or_bail(&repo, id)?;
    repo.delete_invoice(id)?;

    println!("{} Deleted invoice {}", style("✓").green(), invoice.number);
    Ok(())
}

fn show_stats(json: bool, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let repo = ctx.open_repository()?;
    let stats = DashboardStats::compute(&repo.invoices()?, repo.clock().today());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Invoices: {}", stats.total);
    println!("This month: {}", stats.this_month);
    println!(
        "Outstanding: {}",
        format_currency(stats.outstanding, &config.output.summary_currency)
    );
    Ok(())
}

fn find_or_bail(repo: &Repository<FileStore>, id: &str) -> anyhow::Result<Invoice> {
    repo.find_invoice(id)?
        .ok_or_else(|| anyhow::anyhow!("Invoice not found: {}", id))
}
