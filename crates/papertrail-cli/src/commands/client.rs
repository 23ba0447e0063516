//! Client command - manage the client book.

use clap::{Args, Subcommand};
use console::style;

use papertrail_core::{ClientInfo, PapertrailError, SavedClient};

use super::Context;

/// Arguments for the client command.
#[derive(Args)]
pub struct ClientArgs {
    #[command(subcommand)]
    command: ClientCommand,
}

#[derive(Subcommand)]
enum ClientCommand {
    /// Add a client
    Add(ClientFields),

    /// Update an existing client
    Edit {
        /// Client id
        id: String,

        #[command(flatten)]
        fields: ClientFields,
    },

    /// List saved clients
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a client
    Delete {
        /// Client id
        id: String,
    },
}

#[derive(Args)]
struct ClientFields {
    /// Client name
    #[arg(long)]
    name: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Company name
    #[arg(long)]
    company: Option<String>,

    /// Phone number
    #[arg(long)]
    phone: Option<String>,

    /// Postal address
    #[arg(long)]
    address: Option<String>,

    /// Tax identification number
    #[arg(long)]
    tax_id: Option<String>,
}

impl ClientFields {
    fn apply(self, info: &mut ClientInfo) {
        let fields = [
            (self.name, &mut info.name),
            (self.email, &mut info.email),
            (self.company, &mut info.company),
            (self.phone, &mut info.phone),
            (self.address, &mut info.address),
            (self.tax_id, &mut info.tax_id),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value;
            }
        }
    }
}

pub fn run(args: ClientArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        ClientCommand::Add(fields) => add_client(fields, ctx),
        ClientCommand::Edit { id, fields } => edit_client(&id, fields, ctx),
        ClientCommand::List { json } => list_clients(json, ctx),
        ClientCommand::Delete { id } => delete_client(&id, ctx),
    }
}

fn add_client(fields: ClientFields, ctx: &Context) -> anyhow::Result<()> {
    let mut info = ClientInfo::default();
    fields.apply(&mut info);

    let mut repo = ctx.open_repository()?;
    let client = save_validated(&mut repo, &SavedClient::new(info))?;

    println!("{} Client added: {}", style("✓").green(), client.id);
    Ok(())
}

fn edit_client(id: &str, fields: ClientFields, ctx: &Context) -> anyhow::Result<()> {
    let mut repo = ctx.open_repository()?;
    let mut client = repo
        .find_client(id)?
        .ok_or_else(|| anyhow::anyhow!("Client not found: {}", id))?;
    fields.apply(&mut client.info);

    save_validated(&mut repo, &client)?;

    println!("{} Client updated: {}", style("✓").green(), id);
    Ok(())
}

fn save_validated<S, C>(
    repo: &mut papertrail_core::Repository<S, C>,
    client: &SavedClient,
) -> anyhow::Result<SavedClient>
where
    S: papertrail_core::KeyValueStore,
    C: papertrail_core::Clock,
{
    match repo.save_client(client) {
        Ok(saved) => Ok(saved),
        Err(PapertrailError::Validation(_)) => anyhow::bail!("Name and email are required"),
        Err(e) => Err(e.into()),
    }
}

fn list_clients(json: bool, ctx: &Context) -> anyhow::Result<()> {
    let clients = ctx.open_repository()?.clients()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
        return Ok(());
    }

    if clients.is_empty() {
        println!("{} No clients yet.", style("ℹ").blue());
        return Ok(());
    }

    for client in &clients {
        println!(
            "{}  {:<24} {:<28} {}",
            style(&client.id).dim(),
            client.info.name,
            client.info.email,
            client.info.company
        );
    }

    Ok(())
}

fn delete_client(id: &str, ctx: &Context) -> anyhow::Result<()> {
    ctx.open_repository()?.delete_client(id)?;
    println!("{} Client deleted: {}", style("✓").green(), id);
    Ok(())
}
