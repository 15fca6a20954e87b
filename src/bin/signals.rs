//! Signals Notebook CLI binary.
//!
//! A command-line interface for browsing a Signals Notebook tenant.

use clap::Parser;
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use signals_notebook::cli::{Cli, Command};
use signals_notebook::output::PrettyPrint;
use signals_notebook::{
    Attribute, Eid, Entity, Get, List, Material, Mid, Profile, SignalsClient, User, API_KEY_ENV,
    API_URL_ENV,
};
use std::process::ExitCode;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let client = match SignalsClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set {API_KEY_ENV} and {API_URL_ENV} environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &SignalsClient, cli: Cli) -> signals_notebook::Result<()> {
    let query = cli.command.entity_query();
    match cli.command {
        Command::Get { eid } => {
            let entity = Entity::get(client, Eid::parse(eid)?).await?;
            output_single(&entity, cli.json)
        }
        Command::List { limit, .. } => {
            let stream = Entity::get_list(client, &query);
            let entities: Vec<Entity> = match limit {
                Some(limit) => stream.take(limit).try_collect().await?,
                None => stream.try_collect().await?,
            };
            output_list(&entities, cli.json, |e| EntityRow::from(e))
        }
        Command::Material { mid } => {
            let material = Material::get(client, Mid::parse(mid)?).await?;
            output_single(&material, cli.json)
        }
        Command::Attributes => {
            let attributes = Attribute::list_all(client, &()).await?;
            output_list(&attributes, cli.json, |a| AttributeRow::from(a))
        }
        Command::Users => {
            let users = User::list_all(client, &()).await?;
            output_list(&users, cli.json, |u| UserRow::from(u))
        }
        Command::Whoami => {
            let profile = Profile::get_current(client).await?;
            output_single(&profile, cli.json)
        }
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> signals_notebook::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> signals_notebook::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct EntityRow {
    eid: String,
    #[tabled(rename = "type")]
    entity_type: String,
    name: String,
    edited: String,
}

impl From<&Entity> for EntityRow {
    fn from(e: &Entity) -> Self {
        Self {
            eid: e.eid().to_string(),
            entity_type: e.entity_type().to_string(),
            name: e.name().to_string(),
            edited: e.common().edited_at().format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Tabled)]
struct AttributeRow {
    id: String,
    #[tabled(rename = "type")]
    attribute_type: String,
    name: String,
}

impl From<&Attribute> for AttributeRow {
    fn from(a: &Attribute) -> Self {
        Self {
            id: a.id().to_string(),
            attribute_type: a.attribute_type().to_string(),
            name: a.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    id: String,
    user_name: String,
    name: String,
    email: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.user_id().to_string(),
            user_name: u.user_name().to_string(),
            name: u.full_name(),
            email: u.email.clone(),
        }
    }
}
