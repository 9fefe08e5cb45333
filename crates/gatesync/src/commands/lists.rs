//! Read-only inspection of the remote gateway lists.

use tabled::Tabled;

use gatesync_api::{GatewayList, ListItem};

use crate::cli::{GlobalOpts, ListsArgs, ListsCommand};
use crate::config::{self, RunContext};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Items")]
    count: u64,
}

impl From<&GatewayList> for ListRow {
    fn from(l: &GatewayList) -> Self {
        Self {
            id: l.id.clone(),
            name: l.name.clone(),
            count: l.count.unwrap_or(0),
        }
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&ListItem> for ItemRow {
    fn from(item: &ListItem) -> Self {
        Self {
            value: item.value.clone(),
            description: item.description.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &RunContext, args: ListsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (gateway, _store) = config::build_clients(ctx)?;

    match args.command {
        ListsCommand::List => {
            let lists = gateway.list_lists().await?;
            let out = output::render_list(&global.output, &lists, |l| ListRow::from(l), |l| l.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ListsCommand::Items { id } => {
            let items = gateway.list_items(&id).await.map_err(|e| match e {
                gatesync_api::Error::Api { status: 404, .. } => CliError::NotFound {
                    resource_type: "gateway list".into(),
                    identifier: id.clone(),
                    list_command: "lists list".into(),
                },
                other => other.into(),
            })?;
            let out =
                output::render_list(&global.output, &items, |i| ItemRow::from(i), |i| i.value.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
