use crate::cli::json_output::ProjectItem;
use crate::cli::root::Context;
use crate::cli::{common, printer};
use keyline::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let client = common::api_client(ctx)?;
    let projects = client.projects()?;

    if ctx.json {
        let items: Vec<ProjectItem> = projects
            .into_iter()
            .map(|p| ProjectItem {
                id: p.id,
                name: p.name,
                description: p.description,
            })
            .collect();
        return printer::json(&items);
    }

    if projects.is_empty() {
        tracing::info!("No projects.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.name.clone(),
                p.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    printer::table(&["id", "name", "description"], &rows);
    Ok(())
}
