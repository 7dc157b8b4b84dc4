use crate::cli::root::Context;
use crate::cli::{common, printer};
use keyline::error::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let client = common::api_client(ctx)?;
    let info = client.me()?;

    if ctx.json {
        return printer::json(&info);
    }

    printer::table(
        &["name", "type", "workplace"],
        &[vec![
            info.name.clone(),
            info.token_type.clone(),
            info.workplace.name.clone(),
        ]],
    );
    Ok(())
}
