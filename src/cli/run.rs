use crate::cli::root::Context;
use crate::cli::{common, TargetArgs};
use keyline::error::Result;
use keyline::subprocess;

pub fn run(ctx: &Context, target: &TargetArgs, command: &[String]) -> Result<()> {
    let (project, config) = common::resolve_target(ctx, target)?;
    let secrets = common::api_client(ctx)?.download(&project, &config)?;
    tracing::debug!(
        "Injecting {} secret(s) from {}/{}",
        secrets.len(),
        project,
        config
    );

    let exit_code = subprocess::run_with_secrets(command, &secrets)?;
    std::process::exit(exit_code);
}
