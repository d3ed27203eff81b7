use anyhow::Result;

use super::context::CliContext;
use super::output::OutputFormat;
use action_flow::builtin_personas;

pub fn cmd_personas(ctx: &CliContext, output: &OutputFormat) -> Result<()> {
    let personas = builtin_personas(&ctx.config().password);
    output.emit(&personas, || {
        personas
            .iter()
            .map(|p| format!("{:<20} {:<26} {:?}", p.key, p.username, p.deviations))
            .collect::<Vec<_>>()
            .join("\n")
    })
}
