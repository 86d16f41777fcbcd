use crate::cli::commands::{ConfigAction, ConfigCmd};
use crate::cli::output::ConfigJson;
use crate::io::config_io;

use super::{CmdResult, Context, print_json};

pub fn cmd_config(ctx: &Context, cmd: ConfigCmd) -> CmdResult {
    match cmd.action {
        Some(ConfigAction::Init) => {
            config_io::write_default_config(&ctx.config_path)?;
            println!("wrote {}", ctx.config_path.display());
            Ok(())
        }
        None => show_config(ctx),
    }
}

fn show_config(ctx: &Context) -> CmdResult {
    if ctx.json {
        return print_json(&ConfigJson {
            path: ctx.config_path.clone(),
            resolved_directory: ctx.dir.clone(),
            config: &ctx.config,
        });
    }
    let exists = if ctx.config_path.exists() { "" } else { " (not found, using defaults)" };
    println!("# {}{}", ctx.config_path.display(), exists);
    println!("# notes directory: {}", ctx.dir.display());
    print!("{}", toml::to_string_pretty(&ctx.config)?);
    Ok(())
}
