use std::io::Read as _;
use std::path::Path;

use anyhow::Context;

use crate::parser::parse_helper_response;
use crate::personas::PersonaSet;
use crate::render::render_helper_response;

pub fn handle_helpers_command(personas_path: Option<&Path>) -> anyhow::Result<()> {
    let set = match personas_path {
        Some(path) => PersonaSet::from_file(path)?,
        None => PersonaSet::builtin(),
    };
    for spec in set.all() {
        println!(
            "{:<22} {:<22} {}",
            spec.helper, spec.display_name, spec.description
        );
    }
    match (&set.config_hash_hex, personas_path) {
        (Some(hash), Some(path)) => {
            let short = &hash[..12.min(hash.len())];
            println!("personas config: {} ({short})", path.display());
        }
        _ => println!("personas config: builtin"),
    }
    Ok(())
}

/// Debug entry point: feed a raw model reply (file or stdin) through the
/// recovery pipeline and print either the rendered text or the raw
/// `{data, error}` result.
pub fn handle_parse_command(
    helper_type: Option<&str>,
    file: Option<&Path>,
    as_json: bool,
) -> anyhow::Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read response file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read raw response from stdin")?;
            buf
        }
    };

    let result = parse_helper_response(&raw, helper_type.unwrap_or_default());
    let (data, error) = result.into_parts();

    if as_json {
        let out = serde_json::json!({ "data": data, "error": error });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{}",
        render_helper_response(helper_type, data, &raw).trim_end()
    );
    Ok(())
}
