//! Print the OpenAPI description of whatsapp-connect-server as JSON.

use anyhow::Result;
use std::{fs, path::PathBuf};
use utoipa::OpenApi;
use whatsapp_connect_server::docs::ApiDoc;

fn main() -> Result<()> {
    let json = ApiDoc::openapi().to_pretty_json()?;

    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => fs::write(&path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
