use anyhow::Result;
use folio_core::ExportFormat;
use folio_engine::{Studio, TextRenderer};

use crate::cli::ExportCommands;
use crate::commands::expect_success;

pub async fn handle(cmd: ExportCommands, studio: &Studio) -> Result<()> {
    match cmd {
        ExportCommands::Save { tag, format } => save(studio, &tag, format).await,
        ExportCommands::List => list(studio).await,
        ExportCommands::Show { id } => show(studio, &id).await,
        ExportCommands::Delete { id, force } => delete(studio, &id, force).await,
    }
}

async fn save(studio: &Studio, tag: &str, format: ExportFormat) -> Result<()> {
    if studio.session().is_dirty() {
        tracing::warn!("Exporting a design with unsaved edits");
    }
    let record = expect_success(studio.save_export(tag, format).await, "Export")?;

    println!("✓ Saved export: {}", record.tag);
    println!("  ID: {}", record.id);
    println!("  Format: {}", record.payload.format);
    println!("  Render hash: {}", &record.render_hash[..12.min(record.render_hash.len())]);
    Ok(())
}

async fn list(studio: &Studio) -> Result<()> {
    let exports = expect_success(studio.list_exports().await, "Listing exports")?;

    if exports.is_empty() {
        println!("No exports found.");
        return Ok(());
    }

    println!("Exports:");
    for export in exports {
        println!("  {} ({})", export.tag, export.id);
        println!("    Format: {} · Created: {}", export.format, export.created_at);
    }
    Ok(())
}

async fn show(studio: &Studio, id: &str) -> Result<()> {
    let record = expect_success(studio.get_export(id).await, "Loading export")?;
    let view = studio.export_view(&record);

    println!("Export: {}", record.tag);
    println!("  ID: {}", record.id);
    println!("  Format: {}", record.payload.format);
    println!("  Exported: {}", record.payload.exported_at);

    let current_hash = view.render_hash()?;
    if current_hash != record.render_hash {
        println!("  Note: stats changed since this export was taken");
    }
    println!();
    print!("{}", TextRenderer::new().render(&view)?);
    Ok(())
}

async fn delete(studio: &Studio, id: &str, force: bool) -> Result<()> {
    let record = expect_success(studio.get_export(id).await, "Loading export")?;

    if !force {
        print!("Delete export '{}'? [y/N] ", record.tag);
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    expect_success(studio.delete_export(&record.id).await, "Deleting export")?;
    println!("✓ Deleted export: {}", record.tag);
    Ok(())
}
