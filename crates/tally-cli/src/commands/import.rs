//! Statement import command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tally_core::{
    extract::{ExtractionBackend, ExtractionClient, StatementMedia},
    import::{import_csv, import_statement},
    models::ImportSummary,
};

use super::open_db;

pub async fn cmd_import(db_path: &Path, file: &Path, account_name: &str) -> Result<()> {
    let db = open_db(db_path)?;
    let account_id = db.upsert_account(account_name)?;

    println!("📥 Importing {} into '{}'...", file.display(), account_name);

    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    debug!(extension = %extension, "selecting import path");

    let summary = match extension.as_str() {
        "csv" => {
            let csv_file = File::open(file)
                .with_context(|| format!("Failed to open file: {}", file.display()))?;
            import_csv(&db, account_id, csv_file)?
        }
        "png" | "jpg" | "jpeg" | "webp" => {
            import_extracted(&db, account_id, file, StatementMedia::Image).await?
        }
        "txt" | "text" => import_extracted(&db, account_id, file, StatementMedia::Text).await?,
        other => anyhow::bail!(
            "Unsupported statement type '.{}' (expected csv, png, jpg, jpeg, webp, or txt)",
            other
        ),
    };

    print_summary(&summary);
    Ok(())
}

/// Run an image or text statement through the extraction backend
async fn import_extracted(
    db: &tally_core::db::Database,
    account_id: i64,
    file: &Path,
    media: StatementMedia,
) -> Result<ImportSummary> {
    let extractor = ExtractionClient::from_env().ok_or_else(|| {
        anyhow::anyhow!(
            "No extraction backend configured.\n\
             Set OLLAMA_HOST (and optionally OLLAMA_MODEL) to import images or text."
        )
    })?;

    println!(
        "   🤖 Extracting via {} ({})",
        extractor.model(),
        extractor.host()
    );

    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let summary = import_statement(db, account_id, &data, media, &extractor)
        .await
        .context("Statement extraction failed; nothing was imported")?;
    Ok(summary)
}

fn print_summary(summary: &ImportSummary) {
    println!("✅ Import complete!");
    println!("   Rows:      {}", summary.total);
    println!("   Imported:  {}", summary.imported);
    println!("   Skipped (duplicates): {}", summary.duplicates);
}
