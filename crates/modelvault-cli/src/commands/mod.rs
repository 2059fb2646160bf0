//! CLI commands implementation

use anyhow::{Context, Result};
use modelvault_core::{RandomProducer, VaultError};
use modelvault_store::{ArtifactCache, ArtifactStore};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Row printed by `list --json`
#[derive(Debug, Serialize)]
struct ArtifactRow {
    id: String,
    digest: String,
    size: u64,
    stored_at: String,
}

/// Generate random models and store them
pub async fn generate(
    store: &ArtifactStore,
    cache: &ArtifactCache,
    size: usize,
    count: u32,
) -> Result<()> {
    let producer = RandomProducer::new(size);

    for _ in 0..count {
        let artifact = store.produce_and_put(&producer).await?;
        println!("Generated model: {}", artifact.id);
        println!("  Digest: {}", artifact.digest);
        println!("  Size: {} bytes", artifact.size());
    }

    let stats = cache.stats().await;
    info!(
        entries = stats.entries,
        admissions = stats.admissions,
        rejections = stats.rejections,
        evictions = stats.evictions,
        "Cache state after generate"
    );

    Ok(())
}

/// Store a file as an artifact
pub async fn put(store: &ArtifactStore, id: String, file: PathBuf) -> Result<()> {
    let payload = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    match store.put_with_outcome(&id, &payload).await {
        Ok((digest, outcome)) => {
            println!("Artifact '{}' {}", id, outcome);
            println!("  Digest: {}", digest);
            println!("  Size: {} bytes", payload.len());
        }
        Err(VaultError::Conflict { existing, .. }) => {
            eprintln!(
                "Artifact '{}' already exists with digest {} (use --replace to overwrite)",
                id, existing
            );
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Read an artifact
pub async fn get(store: &ArtifactStore, id: String, output: Option<PathBuf>) -> Result<()> {
    let Some(artifact) = store.get_artifact(&id).await? else {
        eprintln!("Artifact not found: {}", id);
        return Ok(());
    };

    match output {
        Some(path) => {
            tokio::fs::write(&path, &artifact.payload)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} bytes to {}", artifact.size(), path.display());
        }
        None => {
            println!("Artifact '{}'", artifact.id);
            println!("  Digest: {}", artifact.digest);
            println!("  Size: {} bytes", artifact.size());
        }
    }

    Ok(())
}

/// List stored artifacts
pub async fn list(store: &ArtifactStore, json: bool) -> Result<()> {
    let rows: Vec<ArtifactRow> = store
        .list()
        .await
        .into_iter()
        .map(|(id, entry)| ArtifactRow {
            id,
            digest: entry.digest,
            size: entry.size,
            stored_at: entry.stored_at.to_rfc3339(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No artifacts found");
    } else {
        println!("{:<40} {:<12} {:<64}", "ID", "SIZE", "DIGEST");
        println!("{}", "-".repeat(118));
        for row in rows {
            println!("{:<40} {:<12} {:<64}", row.id, row.size, row.digest);
        }
    }

    Ok(())
}

/// Check an artifact's durable copy against its digest
pub async fn verify(store: &ArtifactStore, id: String) -> Result<()> {
    match store.verify(&id).await {
        Ok(entry) => println!("Artifact '{}' OK ({})", id, entry.digest),
        Err(VaultError::NotFound(_)) => eprintln!("Artifact not found: {}", id),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
