use std::time::Duration;

use addonarc_core::Archive;
use addonarc_infra::net::DownloadEvent;
use addonarc_persistence::{ArchiveStore, DataLayout, JsonArchiveStore};
use addonarc_pipeline::{ArchiveSyncEngine, UpdateReport};
use anyhow::{bail, Context};
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::render::{render_list, render_record, render_report};
use crate::{CliContext, CliDeletedFilter};

fn build_engine(ctx: &CliContext) -> anyhow::Result<ArchiveSyncEngine> {
    let client =
        addonarc_infra::net::default_http_client().context("Failed to build HTTP client")?;
    Ok(addonarc_pipeline::default_engine(
        client,
        DataLayout::new(ctx.data_dir.clone()),
        ctx.endpoints.clone(),
    ))
}

fn load_archive(ctx: &CliContext) -> anyhow::Result<Archive> {
    let store = JsonArchiveStore::for_layout(&DataLayout::new(ctx.data_dir.clone()));
    store
        .load()
        .with_context(|| format!("Failed to read archive {}", store.path()))
}

pub async fn cmd_update(ctx: &CliContext) -> anyhow::Result<UpdateReport> {
    println!(":: Updating archive...");
    println!("   Catalog: {}", ctx.endpoints.catalog_url);
    println!("   Data:    {}", ctx.data_dir);

    let engine = build_engine(ctx)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let (tx, mut rx) = tokio::sync::mpsc::channel::<DownloadEvent>(64);
    let progress = {
        let pb = pb.clone();
        tokio::spawn(async move {
            let mut done = 0u64;
            let mut bytes = 0u64;
            while let Some(event) = rx.recv().await {
                match event {
                    DownloadEvent::Started { url } => pb.set_message(format!("Fetching {url}")),
                    DownloadEvent::Completed { bytes: b, .. } => {
                        done += 1;
                        bytes += b;
                        pb.set_message(format!(
                            "{done} download(s), {}",
                            format_size(bytes, DECIMAL)
                        ));
                    }
                }
            }
        })
    };

    let result = engine.update(Some(tx)).await;
    if let Err(e) = progress.await {
        debug!("Progress reporter stopped early: {e}");
    }
    pb.finish_and_clear();

    let report = result.context("Update failed, archive left untouched")?;
    print!("\n{}", render_report(&report));
    Ok(report)
}

pub async fn cmd_check(ctx: &CliContext) -> anyhow::Result<UpdateReport> {
    println!(":: Checking catalog against archive...");
    println!("   Catalog: {}", ctx.endpoints.catalog_url);
    println!("   Data:    {}", ctx.data_dir);

    let engine = build_engine(ctx)?;
    let report = engine.plan().await.context("Check failed")?;

    print!("\n{}", render_report(&report));
    Ok(report)
}

pub fn cmd_list(
    ctx: &CliContext,
    version: Option<&str>,
    filter: CliDeletedFilter,
) -> anyhow::Result<()> {
    let archive = load_archive(ctx)?;
    print!("{}", render_list(&archive, version, filter));
    Ok(())
}

pub fn cmd_show(ctx: &CliContext, uuid: &str) -> anyhow::Result<()> {
    let archive = load_archive(ctx)?;
    let hits = archive.find(uuid);
    if hits.is_empty() {
        bail!("Add-on {uuid} not found");
    }
    for (bucket, record) in hits {
        print!("{}", render_record(bucket, record));
    }
    Ok(())
}
