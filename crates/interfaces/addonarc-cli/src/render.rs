//! Human readable output for the CLI. Everything returns a `String` so the
//! formatting can be tested without capturing stdout.

use std::fmt::Write;

use addonarc_core::{AddonRecord, Archive, Mutation};
use addonarc_pipeline::UpdateReport;
use humansize::{format_size, DECIMAL};

use crate::CliDeletedFilter;

pub fn render_report(report: &UpdateReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let title = if report.executed {
        "Update Result"
    } else {
        "Check Result (dry run)"
    };
    let _ = writeln!(out, ":: {title}");
    let _ = writeln!(out, "   Versions:          {}", stats.buckets);
    let _ = writeln!(out, "   New:               {}", stats.created);
    let _ = writeln!(out, "   Updated:           {}", stats.updated);
    let _ = writeln!(out, "   Listed again:      {}", stats.undeleted);
    let _ = writeln!(out, "   Deleted:           {}", stats.deleted);
    let _ = writeln!(out, "   Skipped entries:   {}", stats.skipped);

    if report.executed {
        let _ = writeln!(
            out,
            "   Downloads:         {} ({} failed, {})",
            stats.downloads_planned,
            stats.downloads_failed,
            format_size(stats.bytes_downloaded, DECIMAL)
        );
    } else {
        let _ = writeln!(out, "   Pending Downloads: {}", stats.downloads_planned);
    }

    if stats.mutations() == 0 && stats.skipped == 0 {
        let _ = writeln!(out, "   Status:            Up to date");
    }

    for bucket in &report.buckets {
        let key = &bucket.outcome.bucket;
        for mutation in &bucket.outcome.mutations {
            let _ = writeln!(out, "   {}", describe_mutation(key, mutation));
        }
        for skipped in &bucket.outcome.skipped {
            let _ = writeln!(
                out,
                "   ! [mc{key}/{}] skipped: {}",
                skipped.uuid.as_deref().unwrap_or("?"),
                skipped.error
            );
        }
        for failure in &bucket.failures {
            let _ = writeln!(
                out,
                "   ! [mc{key}/{}] download failed: {}",
                failure.uuid, failure.error
            );
        }
    }

    out
}

fn describe_mutation(bucket: &str, mutation: &Mutation) -> String {
    match mutation {
        Mutation::Created {
            uuid,
            name,
            version,
            ..
        } => format!("+ [mc{bucket}/{uuid}] {name} v{version}"),
        Mutation::Updated {
            uuid,
            name,
            previous_version,
            version,
            ..
        } => format!("~ [mc{bucket}/{uuid}] {name} v{previous_version} -> v{version}"),
        Mutation::Undeleted { uuid, name } => format!("^ [mc{bucket}/{uuid}] {name} listed again"),
        Mutation::Deleted { uuid, name, .. } => format!("- [mc{bucket}/{uuid}] {name}"),
    }
}

pub fn render_list(archive: &Archive, version: Option<&str>, filter: CliDeletedFilter) -> String {
    let mut out = String::new();

    for (key, bucket) in &archive.addons {
        if version.is_some_and(|v| v != key.as_str()) {
            continue;
        }
        let shown: Vec<&AddonRecord> = bucket
            .iter()
            .filter(|r| filter.admits(r.is_deleted))
            .collect();
        if shown.is_empty() {
            continue;
        }

        let _ = writeln!(out, ":: MC {key} ({} add-ons)", shown.len());
        for record in shown {
            let _ = write!(
                out,
                "   {} v{} by {} [{}] ({})",
                record.name, record.version, record.author, record.category, record.uuid
            );
            if record.is_deleted {
                out.push_str(" [deleted]");
            }
            out.push('\n');
        }
    }

    if out.is_empty() {
        out.push_str(":: No add-ons archived\n");
        return out;
    }

    let stats = archive.stats();
    let _ = writeln!(
        out,
        ":: Archive holds {} record(s) in {} version(s), {} deleted upstream",
        stats.records, stats.buckets, stats.deleted
    );
    out
}

pub fn render_record(bucket: &str, record: &AddonRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, ":: {} [mc{bucket}/{}]", record.name, record.uuid);
    let _ = writeln!(out, "   Author:   {}", record.author);
    let _ = writeln!(out, "   Version:  {}", record.version);
    let _ = writeln!(out, "   Category: {}", record.category);
    let _ = writeln!(
        out,
        "   Status:   {}",
        if record.is_deleted { "deleted upstream" } else { "available" }
    );
    for (key, value) in &record.extra {
        let _ = writeln!(out, "   {key}: {value}");
    }
    out
}
