//! The `generate` command

use crate::args::GenerateArgs;
use anyhow::Context;
use drive::{DrivePublisher, LocalDrive, SofficeConverter};
use mail_merge::{
    load_from_file, DataSource, DateFields, DirectorySink, LinkReport, MergeEngine, MergeResult,
    MergeStatus, OutputSink, XlsxConfig, XlsxParser,
};
use std::path::Path;
use store::{MergeSettings, SettingsManager};
use tracing::{debug, info, warn};

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;
    let rows = load_rows(&args.rows, args.sheet.as_deref())?;
    info!(rows = rows.record_count(), file = %args.rows.display(), "loaded rows");

    let dates = args.date.map(DateFields::new).unwrap_or_else(DateFields::today);
    let mut engine = MergeEngine::from_settings(rows, &settings, &args.kind, dates)?;
    if let Some(limit) = args.limit {
        let options = engine.options().clone().with_max_records(limit);
        engine = engine.with_options(options);
    }
    let label = engine.options().kind.clone();

    if args.dry_run {
        let count = args.limit.unwrap_or(usize::MAX);
        print_preview(&engine.preview(count));
        return Ok(());
    }

    let mut sink = build_sink(&settings)?;
    let result = engine.execute_with_progress(sink.as_mut(), |progress| {
        debug!(current = progress.current_record, total = progress.total_records, "progress");
    });

    println!("{}", result.summary);

    if let Some(path) = &args.report {
        LinkReport::from_result(&label, &result)
            .save(path)
            .with_context(|| format!("cannot write report {}", path.display()))?;
        info!(path = %path.display(), "wrote link report");
    }

    if result.status == MergeStatus::Failed {
        anyhow::bail!("no document could be generated");
    }
    Ok(())
}

/// Settings file plus command line and environment overrides
fn load_settings(args: &GenerateArgs) -> anyhow::Result<MergeSettings> {
    let mut manager = SettingsManager::new(&args.config);
    let mut settings = manager
        .load_sync()
        .with_context(|| format!("cannot read settings {}", args.config.display()))?
        .clone();
    if !args.config.exists() {
        warn!(path = %args.config.display(), "settings file not found, using defaults");
    }

    let base = args
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    for kind in settings.kinds.values_mut() {
        kind.resolve_paths(&base);
    }

    apply_overrides(&mut settings, args);
    Ok(settings)
}

fn apply_overrides(settings: &mut MergeSettings, args: &GenerateArgs) {
    if let Some(output) = &args.output {
        settings.output_root = output.clone();
    }
    if args.upload {
        settings.upload_to_drive = true;
    }
    if let Some(root) = &args.drive_root {
        settings.drive_root = Some(root.clone());
    }
    if args.pdf {
        settings.convert_to_pdf = true;
    }
}

fn load_rows(path: &Path, sheet: Option<&str>) -> anyhow::Result<DataSource> {
    let rows = match sheet {
        Some(name) => {
            XlsxParser::with_config(XlsxConfig::new().with_sheet_name(name)).parse_file(path)
        }
        None => load_from_file(path),
    };
    rows.with_context(|| format!("cannot read rows from {}", path.display()))
}

fn build_sink(settings: &MergeSettings) -> anyhow::Result<Box<dyn OutputSink>> {
    if !settings.upload_to_drive {
        if settings.convert_to_pdf {
            warn!("PDF copies are only produced when publishing to the drive");
        }
        return Ok(Box::new(DirectorySink::new(&settings.output_root)));
    }

    let Some(root) = settings.drive_root.clone() else {
        anyhow::bail!("publishing needs a drive folder (--drive-root or EXTERNAL_ONEDRIVE_PATH)");
    };
    info!(drive = %root.display(), "publishing to drive folder");
    let publisher =
        DrivePublisher::new(LocalDrive::new(root)).with_local_copy(settings.output_root.clone());
    Ok(if settings.convert_to_pdf {
        Box::new(publisher.with_converter(SofficeConverter::new()))
    } else {
        Box::new(publisher)
    })
}

fn print_preview(result: &MergeResult) {
    for record in &result.merged_records {
        let client = record.client_id.as_deref().unwrap_or("-");
        if record.skipped {
            println!(
                "#{} {}: skipped ({})",
                record.record_index + 1,
                client,
                record.skip_reason.as_deref().unwrap_or("")
            );
            continue;
        }
        let template = record
            .template
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let unused = record.substitution.unused_keys(&record.mapping);
        println!(
            "#{} {}: {} replacements from {}{}",
            record.record_index + 1,
            client,
            record.substitution.replacements,
            template,
            if unused.is_empty() {
                String::new()
            } else {
                format!(" (unused: {})", unused.join(", "))
            }
        );
    }
    for failure in &result.errors {
        println!("#{} failed: {}", failure.record_index + 1, failure.message);
    }
    println!("{}", result.summary);
}
