use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info, info_span};

use jobtrack_cli::config::{load_catalog, load_config};
use jobtrack_cli::input::read_table;
use jobtrack_cli::logging::redact_value;
use jobtrack_cli::resolutions::{apply_resolutions, load_resolutions};
use jobtrack_cli::store::JsonRecordStore;
use jobtrack_model::{CanonicalField, DuplicateGroup, FieldMappingResult, ResolutionKind};
use jobtrack_reconcile::{
    CommitSummary, ImportSession, MemoryRecordStore, ReconcileConfig, ResolutionCoordinator,
    recommend,
};
use jobtrack_templates::{TemplateCatalog, TemplateDetector, generate_template_csv};

use crate::cli::{Cli, DetectArgs, DuplicatesArgs, ImportArgs, MapArgs, TemplateCsvArgs};
use crate::summary::{
    ImportReport, print_detection, print_groups, print_mapping, print_templates,
};

/// Catalog and settings shared by every subcommand.
pub struct Settings {
    pub catalog: Arc<TemplateCatalog>,
    pub config: ReconcileConfig,
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref()).context("load config")?;
        let catalog = load_catalog(cli.templates.as_deref()).context("load templates")?;
        Ok(Self {
            catalog: Arc::new(catalog),
            config,
        })
    }

    fn recommend(&self, confidence: f64) -> Option<ResolutionKind> {
        recommend(confidence, &self.config.recommendations)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupView<'a> {
    #[serde(flatten)]
    group: &'a DuplicateGroup,
    recommendation: Option<ResolutionKind>,
}

pub fn run_templates(settings: &Settings) {
    print_templates(&settings.catalog);
}

pub fn run_template_csv(settings: &Settings, args: &TemplateCsvArgs) -> Result<()> {
    let csv = generate_template_csv(&settings.catalog, &args.template, args.examples)?;
    print!("{csv}");
    Ok(())
}

pub fn run_detect(settings: &Settings, args: &DetectArgs) -> Result<()> {
    let table = read_table(&args.file)?;
    let detector = TemplateDetector::new(&settings.catalog).with_config(settings.config.detection);
    let scores = detector.detect_all(&table.headers);
    let detection = detector.detect_template(&table.headers);
    print_detection(
        &scores,
        detection
            .template
            .map(|template| (template.id.as_str(), detection.confidence)),
    );
    Ok(())
}

pub fn run_map(settings: &Settings, args: &MapArgs) -> Result<()> {
    let table = read_table(&args.file)?;
    let session = ImportSession::open(
        Arc::clone(&settings.catalog),
        settings.config,
        MemoryRecordStore::default(),
    )?;
    let prepared = session.map_upload(&table, args.template.as_deref())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&prepared.mapping)?);
    } else {
        print_mapping(&prepared.mapping);
    }
    Ok(())
}

pub fn run_duplicates(settings: &Settings, args: &DuplicatesArgs) -> Result<()> {
    let span = info_span!("duplicates", file = %args.file.display());
    let _guard = span.enter();

    let table = read_table(&args.file)?;
    let session = ImportSession::open(
        Arc::clone(&settings.catalog),
        settings.config,
        JsonRecordStore::new(&args.store),
    )
    .context("open record store")?;
    let prepared = session.map_upload(&table, args.template.as_deref())?;
    let coordinator = session.find_duplicates(&prepared);
    log_groups(&coordinator);

    if args.json {
        let views: Vec<GroupView<'_>> = coordinator
            .groups()
            .iter()
            .map(|group| GroupView {
                group,
                recommendation: settings.recommend(group.confidence),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print_groups(coordinator.groups(), coordinator.mapping(), |confidence| {
            settings.recommend(confidence)
        });
    }
    Ok(())
}

pub fn run_import(settings: &Settings, args: &ImportArgs) -> Result<ImportReport> {
    let span = info_span!(
        "import",
        file = %args.file.display(),
        store = %args.store.display(),
        dry_run = args.dry_run
    );
    let _guard = span.enter();

    let table = read_table(&args.file)?;
    let session = ImportSession::open(
        Arc::clone(&settings.catalog),
        settings.config,
        JsonRecordStore::new(&args.store),
    )
    .context("open record store")?;
    let prepared = session.map_upload(&table, args.template.as_deref())?;
    ensure_complete(&prepared.mapping)?;

    let mut coordinator = session.find_duplicates(&prepared);
    log_groups(&coordinator);
    if let Some(path) = &args.resolutions {
        let resolutions = load_resolutions(path)?;
        let applied = apply_resolutions(&mut coordinator, &resolutions)?;
        info!(applied, "applied resolutions file");
    }
    if args.accept_recommendations {
        let accepted = coordinator.accept_recommendations()?;
        info!(accepted, "accepted recommendations");
    }
    if !coordinator.is_complete() {
        let unresolved: Vec<DuplicateGroup> = coordinator.unresolved().cloned().collect();
        print_groups(&unresolved, coordinator.mapping(), |confidence| {
            settings.recommend(confidence)
        });
        bail!(
            "{} of {} duplicate group(s) need a decision; \
             pass --resolutions or --accept-recommendations",
            unresolved.len(),
            coordinator.groups().len()
        );
    }

    let rows = prepared.batch.len();
    let groups = coordinator.groups().len();
    let summary = if args.dry_run {
        let records = coordinator.finalize()?;
        let updated = records.iter().filter(|record| record.is_update()).count();
        CommitSummary {
            inserted: records.len() - updated,
            updated,
        }
    } else {
        session.commit(coordinator).context("commit import")?
    };
    Ok(ImportReport {
        template_id: prepared.template_id,
        detection_confidence: prepared.detection_confidence,
        rows,
        groups,
        summary,
        dry_run: args.dry_run,
    })
}

fn ensure_complete(mapping: &FieldMappingResult) -> Result<()> {
    if mapping.is_complete() {
        return Ok(());
    }
    let missing: Vec<&str> = mapping
        .missing_fields
        .iter()
        .map(|field| field.label())
        .collect();
    bail!(
        "upload has no column for required field(s) of template {}: {}",
        mapping.template_id,
        missing.join(", ")
    )
}

fn log_groups(coordinator: &ResolutionCoordinator) {
    for group in coordinator.groups() {
        let company = group
            .primary()
            .value_of(CanonicalField::Company, coordinator.mapping())
            .unwrap_or_default();
        debug!(
            group_id = %group.id,
            members = group.len(),
            confidence = group.confidence,
            company = redact_value(company),
            "duplicate group"
        );
    }
}
