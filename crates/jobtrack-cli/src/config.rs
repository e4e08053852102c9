//! Settings files named on the command line.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jobtrack_reconcile::ReconcileConfig;
use jobtrack_templates::{TemplateCatalog, load_custom_templates};
use tracing::info;

/// Reads a reconcile config file. Sections and keys left out keep their
/// defaults; unknown keys are ignored.
pub fn load_config(path: Option<&Path>) -> Result<ReconcileConfig> {
    let Some(path) = path else {
        return Ok(ReconcileConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config = parse_config(&contents).with_context(|| format!("parse {}", path.display()))?;
    info!(path = %path.display(), "loaded reconcile config");
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ReconcileConfig> {
    let config: ReconcileConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// The built-in catalog plus any templates from `custom`.
pub fn load_catalog(custom: Option<&Path>) -> Result<TemplateCatalog> {
    let mut builder = TemplateCatalog::builder().with_builtin()?;
    if let Some(path) = custom {
        let templates = load_custom_templates(path)?;
        info!(
            path = %path.display(),
            count = templates.len(),
            "loaded custom templates"
        );
        builder = builder.register_all(templates)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(
            r#"
[duplicates]
min_confidence = 0.8
date_window_days = 14

[recommendations]
merge = 0.95
"#,
        )
        .expect("config");
        let defaults = ReconcileConfig::default();
        assert_eq!(config.duplicates.min_confidence, 0.8);
        assert_eq!(config.duplicates.date_window_days, 14);
        assert_eq!(config.duplicates.weights, defaults.duplicates.weights);
        assert_eq!(config.recommendations.merge, 0.95);
        assert_eq!(config.recommendations.skip, defaults.recommendations.skip);
        assert_eq!(config.mapping, defaults.mapping);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let err = parse_config(
            r#"
[duplicates.weights]
company = 0.9
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("weights"), "{err}");
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(load_config(None).expect("config"), ReconcileConfig::default());
        assert_eq!(load_catalog(None).expect("catalog").len(), TemplateCatalog::builtin().len());
    }
}
