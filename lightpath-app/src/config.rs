use anyhow::{bail, Context, Result};
use lightpath_schemas::file_formats::ScenarioFile;
use std::{fs, path::Path};

/// Scenario schema versions this build understands.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["1"];

/// Loads and parses a scenario YAML file.
pub fn load_scenario(path: &Path) -> Result<ScenarioFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    let scenario: ScenarioFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML from {}", path.display()))?;

    if !SUPPORTED_SCHEMA_VERSIONS.contains(&scenario.schema_version.as_str()) {
        bail!(
            "Unsupported schema_version '{}' in {} (supported: {})",
            scenario.schema_version,
            path.display(),
            SUPPORTED_SCHEMA_VERSIONS.join(", ")
        );
    }
    Ok(scenario)
}

/// Name used for run directories: the scenario's own name, else the file stem.
pub fn scenario_label(scenario: &ScenarioFile, path: &Path) -> String {
    let raw = scenario
        .name
        .clone()
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_string()))
        .unwrap_or_else(|| "scenario".to_string());
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpath_core::simulation::SimulationBuilder;
    use std::path::PathBuf;

    fn scenario_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios")
    }

    #[test]
    fn bundled_scenarios_load_and_validate() {
        let mut count = 0;
        for entry in fs::read_dir(scenario_dir()).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().map_or(false, |e| e == "yaml") {
                let scenario = load_scenario(&path).unwrap();
                SimulationBuilder::from_scenario(scenario)
                    .build()
                    .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
                count += 1;
            }
        }
        assert!(count >= 3);
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let path = std::env::temp_dir().join(format!("lightpath-schema-{}.yaml", std::process::id()));
        let original = fs::read_to_string(scenario_dir().join("ook_back_to_back.yaml")).unwrap();
        fs::write(&path, original.replace("schema_version: \"1\"", "schema_version: \"9\"")).unwrap();

        let err = load_scenario(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported schema_version"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn label_prefers_scenario_name() {
        let path = scenario_dir().join("qpsk_coherent.yaml");
        let mut scenario = load_scenario(&path).unwrap();
        assert_eq!(scenario_label(&scenario, &path), "qpsk-coherent");
        scenario.name = Some("metro link #2".to_string());
        assert_eq!(scenario_label(&scenario, &path), "metro_link__2");
        scenario.name = None;
        assert_eq!(scenario_label(&scenario, &path), "qpsk_coherent");
    }
}
