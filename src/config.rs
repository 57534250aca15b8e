//! Tool and reference configuration.
//!
//! Locations of the external tools and the genome reference are never baked
//! into stage builders. They are resolved once at startup from, in order of
//! precedence: a JSON config file, `RABEFLOW_*` environment variables, and
//! (for the plain binaries only) PATH-relative defaults.

use crate::errors::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable names, one per setting.
const ENV_SAMTOOLS: &str = "RABEFLOW_SAMTOOLS";
const ENV_JAVA: &str = "RABEFLOW_JAVA";
const ENV_PICARD_JAR: &str = "RABEFLOW_PICARD_JAR";
const ENV_GATK_JAR: &str = "RABEFLOW_GATK_JAR";
const ENV_BCFTOOLS: &str = "RABEFLOW_BCFTOOLS";
const ENV_REFERENCE: &str = "RABEFLOW_REFERENCE";

/// Raw, partially specified configuration as read from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawToolConfig {
    samtools: Option<PathBuf>,
    java: Option<PathBuf>,
    picard_jar: Option<PathBuf>,
    gatk_jar: Option<PathBuf>,
    bcftools: Option<PathBuf>,
    reference: Option<PathBuf>,
    index_threads: Option<u32>,
}

/// Fully resolved locations of the external tools and the genome reference.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Path to the samtools binary.
    pub samtools: PathBuf,
    /// Path to the java binary used to run the jar-based tools.
    pub java: PathBuf,
    /// Path to the picard jar.
    pub picard_jar: PathBuf,
    /// Path to the gatk local jar.
    pub gatk_jar: PathBuf,
    /// Path to the bcftools binary.
    pub bcftools: PathBuf,
    /// Path to the genome reference FASTA.
    pub reference: PathBuf,
    /// Thread count passed to `samtools index -@`.
    pub index_threads: u32,
}

impl ToolConfig {
    /// Resolves the configuration from an optional config file plus the
    /// process environment.
    ///
    /// The binaries fall back to their bare names (resolved via PATH by the
    /// OS launcher); the jars and the reference have no safe default and
    /// must be supplied.
    pub fn resolve(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let raw = match config_file {
            Some(path) => Self::read_file(path)?,
            None => RawToolConfig::default(),
        };

        Ok(Self {
            samtools: resolve_path(raw.samtools, ENV_SAMTOOLS).unwrap_or_else(|| "samtools".into()),
            java: resolve_path(raw.java, ENV_JAVA).unwrap_or_else(|| "java".into()),
            picard_jar: resolve_path(raw.picard_jar, ENV_PICARD_JAR).ok_or(
                ConfigError::MissingSetting {
                    key: "picard_jar",
                    env_var: ENV_PICARD_JAR,
                },
            )?,
            gatk_jar: resolve_path(raw.gatk_jar, ENV_GATK_JAR).ok_or(
                ConfigError::MissingSetting {
                    key: "gatk_jar",
                    env_var: ENV_GATK_JAR,
                },
            )?,
            bcftools: resolve_path(raw.bcftools, ENV_BCFTOOLS).unwrap_or_else(|| "bcftools".into()),
            reference: resolve_path(raw.reference, ENV_REFERENCE).ok_or(
                ConfigError::MissingSetting {
                    key: "reference",
                    env_var: ENV_REFERENCE,
                },
            )?,
            index_threads: raw.index_threads.unwrap_or(6),
        })
    }

    fn read_file(path: &Path) -> Result<RawToolConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// File value wins over the environment variable.
fn resolve_path(file_value: Option<PathBuf>, env_var: &str) -> Option<PathBuf> {
    file_value.or_else(|| std::env::var_os(env_var).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        #[allow(clippy::unwrap_used)]
        let mut file = tempfile::NamedTempFile::new().unwrap();
        #[allow(clippy::unwrap_used)]
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_resolve_from_file() {
        let file = write_config(
            r#"{
                "samtools": "/opt/bio/samtools",
                "picard_jar": "/opt/bio/picard.jar",
                "gatk_jar": "/opt/bio/gatk.jar",
                "reference": "/data/ref/dm6.fa",
                "index_threads": 4
            }"#,
        );

        #[allow(clippy::unwrap_used)]
        let config = ToolConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.samtools, PathBuf::from("/opt/bio/samtools"));
        assert_eq!(config.java, PathBuf::from("java"));
        assert_eq!(config.bcftools, PathBuf::from("bcftools"));
        assert_eq!(config.reference, PathBuf::from("/data/ref/dm6.fa"));
        assert_eq!(config.index_threads, 4);
    }

    #[test]
    fn test_missing_reference_is_an_error() {
        let file = write_config(
            r#"{
                "picard_jar": "/opt/bio/picard.jar",
                "gatk_jar": "/opt/bio/gatk.jar"
            }"#,
        );

        // The test environment must not define RABEFLOW_REFERENCE.
        std::env::remove_var("RABEFLOW_REFERENCE");
        let err = ToolConfig::resolve(Some(file.path()));
        assert!(matches!(
            err,
            Err(ConfigError::MissingSetting {
                key: "reference",
                ..
            })
        ));
    }

    #[test]
    fn test_unparseable_file_is_an_error() {
        let file = write_config("not json at all");
        let err = ToolConfig::resolve(Some(file.path()));
        assert!(matches!(err, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ToolConfig::resolve(Some(Path::new("/no/such/config.json")));
        assert!(matches!(err, Err(ConfigError::Unreadable { .. })));
    }
}
