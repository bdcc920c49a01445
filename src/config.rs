use crate::error::AcademicError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Application configuration struct.
/// Holds the location of the local academic records database.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AppConfiguration {
    /// This will ensure that the filename is created, even if the Toml file
    /// is an old version, which does not have an `application_data` section
    #[serde(default = "default_application_data")]
    pub application_data: ApplicationData,
}

/// Holds the configuration for the `application_data` section of the Toml file
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct ApplicationData {
    /// The path to the local academic records data store
    pub database_file: String,
}

impl Default for ApplicationData {
    fn default() -> Self {
        ApplicationData {
            database_file: database_file().to_string_lossy().to_string(),
        }
    }
}

/// Filename holding the application configuration parameters
#[must_use]
pub fn configuration_file() -> PathBuf {
    project_dirs().preference_dir().into()
}

/// Filename of the Sqlite DBMS holding the academic records
#[must_use]
pub fn database_file() -> PathBuf {
    project_dirs().data_dir().join("academic_system.db")
}

/// Loads the configuration file, falling back to the defaults when no file
/// has been written yet.
///
/// # Errors
/// Returns an error when an existing configuration file cannot be read or
/// parsed.
pub fn load() -> Result<AppConfiguration, AcademicError> {
    let config_path = configuration_file();
    if !config_path.exists() {
        return Ok(AppConfiguration::default());
    }
    read(&config_path)
}

/// Writes the configuration to the standard location, creating parent
/// directories as required.
///
/// # Errors
/// Returns an error when the file cannot be created or serialised.
pub fn save(cfg: &AppConfiguration) -> Result<(), AcademicError> {
    create_configuration_file(cfg, &configuration_file())
}

fn default_application_data() -> ApplicationData {
    ApplicationData::default()
}

fn project_dirs() -> ProjectDirs {
    ProjectDirs::from("com", "norn", "academic_system")
        .expect("Unable to determine the name of the 'project_dirs' directory name")
}

/// Reads the `Application` configuration struct from the supplied TOML file
fn read(path: &Path) -> Result<AppConfiguration, AcademicError> {
    let mut file = File::open(path).map_err(|source| AcademicError::ApplicationConfig {
        path: path.into(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| AcademicError::ApplicationConfig {
            path: path.into(),
            source,
        })?;
    toml::from_str::<AppConfiguration>(&contents).map_err(|source| AcademicError::TomlParse {
        path: path.into(),
        source,
    })
}

fn create_configuration_file(
    cfg: &AppConfiguration,
    path: &PathBuf,
) -> Result<(), AcademicError> {
    let directory = path
        .parent()
        .ok_or_else(|| AcademicError::ConfigFileCreation { path: path.clone() })?;
    if !directory.exists() {
        fs::create_dir_all(directory)?;
    }

    let toml = toml::to_string::<AppConfiguration>(cfg)
        .map_err(|_| AcademicError::ConfigFileCreation { path: path.clone() })?;
    let mut file = File::create(path)
        .map_err(|_| AcademicError::ConfigFileCreation { path: path.clone() })?;
    file.write_all(toml.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_round_trips_through_toml() {
        let cfg = AppConfiguration {
            application_data: ApplicationData {
                database_file: "/tmp/academic_system.db".to_string(),
            },
        };
        let toml = toml::to_string(&cfg).unwrap();
        let parsed: AppConfiguration = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_application_data_section_gets_defaults() {
        let parsed: AppConfiguration = toml::from_str("").unwrap();
        assert!(!parsed.application_data.database_file.is_empty());
    }
}
