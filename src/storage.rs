use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    error::AppError,
    profile::{ProfileConfig, Profiles},
};

/// Profile directory in user's home directory
const PROFILE_DIR: &str = ".kt";
/// Profile file inside [`PROFILE_DIR`]
const PROFILE_FILE: &str = "profile";

/// On-disk document: a single `[profiles]` table keyed by profile key
#[derive(Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    profiles: toml::Table,
}

/// Gets the path to the profile file
pub fn default_profile_path() -> Result<PathBuf, AppError> {
    let home_dir: PathBuf = dirs::home_dir().ok_or(AppError::HomeDirNotFound)?;
    Ok(home_dir.join(PROFILE_DIR).join(PROFILE_FILE))
}

/// Reads and writes the profile file as a whole
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProfileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every profile from the file, in file order
    pub fn load_all(&self) -> Result<Profiles, AppError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AppError::ProfileFileNotFound(self.path.clone()));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let document: ProfileDocument = toml::from_str(&contents)?;
        let entries = document
            .profiles
            .into_iter()
            .map(|(key, value)| -> Result<_, AppError> {
                Ok((key, value.try_into::<ProfileConfig>()?))
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        debug!("loaded {} profiles from {:?}", entries.len(), &self.path);
        Ok(Profiles::from_entries(entries))
    }

    /// Loads every profile, treating a missing file as an empty mapping
    pub fn load_or_default(&self) -> Result<Profiles, AppError> {
        match self.load_all() {
            Err(AppError::ProfileFileNotFound(_)) => Ok(Profiles::default()),
            other => other,
        }
    }

    /// Rewrites the whole file with `profiles`.
    ///
    /// Contents go to a temporary file next to the target which is then
    /// renamed over it, so a failed write leaves the old file intact.
    pub fn save(&self, profiles: &Profiles) -> Result<(), AppError> {
        let mut table = toml::Table::new();
        for (key, config) in profiles.entries() {
            table.insert(key.clone(), toml::Value::try_from(config)?);
        }
        let data = toml::to_string(&ProfileDocument { profiles: table })?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(data.as_bytes())?;
        file.as_file().sync_all()?;
        restrict_permissions(file.path())?;
        file.persist(&self.path).map_err(|e| AppError::Io(e.error))?;

        debug!("wrote {} profiles to {:?}", profiles.entries().len(), &self.path);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const DUMMY_PROFILE: &str = r#"[profiles."foo:default"]
server_url = "https://one.example.com"
user_name = "test_user_one"
password = "test_passwd_one"

[profiles.bar]
server_url = "https://two.example.com"
user_name = "test_user_two"
password = "test_passwd_two"
"#;

    fn dummy_profiles() -> Profiles {
        Profiles::from_entries([
            (
                "foo:default",
                ProfileConfig::new("https://one.example.com", "test_user_one", "test_passwd_one")
                    .unwrap(),
            ),
            (
                "bar",
                ProfileConfig::new("https://two.example.com", "test_user_two", "test_passwd_two")
                    .unwrap(),
            ),
        ])
    }

    fn store_in(dir: &TempDir) -> ProfileStore {
        ProfileStore::new(dir.path().join(".kt").join("profile"))
    }

    #[test]
    fn load_all_success() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), DUMMY_PROFILE).unwrap();

        assert_eq!(store.load_all().unwrap(), dummy_profiles());
    }

    #[test]
    fn load_all_file_not_found() {
        let dir = TempDir::new().unwrap();
        let err = store_in(&dir).load_all().unwrap_err();
        assert!(matches!(err, AppError::ProfileFileNotFound(_)));
    }

    #[test]
    fn load_or_default_file_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).load_or_default().unwrap().is_empty());
    }

    #[test]
    fn load_all_bad_toml_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "foobar").unwrap();

        assert!(matches!(store.load_all(), Err(AppError::Malformed(_))));
    }

    #[test]
    fn load_all_rejects_profile_without_scheme() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            "[profiles.bar]\nserver_url = \"example.com\"\nuser_name = \"u\"\npassword = \"p\"\n",
        )
        .unwrap();

        assert!(matches!(store.load_all(), Err(AppError::Malformed(_))));
    }

    #[test]
    fn save_creates_directory_and_writes_toml() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&dummy_profiles()).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.contains(r#"[profiles."foo:default"]"#));
        assert!(written.contains("[profiles.bar]"));
        assert!(written.contains(r#"password = "test_passwd_two""#));
        assert_eq!(store.load_all().unwrap(), dummy_profiles());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut profiles = dummy_profiles();
        profiles.set_default("bar").unwrap();

        store.save(&profiles).unwrap();

        assert_eq!(store.load_all().unwrap(), profiles);
    }

    #[cfg(unix)]
    #[test]
    fn save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&dummy_profiles()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
