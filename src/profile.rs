use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    validation::{validate_profile_name, validate_server_url},
};

/// Suffix on a profile key marking the profile used when none is requested
pub const DEFAULT_MARKER: &str = ":default";

/// Credentials for one account on a ktistec server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "RawProfileConfig")]
pub struct ProfileConfig {
    server_url: String,
    user_name: String,
    password: String,
}

/// Unvalidated on-disk shape of a profile
#[derive(Deserialize)]
struct RawProfileConfig {
    server_url: String,
    user_name: String,
    password: String,
}

impl TryFrom<RawProfileConfig> for ProfileConfig {
    type Error = AppError;

    fn try_from(raw: RawProfileConfig) -> Result<Self, Self::Error> {
        ProfileConfig::new(raw.server_url, raw.user_name, raw.password)
    }
}

impl ProfileConfig {
    /// Builds a profile, rejecting server URLs without an `http://` or `https://` scheme
    pub fn new(
        server_url: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, AppError> {
        let server_url = server_url.into();
        validate_server_url(&server_url)?;
        Ok(ProfileConfig {
            server_url,
            user_name: user_name.into(),
            password: password.into(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Returns the profile name with the default marker stripped
pub fn unmarked(key: &str) -> &str {
    key.strip_suffix(DEFAULT_MARKER).unwrap_or(key)
}

fn is_marked(key: &str) -> bool {
    key.ends_with(DEFAULT_MARKER)
}

fn marked(name: &str) -> String {
    format!("{name}{DEFAULT_MARKER}")
}

/// Ordered mapping of profile keys to their configs, in file order.
///
/// A key is either a plain name (`bar`) or a name carrying the default
/// marker (`foo:default`). All rules for resolving and mutating the mapping
/// live here; reading and writing the file is left to [`crate::storage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profiles {
    entries: Vec<(String, ProfileConfig)>,
}

impl Profiles {
    /// Builds a mapping from keys and configs, keeping the given order
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ProfileConfig)>,
        K: Into<String>,
    {
        Profiles {
            entries: entries
                .into_iter()
                .map(|(key, config)| (key.into(), config))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, ProfileConfig)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Looks up a config by its exact key
    pub fn get(&self, key: &str) -> Option<&ProfileConfig> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Finds the key a name refers to, preferring `name:default` over `name`
    pub fn find_key(&self, name: &str) -> Option<&str> {
        let default_key = marked(name);
        [default_key.as_str(), name]
            .into_iter()
            .find_map(|key| self.position(key))
            .map(|i| self.entries[i].0.as_str())
    }

    fn default_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| is_marked(k))
            .collect()
    }

    /// Resolves the profile to act as.
    ///
    /// With a name, `name:default` is checked before `name`. Without one, the
    /// single default-marked profile is returned.
    pub fn resolve(&self, requested: Option<&str>) -> Result<&ProfileConfig, AppError> {
        match requested {
            Some(name) => self
                .find_key(name)
                .and_then(|key| self.get(key))
                .ok_or_else(|| AppError::ProfileNotFound(name.to_string())),
            None => match self.default_keys().as_slice() {
                [] => Err(AppError::NoDefault),
                [key] => self.get(key).ok_or(AppError::NoDefault),
                keys => Err(AppError::Validation(format!(
                    "more than one profile is marked as default: {}",
                    keys.join(", ")
                ))),
            },
        }
    }

    /// Inserts or overwrites a profile and returns the key it was stored under.
    ///
    /// When `name` is already the default profile its config is replaced in
    /// place and the marker is kept.
    pub fn insert(&mut self, name: &str, config: ProfileConfig) -> Result<String, AppError> {
        validate_profile_name(name)?;

        let key = self.find_key(name).unwrap_or(name).to_string();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = config,
            None => self.entries.push((key.clone(), config)),
        }
        Ok(key)
    }

    /// Removes the profile `name` refers to and returns its key and config
    pub fn remove(&mut self, name: &str) -> Result<(String, ProfileConfig), AppError> {
        let key = self
            .find_key(name)
            .ok_or_else(|| AppError::ProfileNotFound(name.to_string()))?
            .to_string();
        let i = self
            .position(&key)
            .ok_or_else(|| AppError::ProfileNotFound(name.to_string()))?;
        Ok(self.entries.remove(i))
    }

    /// Checks that `name` can become the default profile.
    ///
    /// Returns the name of the default it would replace, if there is one.
    pub fn check_set_default(&self, name: &str) -> Result<Option<&str>, AppError> {
        let defaults = self.default_keys();
        if let [only] = defaults.as_slice() {
            if unmarked(only) == name {
                return Err(AppError::AlreadyDefault(name.to_string()));
            }
        }
        if self.find_key(name).is_none() {
            return Err(AppError::ProfileNotFound(name.to_string()));
        }
        Ok(defaults
            .into_iter()
            .map(unmarked)
            .find(|current| *current != name))
    }

    /// Marks `name` as the default profile, unmarking every other one.
    ///
    /// Keys are renamed in place so the file order is preserved. A plain key
    /// that an unmarked default would collide with is dropped.
    pub fn set_default(&mut self, name: &str) -> Result<(), AppError> {
        self.check_set_default(name)?;
        let target = self
            .find_key(name)
            .ok_or_else(|| AppError::ProfileNotFound(name.to_string()))?
            .to_string();
        let demoted: Vec<String> = self
            .default_keys()
            .into_iter()
            .filter(|key| *key != target)
            .map(|key| unmarked(key).to_string())
            .collect();
        self.entries.retain(|(key, _)| !demoted.contains(key));
        for (key, _) in self.entries.iter_mut() {
            if *key == target {
                *key = marked(name);
            } else if is_marked(key) {
                *key = unmarked(key).to_string();
            }
        }
        Ok(())
    }

    /// Rows of `(key, server_url, user_name)` for display, passwords excluded
    pub fn list(&self) -> Vec<(&str, &str, &str)> {
        self.entries
            .iter()
            .map(|(key, config)| (key.as_str(), config.server_url(), config.user_name()))
            .collect()
    }
}
