// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{error::Result, metadata};

use super::{IsPersistent, Storage};

type Items = BTreeMap<String, String>;

/// A JSON object on disk holding every key. The file is read on each access so
/// that concurrently running clients observe each other's logins and logouts.
pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self::at(dirs.data_dir().join(file)))
    }

    pub(crate) fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Items> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(serde_json::from_reader(io::BufReader::new(fp))?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, items: &Items) -> Result<()> {
        if items.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer(file, items)?;
        Ok(())
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

impl Storage for File {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read()?;
        _ = items.insert(key.to_owned(), value.to_owned());
        self.write(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let mut items = self.read()?;
        if items.remove(key).is_some() {
            self.write(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Result;

    use super::*;

    #[test]
    fn items_survive_reopening() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("storage.json");

        let mut storage = File::at(&path);
        storage.set_item("token", "abc")?;
        storage.set_item("theme", "dark")?;

        let reopened = File::at(&path);
        assert_eq!(reopened.get_item("token")?.as_deref(), Some("abc"));
        assert_eq!(reopened.get_item("theme")?.as_deref(), Some("dark"));
        assert!(reopened.is_persistent());
        Ok(())
    }

    #[test]
    fn removing_last_item_deletes_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storage.json");

        let mut storage = File::at(&path);
        storage.set_item("token", "abc")?;
        assert!(path.exists());

        storage.remove_item("token")?;
        assert!(!path.exists());
        assert_eq!(storage.get_item("token")?, None);

        // Removing again is harmless.
        storage.remove_item("token")?;
        Ok(())
    }
}
