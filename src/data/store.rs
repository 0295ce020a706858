use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

use super::organization::Organization;
use super::seed;

/// Immutable collection of organizations loaded once per session.
/// Ids are unique for the lifetime of the store.
#[derive(Debug, Clone)]
pub struct OrganizationStore {
    organizations: Vec<Organization>,
}

impl OrganizationStore {
    /// Build a store, rejecting duplicate ids
    pub fn new(organizations: Vec<Organization>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(organizations.len());
        for org in &organizations {
            if org.id.trim().is_empty() {
                bail!("Organization '{}' has an empty id", org.name);
            }
            if !seen.insert(org.id.as_str()) {
                bail!("Duplicate organization id '{}'", org.id);
            }
            if !org.is_mappable() {
                warn!(
                    target: "store",
                    "Organization '{}' ({}) has no usable coordinates, it will be hidden on the map",
                    org.name, org.id
                );
            }
        }

        debug!(target: "store", "Store ready with {} organizations", organizations.len());
        Ok(Self { organizations })
    }

    /// The compiled-in registry snapshot
    pub fn builtin() -> Self {
        Self {
            organizations: seed::builtin_organizations(),
        }
    }

    /// Load a manual export of the registry spreadsheet (CSV or JSON array)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let rows = match extension.as_str() {
            "csv" => Self::read_csv_rows(path)?,
            "json" => Self::read_json_rows(path)?,
            other => bail!(
                "Unsupported data file extension '{}' (expected .csv or .json): {}",
                other,
                path.display()
            ),
        };

        let organizations = rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| {
                serde_json::from_value::<Organization>(row)
                    .with_context(|| format!("Invalid organization record #{}", idx + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            target: "store",
            "Loaded {} organizations from {}",
            organizations.len(),
            path.display()
        );
        Self::new(organizations).with_context(|| format!("Rejected {}", path.display()))
    }

    fn read_csv_rows(path: &Path) -> Result<Vec<Value>> {
        let file =
            File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        let mut reader = csv::Reader::from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = serde_json::Map::new();

            // Cells stay strings; numeric fields are parsed leniently later
            for (i, field) in record.iter().enumerate() {
                if let Some(header) = headers.get(i) {
                    row.insert(header.clone(), Value::String(field.trim().to_string()));
                }
            }

            rows.push(Value::Object(row));
        }

        Ok(rows)
    }

    fn read_json_rows(path: &Path) -> Result<Vec<Value>> {
        let file =
            File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        let value: Value = serde_json::from_reader(file)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        match value {
            Value::Array(rows) => Ok(rows),
            _ => Err(anyhow!("Expected a JSON array of organizations")),
        }
    }

    pub fn all(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn get(&self, id: &str) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_ids_are_unique() {
        let store = OrganizationStore::builtin();
        assert_eq!(store.len(), 9);
        assert!(OrganizationStore::new(store.all().to_vec()).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut orgs = seed::builtin_organizations();
        orgs[1].id = orgs[0].id.clone();
        let err = OrganizationStore::new(orgs).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_load_csv_with_blank_coordinates() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,name,address,lat,lng,category,status,budget").unwrap();
        writeln!(file, "a,Фонд А,\"вул. Нова, 1, Одеса\",46.47,30.74,Благодійний фонд,Active,1000").unwrap();
        writeln!(file, "b,Пункт Б,Херсон,46.6,,Волонтерський пункт,whatever,").unwrap();
        file.flush().unwrap();

        let store = OrganizationStore::from_path(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        let b = store.get("b").unwrap();
        assert!(!b.is_mappable());
        assert_eq!(store.get("a").unwrap().address, "вул. Нова, 1, Одеса");
    }

    #[test]
    fn test_load_json_array() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let orgs = seed::builtin_organizations();
        write!(file, "{}", serde_json::to_string(&orgs).unwrap()).unwrap();
        file.flush().unwrap();

        let store = OrganizationStore::from_path(file.path()).unwrap();
        assert_eq!(store.len(), orgs.len());
        assert_eq!(store.get("5").unwrap().name, orgs[4].name);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = NamedTempFile::new().unwrap();
        assert!(OrganizationStore::from_path(file.path()).is_err());
    }
}
